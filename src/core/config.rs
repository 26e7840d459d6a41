// src/core/config.rs

use std::time::Duration;

use crate::core::catalog;
use crate::core::error::ScanError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const MAX_CONCURRENCY: usize = 32;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const USER_AGENT: &str = concat!("VanguardRecon/", env!("CARGO_PKG_VERSION"));

/// Validated engine settings for one run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Per-probe timeout.
    pub timeout: Duration,
    /// Maximum number of catalog probes in flight.
    pub concurrency: usize,
    /// Run-wide deadline for all probing. `None` means no deadline.
    pub deadline: Option<Duration>,
    pub paths: Vec<String>,
    /// Probe `/` with PUT, DELETE, PATCH, TRACE and OPTIONS.
    pub method_checks: bool,
    /// Bodies are read up to this many bytes.
    pub max_body_bytes: usize,
    /// Route probes through this proxy. Without it, system proxies are ignored.
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            deadline: None,
            paths: catalog::candidate_paths(),
            method_checks: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            proxy: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.timeout.is_zero() {
            return Err(ScanError::config("timeout must be greater than zero"));
        }
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ScanError::config(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }
        if self.deadline.is_some_and(|d| d.is_zero()) {
            return Err(ScanError::config("deadline must be greater than zero"));
        }
        if self.max_body_bytes == 0 {
            return Err(ScanError::config("max body size must be greater than zero"));
        }
        if let Some(proxy) = &self.proxy {
            url::Url::parse(proxy)
                .map_err(|e| ScanError::config(format!("invalid proxy '{}': {}", proxy, e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.paths.is_empty());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad = [
            ScanConfig { concurrency: 0, ..ScanConfig::default() },
            ScanConfig { concurrency: MAX_CONCURRENCY + 1, ..ScanConfig::default() },
            ScanConfig { timeout: Duration::ZERO, ..ScanConfig::default() },
            ScanConfig { deadline: Some(Duration::ZERO), ..ScanConfig::default() },
            ScanConfig { max_body_bytes: 0, ..ScanConfig::default() },
            ScanConfig { proxy: Some("not a url".into()), ..ScanConfig::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(ScanError::Configuration(_))));
        }
    }
}
