// src/core/catalog.rs

//! The static list of candidate paths probed on every run.
//!
//! Order is probe order and report order, so it must never depend on hashing.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::core::error::ScanError;

/// Conceptual grouping of catalog paths. Groups carry no semantics at probe time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathGroup {
    ApiVersions,
    HealthMonitoring,
    Documentation,
    DatabaseCache,
    AdminDebug,
    SensitiveFiles,
}

static CATALOG: &[(PathGroup, &[&str])] = &[
    (
        PathGroup::ApiVersions,
        &[
            "/api", "/api/v1", "/api/v2", "/api/v3", "/rest", "/graphql", "/api/users",
            "/api/auth", "/api/login", "/api/config",
        ],
    ),
    (
        PathGroup::HealthMonitoring,
        &[
            "/health", "/ready", "/live", "/status", "/ping", "/heartbeat", "/metrics",
            "/prometheus", "/actuator/health", "/actuator/metrics", "/actuator/env", "/stats",
            "/monitoring", "/dashboard",
        ],
    ),
    (
        PathGroup::Documentation,
        &[
            "/swagger", "/docs", "/api-docs", "/openapi.json", "/schema", "/version",
            "/build-info", "/info", "/about",
        ],
    ),
    (
        PathGroup::DatabaseCache,
        &[
            "/db-status", "/database/health", "/cache/stats", "/redis/info", "/mongodb/status",
            "/postgres/status",
        ],
    ),
    (
        PathGroup::AdminDebug,
        &[
            "/admin", "/admin/api", "/wp-admin", "/debug", "/trace", "/profiler", "/.env",
            "/config", "/settings",
        ],
    ),
    (
        PathGroup::SensitiveFiles,
        &[
            "/config.php", "/wp-config.php", "/settings.py", "/package.json", "/composer.json",
            "/README.md", "/phpinfo.php", "/info.php", "/test.php", "/.git/config",
        ],
    ),
];

/// The default catalog in its stable order.
pub fn candidate_paths() -> Vec<String> {
    normalize(
        CATALOG
            .iter()
            .flat_map(|(_, paths)| paths.iter().map(|p| p.to_string())),
    )
}

/// Reads a catalog override: one path per line, blank lines and `#` comments ignored.
pub fn load_override(path: &Path) -> Result<Vec<String>, ScanError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScanError::config(format!("cannot read path catalog '{}': {}", path.display(), e))
    })?;
    let paths = parse_override(&content);
    if paths.is_empty() {
        return Err(ScanError::config(format!(
            "path catalog '{}' contains no paths",
            path.display()
        )));
    }
    info!(file = %path.display(), count = paths.len(), "Loaded path catalog override.");
    Ok(paths)
}

fn parse_override(content: &str) -> Vec<String> {
    normalize(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from),
    )
}

/// Adds a leading slash, drops the root (always probed first) and protocol-relative
/// paths, and removes duplicates keeping the first occurrence.
pub fn normalize(paths: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for raw in paths {
        let trimmed = raw.trim();
        let path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        if path == "/" || path.starts_with("//") {
            debug!(path = %path, "Skipping catalog path.");
            continue;
        }
        if seen.insert(path.clone()) {
            normalized.push(path);
        }
    }
    normalized
}
