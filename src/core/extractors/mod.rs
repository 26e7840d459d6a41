// src/core/extractors/mod.rs

//! Signal extractors.
//!
//! Each extractor is a stateless function of one probe result. Extractors never see
//! each other's output and may run in any order; the registry only fixes the order in
//! which their signals are appended.

pub mod build_info;
pub mod exposure;
pub mod fingerprint;
pub mod headers;
pub mod methods;
pub mod rate_limit;
pub mod secrets;
pub mod software;
pub mod transport;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::core::error::ExtractionError;
use crate::core::models::{ProbeOutcome, ProbeResult, Signal, SignalSource, Target};

/// Everything an extractor may look at for one probe.
#[derive(Debug, Clone, Copy)]
pub struct ProbeContext<'a> {
    pub target: &'a Target,
    /// Position of the probe in the run's plan.
    pub index: usize,
    pub result: &'a ProbeResult,
    /// This is the earliest completed probe of the run, in plan order. Run-wide
    /// checks attach their signal here so they fire exactly once.
    pub first_response: bool,
}

impl ProbeContext<'_> {
    pub fn source(&self) -> SignalSource {
        SignalSource {
            probe_index: self.index,
            method: self.result.request.method,
            path: self.result.request.path.clone(),
        }
    }
}

/// The extractor contract: inspect one response, emit zero or more signals.
///
/// Implementations must not fail on empty or malformed bodies; absence of data is
/// simply absence of signals.
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal>;
}

/// All built-in extractors, in the order their signals appear in a report.
pub fn default_registry() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(transport::InsecureTransport),
        Box::new(headers::MissingSecurityHeaders),
        Box::new(software::OutdatedSoftware),
        Box::new(software::ServerVersionDisclosure),
        Box::new(fingerprint::TechnologyFingerprint),
        Box::new(methods::DangerousMethods),
        Box::new(exposure::AdminExposure),
        Box::new(exposure::UnauthenticatedApi),
        Box::new(exposure::SensitiveFileExposure),
        Box::new(build_info::BuildInfoDisclosure),
        Box::new(rate_limit::RateLimiting),
        Box::new(secrets::SensitiveData),
    ]
}

/// Signals and extractor failures collected over a whole run.
#[derive(Debug, Default)]
pub struct Extraction {
    pub signals: Vec<Signal>,
    pub errors: Vec<ExtractionError>,
}

/// Runs every extractor over every completed probe, in probe order.
///
/// A panicking extractor loses its signals for that probe only; the failure is logged
/// and recorded, and the remaining extractors still run.
pub fn run_extractors(
    registry: &[Box<dyn Extractor>],
    target: &Target,
    outcomes: &[ProbeOutcome],
) -> Extraction {
    let mut extraction = Extraction::default();
    let first_completed = outcomes.iter().position(|outcome| outcome.result().is_some());

    for (index, outcome) in outcomes.iter().enumerate() {
        let Some(result) = outcome.result() else {
            continue;
        };
        let probe = ProbeContext {
            target,
            index,
            result,
            first_response: first_completed == Some(index),
        };

        for extractor in registry {
            match panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(&probe))) {
                Ok(signals) => {
                    if !signals.is_empty() {
                        debug!(
                            extractor = extractor.name(),
                            path = %result.request.path,
                            count = signals.len(),
                            "Extractor emitted signals."
                        );
                    }
                    extraction.signals.extend(signals);
                }
                Err(payload) => {
                    let failure = ExtractionError {
                        extractor: extractor.name(),
                        probe_index: index,
                        message: panic_message(payload.as_ref()),
                    };
                    error!(error = %failure, "Extractor failed, skipping its signals for this probe.");
                    extraction.errors.push(failure);
                }
            }
        }
    }

    extraction
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

    use crate::core::models::{ProbeMethod, ProbeRequest, ProbeResult, Target};

    pub fn response(
        method: ProbeMethod,
        path: &str,
        status: u16,
        headers: &[(&str, &str)],
        body: &str,
    ) -> ProbeResult {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        ProbeResult {
            request: ProbeRequest::new(method, path, Duration::from_secs(10)),
            status,
            headers: map,
            body: body.as_bytes().to_vec(),
            truncated: false,
            elapsed: Duration::from_millis(5),
        }
    }

    pub fn get(path: &str, status: u16, headers: &[(&str, &str)], body: &str) -> ProbeResult {
        response(ProbeMethod::Get, path, status, headers, body)
    }

    pub fn https_target() -> Target {
        Target::parse("https://example.test").unwrap()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::test_support::{get, https_target};
    use super::*;
    use crate::core::knowledge_base::get_finding_detail;
    use crate::core::models::{Severity, SignalKind};

    struct Exploding;

    impl Extractor for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn extract(&self, _probe: &ProbeContext<'_>) -> Vec<Signal> {
            panic!("boom");
        }
    }

    struct AlwaysOne;

    impl Extractor for AlwaysOne {
        fn name(&self) -> &'static str {
            "always-one"
        }

        fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
            vec![Signal::new(
                SignalKind::InformationDisclosure,
                Severity::Low,
                "SERVER_VERSION_DISCLOSED",
                probe.source(),
                "test",
            )]
        }
    }

    #[test]
    fn panicking_extractor_is_recorded_and_skipped() {
        let registry: Vec<Box<dyn Extractor>> = vec![Box::new(Exploding), Box::new(AlwaysOne)];
        let outcomes = vec![
            ProbeOutcome::Completed(get("/", 200, &[], "")),
            ProbeOutcome::Completed(get("/api", 200, &[], "")),
        ];
        let extraction = run_extractors(&registry, &https_target(), &outcomes);

        assert_eq!(extraction.signals.len(), 2);
        assert_eq!(extraction.errors.len(), 2);
        assert_eq!(extraction.errors[0].extractor, "exploding");
        assert_eq!(extraction.errors[0].message, "boom");
        assert_eq!(extraction.errors[1].probe_index, 1);
    }

    #[test]
    fn signals_are_attributed_to_their_probe() {
        let registry: Vec<Box<dyn Extractor>> = vec![Box::new(AlwaysOne)];
        let outcomes = vec![
            ProbeOutcome::Unreachable {
                request: crate::core::models::ProbeRequest::get("/", Duration::from_secs(1)),
                error: crate::core::error::ProbeError::Timeout(1000),
            },
            ProbeOutcome::Completed(get("/health", 200, &[], "")),
        ];
        let extraction = run_extractors(&registry, &https_target(), &outcomes);
        assert_eq!(extraction.signals.len(), 1);
        assert_eq!(extraction.signals[0].source.probe_index, 1);
        assert_eq!(extraction.signals[0].source.path, "/health");
    }

    #[test]
    fn only_the_earliest_answer_is_flagged_as_first() {
        struct FirstOnly;
        impl Extractor for FirstOnly {
            fn name(&self) -> &'static str {
                "first-only"
            }
            fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
                if !probe.first_response {
                    return Vec::new();
                }
                AlwaysOne.extract(probe)
            }
        }

        let registry: Vec<Box<dyn Extractor>> = vec![Box::new(FirstOnly)];
        let outcomes = vec![
            ProbeOutcome::Cancelled { request: crate::core::models::ProbeRequest::get("/", Duration::from_secs(1)) },
            ProbeOutcome::Completed(get("/health", 200, &[], "")),
            ProbeOutcome::Completed(get("/", 200, &[], "")),
        ];
        let signals = run_extractors(&registry, &https_target(), &outcomes).signals;
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].source.probe_index, 1);
    }

    #[test]
    fn every_emitted_code_is_documented() {
        let target = Target::parse("http://example.test").unwrap();
        let root = get(
            "/",
            200,
            &[("server", "Apache/2.2.15 (CentOS)"), ("x-powered-by", "PHP/5.3.3")],
            "<html><script src=\"/js/jquery-3.1.0.min.js\"></script> admin@example.test</html>",
        );
        let outcomes = vec![
            ProbeOutcome::Completed(root),
            ProbeOutcome::Completed(get("/admin", 200, &[], "AKIA1234567890123456")),
            ProbeOutcome::Completed(get("/api", 200, &[], "")),
            ProbeOutcome::Completed(get("/composer.json", 200, &[], "{}")),
            ProbeOutcome::Completed(get("/version", 200, &[], r#"{"version":"1.0.0"}"#)),
            ProbeOutcome::Completed(get("/openapi.json", 200, &[], r#"{"info":{"version":"2"}}"#)),
            ProbeOutcome::Completed(test_support::response(
                crate::core::models::ProbeMethod::Put,
                "/",
                200,
                &[],
                "",
            )),
        ];
        let extraction = run_extractors(&default_registry(), &target, &outcomes);
        assert!(extraction.errors.is_empty());
        assert!(extraction.signals.len() > 10);
        for code in ["DISCLOSURE_BUILD_INFO", "DISCLOSURE_API_VERSION", "API_RATE_LIMIT_MISSING"] {
            assert!(extraction.signals.iter().any(|s| s.code == code), "{} not emitted", code);
        }
        for signal in &extraction.signals {
            assert!(get_finding_detail(signal.code).is_some(), "undocumented {}", signal.code);
        }
    }
}
