// src/core/extractors/methods.rs

use super::{Extractor, ProbeContext};
use crate::core::models::{Severity, Signal, SignalKind};

/// Statuses that mean the server refused the method.
const REFUSED_STATUSES: [u16; 3] = [404, 405, 501];

/// Flags non-GET/HEAD probes against `/` that the server did not refuse.
pub struct DangerousMethods;

impl Extractor for DangerousMethods {
    fn name(&self) -> &'static str {
        "dangerous-methods"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        let request = &probe.result.request;
        if request.method.is_read_only()
            || !request.is_root()
            || REFUSED_STATUSES.contains(&probe.result.status)
        {
            return Vec::new();
        }

        vec![Signal::new(
            SignalKind::DangerousMethodAllowed,
            Severity::Medium,
            "METHOD_DANGEROUS_ALLOWED",
            probe.source(),
            format!("{} / answered {}", request.method, probe.result.status),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractors::test_support::{https_target, response};
    use crate::core::models::ProbeMethod;

    fn run(method: ProbeMethod, path: &str, status: u16) -> Vec<Signal> {
        let target = https_target();
        let result = response(method, path, status, &[], "");
        DangerousMethods.extract(&ProbeContext { target: &target, index: 0, result: &result, first_response: true })
    }

    #[test]
    fn accepted_method_is_flagged() {
        let signals = run(ProbeMethod::Put, "/", 200);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].severity, Severity::Medium);
        assert_eq!(signals[0].evidence, "PUT / answered 200");
    }

    #[test]
    fn other_statuses_count_as_allowed() {
        assert_eq!(run(ProbeMethod::Trace, "/", 403).len(), 1);
        assert_eq!(run(ProbeMethod::Options, "/", 204).len(), 1);
    }

    #[test]
    fn refused_methods_are_not_flagged() {
        for status in REFUSED_STATUSES {
            assert!(run(ProbeMethod::Delete, "/", status).is_empty());
        }
    }

    #[test]
    fn read_only_methods_and_other_paths_are_ignored() {
        assert!(run(ProbeMethod::Get, "/", 200).is_empty());
        assert!(run(ProbeMethod::Head, "/", 200).is_empty());
        assert!(run(ProbeMethod::Put, "/api", 200).is_empty());
    }
}
