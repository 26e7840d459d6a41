// src/core/extractors/headers.rs

use tracing::debug;

use super::{Extractor, ProbeContext};
use crate::core::models::{Severity, Signal, SignalKind};

/// A security header every root response should carry.
struct RequiredHeader {
    name: &'static str,
    code: &'static str,
    severity: Severity,
}

static REQUIRED_HEADERS: &[RequiredHeader] = &[
    RequiredHeader {
        name: "strict-transport-security",
        code: "HEADERS_HSTS_MISSING",
        severity: Severity::High,
    },
    RequiredHeader {
        name: "content-security-policy",
        code: "HEADERS_CSP_MISSING",
        severity: Severity::Medium,
    },
    RequiredHeader {
        name: "x-frame-options",
        code: "HEADERS_X_FRAME_OPTIONS_MISSING",
        severity: Severity::Medium,
    },
    RequiredHeader {
        name: "x-content-type-options",
        code: "HEADERS_X_CONTENT_TYPE_OPTIONS_MISSING",
        severity: Severity::Low,
    },
    RequiredHeader {
        name: "referrer-policy",
        code: "HEADERS_REFERRER_POLICY_MISSING",
        severity: Severity::Low,
    },
];

/// Checks the `GET /` response for the required security headers. Other probes are
/// ignored so a missing header is reported once per run, not once per endpoint.
pub struct MissingSecurityHeaders;

impl Extractor for MissingSecurityHeaders {
    fn name(&self) -> &'static str {
        "missing-security-headers"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        if !probe.result.is_root_get() {
            return Vec::new();
        }

        REQUIRED_HEADERS
            .iter()
            .filter(|header| !probe.result.has_header(header.name))
            .map(|header| {
                debug!(header_name = header.name, "Security header missing.");
                Signal::new(
                    SignalKind::MissingSecurityHeader,
                    header.severity,
                    header.code,
                    probe.source(),
                    format!("Header '{}' not present", header.name),
                )
            })
            .collect()
    }
}
