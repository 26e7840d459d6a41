// src/core/extractors/transport.rs

use super::{Extractor, ProbeContext};
use crate::core::models::{Severity, Signal, SignalKind};

/// Flags plain-HTTP targets. Attached to the first probe that got an answer, so it
/// fires once per run even when the root itself was unreachable.
pub struct InsecureTransport;

impl Extractor for InsecureTransport {
    fn name(&self) -> &'static str {
        "insecure-transport"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        if probe.target.is_encrypted() || !probe.first_response {
            return Vec::new();
        }
        vec![Signal::new(
            SignalKind::InformationDisclosure,
            Severity::High,
            "TRANSPORT_UNENCRYPTED",
            probe.source(),
            format!("Target served over {}://", probe.target.scheme()),
        )]
    }
}
