// src/core/extractors/exposure.rs

//! Checks for endpoints that answer anonymous clients when they should not.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Extractor, ProbeContext};
use crate::core::models::{ProbeMethod, ProbeResult, Severity, Signal, SignalKind};

static RE_ADMIN_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:admin|debug|/\.env(?:$|[./])|/actuator/env(?:$|/))").unwrap()
});
static RE_API_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|/)(?:api|rest|graphql)(?:$|[/\-_.]|v\d)").unwrap());
static RE_SENSITIVE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|/)(?:config\.php|wp-config\.php|settings\.py|package\.json|composer\.json|readme\.md|phpinfo\.php|info\.php|test\.php|\.git/config)$",
    )
    .unwrap()
});

/// A successful anonymous GET: status 200 and no authentication indicator.
fn answered_anonymously(result: &ProbeResult) -> bool {
    result.request.method == ProbeMethod::Get
        && result.status == 200
        && !result.has_auth_indicator()
}

/// Admin panels, debug endpoints and environment dumps open to anyone.
pub struct AdminExposure;

impl Extractor for AdminExposure {
    fn name(&self) -> &'static str {
        "admin-exposure"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        let result = probe.result;
        if !RE_ADMIN_PATH.is_match(&result.request.path) || !answered_anonymously(result) {
            return Vec::new();
        }
        vec![Signal::new(
            SignalKind::InformationDisclosure,
            Severity::Critical,
            "EXPOSURE_ADMIN_INTERFACE",
            probe.source(),
            format!("{} answered 200 without authentication", result.request.path),
        )]
    }
}

/// API endpoints that serve data without asking for credentials.
pub struct UnauthenticatedApi;

impl Extractor for UnauthenticatedApi {
    fn name(&self) -> &'static str {
        "unauthenticated-api"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        let result = probe.result;
        if !RE_API_PATH.is_match(&result.request.path) || !answered_anonymously(result) {
            return Vec::new();
        }
        vec![Signal::new(
            SignalKind::AuthenticationAbsent,
            Severity::High,
            "EXPOSURE_API_UNAUTHENTICATED",
            probe.source(),
            format!("{} answered 200 without authentication", result.request.path),
        )]
    }
}

/// Configuration files, manifests and diagnostics pages served publicly.
pub struct SensitiveFileExposure;

impl Extractor for SensitiveFileExposure {
    fn name(&self) -> &'static str {
        "sensitive-file-exposure"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        let result = probe.result;
        if result.request.method != ProbeMethod::Get
            || result.status != 200
            || !RE_SENSITIVE_FILE.is_match(&result.request.path)
        {
            return Vec::new();
        }
        vec![Signal::new(
            SignalKind::InformationDisclosure,
            Severity::High,
            "EXPOSURE_SENSITIVE_FILE",
            probe.source(),
            format!("{} is publicly accessible", result.request.path),
        )]
    }
}
