// src/core/extractors/rate_limit.rs

use super::{Extractor, ProbeContext};
use crate::core::models::{ProbeMethod, Severity, Signal, SignalKind};

/// Any one of these on the `/api` answer counts as a rate-limiting policy.
const RATE_LIMIT_HEADERS: [&str; 7] = [
    "x-ratelimit-limit",
    "x-rate-limit-limit",
    "x-ratelimit-remaining",
    "x-rate-limit-remaining",
    "x-ratelimit-reset",
    "x-rate-limit-reset",
    "retry-after",
];

const API_ROOT: &str = "/api";

/// A successful `GET /api` that advertises no rate-limiting headers.
pub struct RateLimiting;

impl Extractor for RateLimiting {
    fn name(&self) -> &'static str {
        "rate-limiting"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        let result = probe.result;
        if result.request.method != ProbeMethod::Get
            || result.request.path != API_ROOT
            || !(200..300).contains(&result.status)
            || RATE_LIMIT_HEADERS.iter().any(|h| result.has_header(h))
        {
            return Vec::new();
        }
        vec![Signal::new(
            SignalKind::RateLimitingAbsent,
            Severity::Low,
            "API_RATE_LIMIT_MISSING",
            probe.source(),
            format!("{} answered {} without rate-limit headers", API_ROOT, result.status),
        )]
    }
}
