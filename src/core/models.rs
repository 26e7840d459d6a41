// src/core/models.rs

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Serialize, Serializer};
use strum::Display;
use url::Url;

use crate::core::error::{ExtractionError, ProbeError, ScanError};
use crate::core::knowledge_base;

// --- Target ---

/// The origin (scheme, host, port) a run is pointed at. Path, query, fragment and
/// credentials of the user input are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    origin: Url,
}

impl Target {
    /// Parses user input into a target. Input without a scheme is treated as https,
    /// the same way the scanner always treated bare domains.
    pub fn parse(input: &str) -> Result<Self, ScanError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ScanError::config("target URL is empty"));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let mut origin = Url::parse(&with_scheme)
            .map_err(|e| ScanError::config(format!("invalid target '{}': {}", trimmed, e)))?;

        match origin.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ScanError::config(format!(
                    "unsupported scheme '{}' in target '{}', expected http or https",
                    other, trimmed
                )));
            }
        }
        if origin.host_str().is_none_or(str::is_empty) {
            return Err(ScanError::config(format!("target '{}' has no host", trimmed)));
        }

        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        // Both only fail for cannot-be-a-base URLs, which http(s) never are.
        let _ = origin.set_username("");
        let _ = origin.set_password(None);

        Ok(Self { origin })
    }

    /// `scheme://host[:port]` without a trailing slash.
    pub fn origin(&self) -> String {
        self.origin.origin().ascii_serialization()
    }

    pub fn host(&self) -> &str {
        self.origin.host_str().unwrap_or_default()
    }

    pub fn scheme(&self) -> &str {
        self.origin.scheme()
    }

    pub fn is_encrypted(&self) -> bool {
        self.origin.scheme() == "https"
    }

    /// Resolves a catalog path against the origin. A path that would escape the
    /// origin (e.g. `//other.host/`) is rejected.
    pub fn url_for(&self, path: &str) -> Result<Url, ScanError> {
        let url = self
            .origin
            .join(path)
            .map_err(|e| ScanError::config(format!("invalid probe path '{}': {}", path, e)))?;
        if url.origin() != self.origin.origin() {
            return Err(ScanError::config(format!(
                "probe path '{}' leaves the target origin",
                path
            )));
        }
        Ok(url)
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.origin())
    }
}

// --- Probe Requests ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ProbeMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Trace,
    Options,
}

impl ProbeMethod {
    /// Methods sent against the root to check how permissive the server is.
    pub const PERMISSIVENESS_CHECKS: [ProbeMethod; 5] = [
        ProbeMethod::Put,
        ProbeMethod::Delete,
        ProbeMethod::Patch,
        ProbeMethod::Trace,
        ProbeMethod::Options,
    ];

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            ProbeMethod::Get => reqwest::Method::GET,
            ProbeMethod::Head => reqwest::Method::HEAD,
            ProbeMethod::Post => reqwest::Method::POST,
            ProbeMethod::Put => reqwest::Method::PUT,
            ProbeMethod::Delete => reqwest::Method::DELETE,
            ProbeMethod::Patch => reqwest::Method::PATCH,
            ProbeMethod::Trace => reqwest::Method::TRACE,
            ProbeMethod::Options => reqwest::Method::OPTIONS,
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, ProbeMethod::Get | ProbeMethod::Head)
    }
}

/// One planned HTTP request. Never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub path: String,
    pub method: ProbeMethod,
    /// Sent in addition to the client's defaults (user agent).
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl ProbeRequest {
    pub fn new(method: ProbeMethod, path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            method,
            headers: HeaderMap::new(),
            timeout,
        }
    }

    pub fn get(path: impl Into<String>, timeout: Duration) -> Self {
        Self::new(ProbeMethod::Get, path, timeout)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn is_root(&self) -> bool {
        self.path == "/"
    }
}

// --- Probe Results ---

/// A received response. Any status code, 4xx and 5xx included, is a valid result.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub request: ProbeRequest,
    pub status: u16,
    /// Lookups on a `HeaderMap` are case-insensitive.
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// The body hit the configured size cap and was cut short.
    pub truncated: bool,
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The baseline `GET /` response that root-only checks inspect.
    pub fn is_root_get(&self) -> bool {
        self.request.is_root() && self.request.method == ProbeMethod::Get
    }

    /// True when the response shows any sign of an authentication layer.
    pub fn has_auth_indicator(&self) -> bool {
        self.has_header("www-authenticate")
            || self.has_header("authorization")
            || self.has_header("set-cookie")
    }

    /// Headers with lowercased names, sorted, multiple values joined with ", ".
    pub fn header_summary(&self) -> BTreeMap<String, String> {
        let mut summary: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in &self.headers {
            let value = value.to_str().unwrap_or("[Invalid UTF-8]");
            summary
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        summary
    }
}

/// What happened to one planned probe.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Completed(ProbeResult),
    Unreachable { request: ProbeRequest, error: ProbeError },
    /// The run-wide deadline fired before this probe finished.
    Cancelled { request: ProbeRequest },
}

impl ProbeOutcome {
    pub fn request(&self) -> &ProbeRequest {
        match self {
            ProbeOutcome::Completed(result) => &result.request,
            ProbeOutcome::Unreachable { request, .. } => request,
            ProbeOutcome::Cancelled { request } => request,
        }
    }

    pub fn result(&self) -> Option<&ProbeResult> {
        match self {
            ProbeOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }
}

/// Serialized view of an outcome. The body itself is never written out.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum OutcomeView<'a> {
    Completed {
        status_code: u16,
        headers: BTreeMap<String, String>,
        elapsed_ms: u64,
        body_bytes: usize,
        truncated: bool,
    },
    Unreachable {
        error: &'a ProbeError,
    },
    Cancelled,
}

impl Serialize for ProbeOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let view = match self {
            ProbeOutcome::Completed(result) => OutcomeView::Completed {
                status_code: result.status,
                headers: result.header_summary(),
                elapsed_ms: result.elapsed.as_millis() as u64,
                body_bytes: result.body.len(),
                truncated: result.truncated,
            },
            ProbeOutcome::Unreachable { error, .. } => OutcomeView::Unreachable { error },
            ProbeOutcome::Cancelled { .. } => OutcomeView::Cancelled,
        };
        view.serialize(serializer)
    }
}

// --- Signals ---

/// Severity of a single signal. `Info` marks observations (detected technologies)
/// that never move the risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum SignalKind {
    TechnologyDetected,
    SensitiveDataExposed,
    MissingSecurityHeader,
    DangerousMethodAllowed,
    AuthenticationAbsent,
    InformationDisclosure,
    OutdatedSoftware,
    RateLimitingAbsent,
}

/// Points a signal back at the probe it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSource {
    pub probe_index: usize,
    pub method: ProbeMethod,
    pub path: String,
}

/// One atomic finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub kind: SignalKind,
    pub severity: Severity,
    /// Stable machine-readable identifier, the key into the knowledge base.
    pub code: &'static str,
    pub source: SignalSource,
    /// Label-level evidence. Never contains matched secret material.
    pub evidence: String,
    pub recommendation: &'static str,
}

impl Signal {
    pub fn new(
        kind: SignalKind,
        severity: Severity,
        code: &'static str,
        source: SignalSource,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            code,
            source,
            evidence: evidence.into(),
            recommendation: knowledge_base::remediation_for(code),
        }
    }
}

// --- Risk ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn from_signals(signals: &[Signal]) -> Self {
        signals.iter().fold(Self::default(), |mut counts, signal| {
            match signal.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
                Severity::Info => counts.info += 1,
            }
            counts
        })
    }
}

// --- Report ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub target: Target,
    pub generated_at: DateTime<Utc>,
    pub tool: &'static str,
    pub tool_version: &'static str,
    pub risk_level: RiskLevel,
    /// Set when the run-wide deadline cut probing short.
    pub incomplete: bool,
}

/// Response time statistics over the completed probes, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeStats {
    pub samples: usize,
    pub average_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl ResponseTimeStats {
    /// `None` when no probe completed.
    pub fn from_outcomes(outcomes: &[ProbeOutcome]) -> Option<Self> {
        let times: Vec<u64> = outcomes
            .iter()
            .filter_map(ProbeOutcome::result)
            .map(|result| result.elapsed.as_millis() as u64)
            .collect();
        let min_ms = *times.iter().min()?;
        let max_ms = *times.iter().max()?;
        Some(Self {
            samples: times.len(),
            average_ms: times.iter().sum::<u64>() as f64 / times.len() as f64,
            min_ms,
            max_ms,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub severity_counts: SeverityCounts,
    pub total_signals: usize,
    pub probes_total: usize,
    pub probes_completed: usize,
    pub probes_unreachable: usize,
    pub probes_cancelled: usize,
    /// `null` when no probe completed.
    pub response_times: Option<ResponseTimeStats>,
}

/// A probe outcome in plan order, with the codes of the signals raised from it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRecord {
    pub index: usize,
    pub method: ProbeMethod,
    pub path: String,
    pub outcome: ProbeOutcome,
    pub signal_codes: Vec<&'static str>,
}

/// The terminal artifact of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub signals: Vec<Signal>,
    pub probes: Vec<ProbeRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extraction_errors: Vec<ExtractionError>,
}
