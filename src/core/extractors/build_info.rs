// src/core/extractors/build_info.rs

//! Build and version metadata served by status and documentation endpoints.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Extractor, ProbeContext};
use crate::core::models::{ProbeMethod, ProbeResult, Severity, Signal, SignalKind};

/// Endpoints that conventionally describe the running build.
const BUILD_ENDPOINTS: [&str; 4] = ["/build-info", "/info", "/version", "/about"];
/// API description documents whose `info.version` names the API release.
const DOC_ENDPOINTS: [&str; 3] = ["/api-docs", "/swagger", "/openapi.json"];

/// Longest field value echoed into evidence.
const MAX_VALUE_LEN: usize = 64;

/// Plain-text fallbacks, tried when the body is not JSON.
static TEXT_FIELDS: Lazy<[(&str, Regex); 3]> = Lazy::new(|| {
    [
        ("version", Regex::new(r"(?i)version[:\s]+([^\s,}]+)").unwrap()),
        ("buildTime", Regex::new(r"(?i)build[_\s]*time[:\s]+([^\s,}]+)").unwrap()),
        ("gitCommit", Regex::new(r"(?i)git[_\s]*commit[:\s]+([^\s,}]+)").unwrap()),
    ]
});
static RE_DOC_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)version["\s]*[:=]["\s]*([^",\s}]+)"#).unwrap());

/// JSON keys read from a build document, with the name reported for each.
const JSON_FIELDS: [(&str, &[&str]); 4] = [
    ("version", &["version"]),
    ("buildTime", &["buildTime", "build_time"]),
    ("gitCommit", &["gitCommit", "git_commit"]),
    ("environment", &["environment"]),
];

/// Emits one `low` signal when a build endpoint or API document discloses release
/// details such as version, build time, commit or environment.
pub struct BuildInfoDisclosure;

impl Extractor for BuildInfoDisclosure {
    fn name(&self) -> &'static str {
        "build-info-disclosure"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        let result = probe.result;
        if result.request.method != ProbeMethod::Get || result.status != 200 || result.body.is_empty()
        {
            return Vec::new();
        }

        let path = result.request.path.as_str();
        let (code, fields) = if BUILD_ENDPOINTS.contains(&path) {
            ("DISCLOSURE_BUILD_INFO", build_fields(result))
        } else if DOC_ENDPOINTS.contains(&path) {
            ("DISCLOSURE_API_VERSION", doc_version(result))
        } else {
            return Vec::new();
        };
        if fields.is_empty() {
            return Vec::new();
        }

        let evidence = fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        vec![Signal::new(
            SignalKind::InformationDisclosure,
            Severity::Low,
            code,
            probe.source(),
            format!("{} exposes {}", path, evidence),
        )]
    }
}

fn build_fields(result: &ProbeResult) -> Vec<(&'static str, String)> {
    match serde_json::from_slice::<Value>(&result.body) {
        Ok(document) => JSON_FIELDS
            .iter()
            .filter_map(|(name, keys)| {
                keys.iter()
                    .find_map(|key| scalar(document.get(key)?))
                    .map(|value| (*name, value))
            })
            .collect(),
        Err(_) => {
            let body = result.body_text();
            TEXT_FIELDS
                .iter()
                .filter_map(|(name, re)| {
                    re.captures(&body).map(|caps| (*name, clip(&caps[1])))
                })
                .collect()
        }
    }
}

fn doc_version(result: &ProbeResult) -> Vec<(&'static str, String)> {
    let version = match serde_json::from_slice::<Value>(&result.body) {
        Ok(document) => document.pointer("/info/version").and_then(scalar),
        Err(_) => RE_DOC_VERSION
            .captures(&result.body_text())
            .map(|caps| clip(&caps[1])),
    };
    version.map(|v| vec![("version", v)]).unwrap_or_default()
}

/// Strings and numbers only; nested objects say nothing useful in one line.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(clip(s.trim())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn clip(value: &str) -> String {
    value.chars().take(MAX_VALUE_LEN).collect()
}
