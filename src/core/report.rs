// src/core/report.rs

//! Assembles the terminal `Report` of a run and writes it to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::core::error::ExtractionError;
use crate::core::models::{
    ProbeOutcome, ProbeRecord, Report, ReportMetadata, ReportSummary, ResponseTimeStats,
    RiskLevel, SeverityCounts, Signal, Target,
};

pub const TOOL_NAME: &str = env!("CARGO_PKG_NAME");
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the report. Probe order and signal order are kept exactly as given.
pub fn build(
    target: &Target,
    outcomes: Vec<ProbeOutcome>,
    signals: Vec<Signal>,
    risk_level: RiskLevel,
    incomplete: bool,
    extraction_errors: Vec<ExtractionError>,
) -> Report {
    let mut summary = ReportSummary {
        severity_counts: SeverityCounts::from_signals(&signals),
        total_signals: signals.len(),
        probes_total: outcomes.len(),
        probes_completed: 0,
        probes_unreachable: 0,
        probes_cancelled: 0,
        response_times: ResponseTimeStats::from_outcomes(&outcomes),
    };

    let probes = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| {
            match &outcome {
                ProbeOutcome::Completed(_) => summary.probes_completed += 1,
                ProbeOutcome::Unreachable { .. } => summary.probes_unreachable += 1,
                ProbeOutcome::Cancelled { .. } => summary.probes_cancelled += 1,
            }
            let mut signal_codes: Vec<&'static str> = Vec::new();
            for signal in signals.iter().filter(|s| s.source.probe_index == index) {
                if !signal_codes.contains(&signal.code) {
                    signal_codes.push(signal.code);
                }
            }
            let request = outcome.request();
            ProbeRecord {
                index,
                method: request.method,
                path: request.path.clone(),
                signal_codes,
                outcome,
            }
        })
        .collect();

    Report {
        metadata: ReportMetadata {
            target: target.clone(),
            generated_at: Utc::now(),
            tool: TOOL_NAME,
            tool_version: TOOL_VERSION,
            risk_level,
            incomplete,
        },
        summary,
        signals,
        probes,
        extraction_errors,
    }
}

pub fn to_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// `report/<host>.json`, with a leading `www.` dropped from the host.
pub fn default_output_path(target: &Target) -> PathBuf {
    let host = target.host();
    let host = host.strip_prefix("www.").unwrap_or(host);
    Path::new("report").join(format!("{}.json", host))
}

/// Writes the report as pretty JSON, creating parent directories as needed.
pub fn write_report(report: &Report, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = to_json(report).map_err(io::Error::other)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "Report written.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;

    use super::*;
    use crate::core::error::ProbeError;
    use crate::core::extractors::test_support::{get, https_target};
    use crate::core::models::{ProbeMethod, ProbeRequest, Severity, SignalKind, SignalSource};

    fn fixture() -> (Vec<ProbeOutcome>, Vec<Signal>) {
        let outcomes = vec![
            ProbeOutcome::Completed(get("/", 200, &[("Server", "nginx/1.2.0")], "AKIA1234567890123456")),
            ProbeOutcome::Unreachable {
                request: ProbeRequest::get("/health", Duration::from_secs(10)),
                error: ProbeError::Network("connection refused".into()),
            },
            ProbeOutcome::Completed(get("/admin", 200, &[], "")),
            ProbeOutcome::Cancelled { request: ProbeRequest::get("/debug", Duration::from_secs(10)) },
        ];
        let source = |index: usize, path: &str| SignalSource {
            probe_index: index,
            method: ProbeMethod::Get,
            path: path.to_string(),
        };
        let signals = vec![
            Signal::new(SignalKind::SensitiveDataExposed, Severity::High, "DATA_AWS_KEYS", source(0, "/"), "AWS Keys"),
            Signal::new(
                SignalKind::InformationDisclosure,
                Severity::Critical,
                "EXPOSURE_ADMIN_INTERFACE",
                source(2, "/admin"),
                "/admin answered 200 without authentication",
            ),
            Signal::new(
                SignalKind::MissingSecurityHeader,
                Severity::High,
                "HEADERS_HSTS_MISSING",
                source(0, "/"),
                "Strict-Transport-Security",
            ),
        ];
        (outcomes, signals)
    }

    fn without_timestamp(report: &Report) -> serde_json::Value {
        let mut value = serde_json::to_value(report).unwrap();
        value["metadata"].as_object_mut().unwrap().remove("generatedAt");
        value
    }

    #[test]
    fn building_twice_is_identical_apart_from_timestamp() {
        let target = https_target();
        let (outcomes, signals) = fixture();
        let first = build(&target, outcomes.clone(), signals.clone(), RiskLevel::Critical, false, vec![]);
        let second = build(&target, outcomes, signals, RiskLevel::Critical, false, vec![]);
        assert_eq!(without_timestamp(&first), without_timestamp(&second));
    }

    #[test]
    fn order_and_counts_are_preserved() {
        let (outcomes, signals) = fixture();
        let report = build(&https_target(), outcomes, signals, RiskLevel::Critical, true, vec![]);

        let paths: Vec<_> = report.probes.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, ["/", "/health", "/admin", "/debug"]);
        let codes: Vec<_> = report.signals.iter().map(|s| s.code).collect();
        assert_eq!(codes, ["DATA_AWS_KEYS", "EXPOSURE_ADMIN_INTERFACE", "HEADERS_HSTS_MISSING"]);

        assert_eq!(report.probes[0].signal_codes, ["DATA_AWS_KEYS", "HEADERS_HSTS_MISSING"]);
        assert!(report.probes[1].signal_codes.is_empty());

        let summary = &report.summary;
        assert_eq!(summary.total_signals, 3);
        assert_eq!(summary.severity_counts.high, 2);
        assert_eq!(summary.severity_counts.critical, 1);
        assert_eq!(
            (summary.probes_total, summary.probes_completed, summary.probes_unreachable, summary.probes_cancelled),
            (4, 2, 1, 1)
        );
        let times = summary.response_times.unwrap();
        assert_eq!((times.samples, times.min_ms, times.max_ms), (2, 5, 5));
        assert!(report.metadata.incomplete);
    }

    #[test]
    fn json_shape_and_no_bodies() {
        let (outcomes, signals) = fixture();
        let report = build(&https_target(), outcomes, signals, RiskLevel::Critical, false, vec![]);
        let json = to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["target"], "https://example.test");
        assert_eq!(value["metadata"]["riskLevel"], "CRITICAL");
        assert_eq!(value["metadata"]["tool"], TOOL_NAME);
        assert_eq!(value["summary"]["severityCounts"]["critical"], 1);
        assert_eq!(value["signals"][0]["evidence"], "AWS Keys");
        assert_eq!(value["probes"][3]["outcome"]["status"], "cancelled");
        assert!(value.get("extractionErrors").is_none());
        assert!(!json.contains("AKIA1234567890123456"));
    }

    #[test]
    fn default_output_drops_www() {
        let target = Target::parse("https://www.example.test").unwrap();
        assert_eq!(default_output_path(&target), Path::new("report/example.test.json"));
    }

    #[test]
    fn writes_report_creating_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let (outcomes, signals) = fixture();
        let report = build(&https_target(), outcomes, signals, RiskLevel::Critical, false, vec![]);

        write_report(&report, &path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["totalSignals"], 3);
    }
}
