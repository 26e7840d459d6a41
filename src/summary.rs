// src/summary.rs

//! The plain-text run overview printed after the report is written.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use crate::core::knowledge_base::{self, FindingCategory};
use crate::core::models::{Report, Severity, Signal};

/// Renders the overview: risk rating, counts, response timing, issues grouped by
/// category with their explanation, and the detected technologies.
pub fn render_summary(report: &Report, report_path: &Path) -> String {
    let mut out = String::new();
    let meta = &report.metadata;
    let counts = &report.summary.severity_counts;

    let _ = writeln!(out, "Target:      {}", meta.target.origin());
    let _ = writeln!(out, "Risk level:  {}", meta.risk_level);
    if meta.incomplete {
        let _ = writeln!(out, "             (incomplete: the run deadline cut probing short)");
    }
    let _ = writeln!(
        out,
        "Signals:     {} critical, {} high, {} medium, {} low, {} info",
        counts.critical, counts.high, counts.medium, counts.low, counts.info
    );
    let _ = writeln!(
        out,
        "Probes:      {} total, {} completed, {} unreachable, {} cancelled",
        report.summary.probes_total,
        report.summary.probes_completed,
        report.summary.probes_unreachable,
        report.summary.probes_cancelled
    );
    if let Some(times) = &report.summary.response_times {
        let _ = writeln!(
            out,
            "Timing:      avg {:.0} ms, min {} ms, max {} ms over {} responses",
            times.average_ms, times.min_ms, times.max_ms, times.samples
        );
    }

    // --- Issues, grouped the same way the knowledge base groups codes ---
    let mut grouped: BTreeMap<FindingCategory, Vec<&Signal>> = BTreeMap::new();
    let mut technologies = Vec::new();
    for signal in &report.signals {
        if signal.severity == Severity::Info {
            technologies.push(signal.evidence.as_str());
            continue;
        }
        let category = knowledge_base::get_finding_detail(signal.code)
            .map(|detail| detail.category)
            .unwrap_or(FindingCategory::Exposure);
        grouped.entry(category).or_default().push(signal);
    }

    if grouped.is_empty() {
        let _ = writeln!(out, "\nNo issues found.");
    }
    for (category, signals) in grouped {
        let _ = writeln!(out, "\n{}", category.to_string().to_uppercase());

        let mut codes: Vec<&str> = Vec::new();
        for signal in &signals {
            if !codes.contains(&signal.code) {
                codes.push(signal.code);
            }
        }
        for code in codes {
            match knowledge_base::get_finding_detail(code) {
                Some(detail) => {
                    let _ = writeln!(out, "  {}", detail.title);
                    let _ = writeln!(out, "    {}", detail.description);
                }
                None => {
                    let _ = writeln!(out, "  {}", code);
                }
            }
            for signal in signals.iter().filter(|s| s.code == code) {
                let _ = writeln!(
                    out,
                    "    [{:<8}] {} {}: {}",
                    signal.severity, signal.source.method, signal.source.path, signal.evidence
                );
            }
        }
    }

    if !technologies.is_empty() {
        let _ = writeln!(out, "\nTECHNOLOGIES");
        for tech in technologies {
            let _ = writeln!(out, "  - {}", tech);
        }
    }

    if !report.extraction_errors.is_empty() {
        let _ = writeln!(
            out,
            "\n{} extractor failure(s) recorded, see the report for details.",
            report.extraction_errors.len()
        );
    }

    let _ = writeln!(out, "\nReport written to {}", report_path.display());
    out
}
