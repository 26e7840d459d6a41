// src/core/extractors/software.rs

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Extractor, ProbeContext};
use crate::core::models::{Severity, Signal, SignalKind};

/// `product/version` tokens as they appear in `Server` and `X-Powered-By`.
static RE_PRODUCT_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([a-z][a-z0-9\-]*)/v?(\d+(?:\.\d+)*)").unwrap());

/// Release lines with publicly known vulnerabilities. A prefix matches whole version
/// components, so "1.2" matches 1.2 and 1.2.9 but not 1.20.
struct VulnerableRelease {
    product: &'static str,
    prefixes: &'static [&'static str],
}

static VULNERABLE_RELEASES: &[VulnerableRelease] = &[
    VulnerableRelease { product: "apache", prefixes: &["2.0", "2.2"] },
    VulnerableRelease { product: "nginx", prefixes: &["1.0", "1.2"] },
    VulnerableRelease { product: "php", prefixes: &["5", "7.0", "7.1"] },
    VulnerableRelease { product: "express", prefixes: &["3", "4.0", "4.1"] },
    VulnerableRelease { product: "microsoft-iis", prefixes: &["6.0", "7.0", "7.5"] },
    VulnerableRelease { product: "openssl", prefixes: &["0.9", "1.0"] },
];

const VERSION_HEADERS: [&str; 2] = ["server", "x-powered-by"];

fn version_matches(version: &str, prefix: &str) -> bool {
    version == prefix
        || version
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Matches the root response's version headers against `VULNERABLE_RELEASES`.
pub struct OutdatedSoftware;

impl Extractor for OutdatedSoftware {
    fn name(&self) -> &'static str {
        "outdated-software"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        if !probe.result.is_root_get() {
            return Vec::new();
        }

        let mut seen: Vec<(String, String)> = Vec::new();
        let mut signals = Vec::new();

        for header in VERSION_HEADERS {
            let Some(value) = probe.result.header(header) else {
                continue;
            };
            for caps in RE_PRODUCT_VERSION.captures_iter(value) {
                let product = caps[1].to_ascii_lowercase();
                let version = caps[2].to_string();

                let Some(release) = VULNERABLE_RELEASES.iter().find(|r| r.product == product)
                else {
                    continue;
                };
                if !release.prefixes.iter().any(|p| version_matches(&version, p)) {
                    continue;
                }
                if seen.iter().any(|(p, v)| *p == product && *v == version) {
                    continue;
                }

                signals.push(Signal::new(
                    SignalKind::OutdatedSoftware,
                    Severity::High,
                    "SOFTWARE_OUTDATED",
                    probe.source(),
                    format!("{}/{} announced in {} header", &caps[1], version, header),
                ));
                seen.push((product, version));
            }
        }

        signals
    }
}

/// A `Server` header that names an exact version.
pub struct ServerVersionDisclosure;

impl Extractor for ServerVersionDisclosure {
    fn name(&self) -> &'static str {
        "server-version-disclosure"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        if !probe.result.is_root_get() {
            return Vec::new();
        }
        match probe.result.header("server") {
            Some(server) if RE_PRODUCT_VERSION.is_match(server) => vec![Signal::new(
                SignalKind::InformationDisclosure,
                Severity::Low,
                "SERVER_VERSION_DISCLOSED",
                probe.source(),
                format!("Server: {}", server),
            )],
            _ => Vec::new(),
        }
    }
}
