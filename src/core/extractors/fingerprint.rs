// src/core/extractors/fingerprint.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::{Extractor, ProbeContext};
use crate::core::models::{ProbeResult, Severity, Signal, SignalKind};

/// Where a fingerprint rule looks for its pattern.
enum Check<'a> {
    /// A specific response header.
    Header(&'a str, &'a Lazy<Regex>),
    /// The `content` of `<meta name="...">`.
    MetaTag(&'a str, &'a Lazy<Regex>),
    /// The raw body.
    Body(&'a Lazy<Regex>),
    /// `src` attributes of `<script>` tags.
    ScriptSrc(&'a Lazy<Regex>),
    /// All `set-cookie` headers joined.
    Cookie(&'a Lazy<Regex>),
}

struct FingerprintRule<'a> {
    tech_name: &'a str,
    category: &'a str,
    check: Check<'a>,
}

// The first capture group, when present, is the version.
static RE_NGINX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)nginx(?:/([\d\.]+))?").unwrap());
static RE_APACHE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Apache(?:/([\d\.]+))?").unwrap());
static RE_IIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"Microsoft-IIS(?:/([\d\.]+))?").unwrap());
static RE_CLOUDFLARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)cloudflare").unwrap());
static RE_EXPRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"Express").unwrap());
static RE_PHP: Lazy<Regex> = Lazy::new(|| Regex::new(r"PHP(?:/([\d\.]+))?").unwrap());
static RE_PHPSESSID: Lazy<Regex> = Lazy::new(|| Regex::new(r"PHPSESSID").unwrap());
static RE_ASPNET: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\d\.]+)").unwrap());
static RE_JSESSIONID: Lazy<Regex> = Lazy::new(|| Regex::new(r"JSESSIONID").unwrap());
static RE_DJANGO_CSRF: Lazy<Regex> = Lazy::new(|| Regex::new(r"csrftoken").unwrap());
static RE_WORDPRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"WordPress ?([\d\.]+)?").unwrap());
static RE_WP_EMBED: Lazy<Regex> = Lazy::new(|| Regex::new(r"/wp-content/|/wp-includes/").unwrap());
static RE_DRUPAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)drupal ?([\d\.]+)?").unwrap());
static RE_JOOMLA: Lazy<Regex> = Lazy::new(|| Regex::new(r"Joomla!").unwrap());
static RE_NEXTJS_SCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/_next/static/").unwrap());
static RE_NUXTJS: Lazy<Regex> = Lazy::new(|| Regex::new(r"__NUXT__").unwrap());
static RE_ANGULAR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"ng-version="([\d\.]+)""#).unwrap());
static RE_REACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"react-dom|data-reactroot|react\.development").unwrap());
static RE_VUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"data-v-app|__VUE_").unwrap());
static RE_JQUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"jquery(?:[-.]?([\d]+(?:\.[\d]+)+))?(?:\.min|\.slim)?\.js").unwrap());

static RULES: &[FingerprintRule] = &[
    FingerprintRule { tech_name: "Nginx", category: "Web Server", check: Check::Header("server", &RE_NGINX) },
    FingerprintRule { tech_name: "Apache", category: "Web Server", check: Check::Header("server", &RE_APACHE) },
    FingerprintRule { tech_name: "IIS", category: "Web Server", check: Check::Header("server", &RE_IIS) },
    FingerprintRule { tech_name: "Cloudflare", category: "CDN / WAF", check: Check::Header("server", &RE_CLOUDFLARE) },
    FingerprintRule { tech_name: "Express", category: "Framework", check: Check::Header("x-powered-by", &RE_EXPRESS) },
    FingerprintRule { tech_name: "PHP", category: "Language", check: Check::Header("x-powered-by", &RE_PHP) },
    FingerprintRule { tech_name: "PHP", category: "Language", check: Check::Cookie(&RE_PHPSESSID) },
    FingerprintRule { tech_name: "ASP.NET", category: "Framework", check: Check::Header("x-aspnet-version", &RE_ASPNET) },
    FingerprintRule { tech_name: "Java", category: "Language", check: Check::Cookie(&RE_JSESSIONID) },
    FingerprintRule { tech_name: "Python/Django", category: "Framework", check: Check::Cookie(&RE_DJANGO_CSRF) },
    FingerprintRule { tech_name: "WordPress", category: "CMS", check: Check::MetaTag("generator", &RE_WORDPRESS) },
    FingerprintRule { tech_name: "WordPress", category: "CMS", check: Check::Body(&RE_WP_EMBED) },
    FingerprintRule { tech_name: "Drupal", category: "CMS", check: Check::MetaTag("generator", &RE_DRUPAL) },
    FingerprintRule { tech_name: "Drupal", category: "CMS", check: Check::Header("x-generator", &RE_DRUPAL) },
    FingerprintRule { tech_name: "Joomla", category: "CMS", check: Check::MetaTag("generator", &RE_JOOMLA) },
    FingerprintRule { tech_name: "Next.js", category: "JS Framework", check: Check::ScriptSrc(&RE_NEXTJS_SCRIPT) },
    FingerprintRule { tech_name: "Nuxt.js", category: "JS Framework", check: Check::Body(&RE_NUXTJS) },
    FingerprintRule { tech_name: "Angular", category: "JS Framework", check: Check::Body(&RE_ANGULAR) },
    FingerprintRule { tech_name: "React", category: "JS Library", check: Check::Body(&RE_REACT) },
    FingerprintRule { tech_name: "Vue.js", category: "JS Library", check: Check::Body(&RE_VUE) },
    FingerprintRule { tech_name: "jQuery", category: "JS Library", check: Check::ScriptSrc(&RE_JQUERY) },
];

/// A technology found by one or more rules.
struct Detected {
    name: &'static str,
    category: &'static str,
    version: Option<String>,
}

/// Identifies the target's stack from the root response. Every technology produces a
/// single `info` signal regardless of how many rules matched it.
pub struct TechnologyFingerprint;

impl Extractor for TechnologyFingerprint {
    fn name(&self) -> &'static str {
        "technology-fingerprint"
    }

    fn extract(&self, probe: &ProbeContext<'_>) -> Vec<Signal> {
        if !probe.result.is_root_get() {
            return Vec::new();
        }

        detect(probe.result)
            .into_iter()
            .map(|tech| {
                let evidence = match &tech.version {
                    Some(version) => format!("{} {} ({})", tech.name, version, tech.category),
                    None => format!("{} ({})", tech.name, tech.category),
                };
                Signal::new(
                    SignalKind::TechnologyDetected,
                    Severity::Info,
                    "TECH_DETECTED",
                    probe.source(),
                    evidence,
                )
            })
            .collect()
    }
}

/// Applies every rule, keeping first-detection order so reports are reproducible.
fn detect(result: &ProbeResult) -> Vec<Detected> {
    let body = result.body_text();
    let document = Html::parse_document(&body);
    let cookies = result
        .headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    let mut found: Vec<Detected> = Vec::new();
    for rule in RULES {
        let version = match &rule.check {
            Check::Header(name, re) => check_with_regex(result.header(name), re),
            Check::MetaTag(name, re) => check_meta_tag(&document, name, re),
            Check::Body(re) => check_with_regex(Some(&body), re),
            Check::ScriptSrc(re) => check_script_src(&document, re),
            Check::Cookie(re) => check_with_regex(Some(&cookies), re),
        };

        let Some(version) = version else {
            continue;
        };
        debug!(tech = %rule.tech_name, version = ?version, "Fingerprint rule matched.");

        if let Some(existing) = found.iter_mut().find(|t| t.name == rule.tech_name) {
            if existing.version.is_none() {
                existing.version = version;
            }
        } else {
            found.push(Detected {
                name: rule.tech_name,
                category: rule.category,
                version,
            });
        }
    }
    found
}

/// `Some(version)` when the pattern matched, where the inner option is the first
/// capture group if it captured anything.
fn check_with_regex(text: Option<&str>, re: &Regex) -> Option<Option<String>> {
    text.and_then(|text| {
        re.captures(text).map(|caps| {
            caps.get(1)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty())
        })
    })
}

fn check_meta_tag(doc: &Html, name: &str, re: &Regex) -> Option<Option<String>> {
    let selector = Selector::parse(&format!("meta[name='{}']", name)).ok()?;
    let content = doc
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"));
    check_with_regex(content, re)
}

fn check_script_src(doc: &Html, re: &Regex) -> Option<Option<String>> {
    let selector = Selector::parse("script[src]").ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .find_map(|src| check_with_regex(Some(src), re))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractors::test_support::{get, https_target};

    fn evidence(headers: &[(&str, &str)], body: &str) -> Vec<String> {
        let target = https_target();
        let result = get("/", 200, headers, body);
        TechnologyFingerprint
            .extract(&ProbeContext { target: &target, index: 0, result: &result, first_response: true })
            .into_iter()
            .map(|s| {
                assert_eq!(s.severity, Severity::Info);
                assert_eq!(s.kind, SignalKind::TechnologyDetected);
                s.evidence
            })
            .collect()
    }

    #[test]
    fn detects_server_and_runtime_from_headers() {
        let found = evidence(
            &[("Server", "nginx/1.18.0"), ("X-Powered-By", "PHP/8.1.2"), ("Set-Cookie", "PHPSESSID=1")],
            "",
        );
        assert_eq!(found, vec!["Nginx 1.18.0 (Web Server)", "PHP 8.1.2 (Language)"]);
    }

    #[test]
    fn detects_cms_and_libraries_from_markup() {
        let body = r#"<html><head>
            <meta name="generator" content="WordPress 6.4.2">
            <script src="/wp-includes/js/jquery/jquery-3.7.1.min.js"></script>
            </head><body><div id="root" data-reactroot></div></body></html>"#;
        let found = evidence(&[], body);
        assert_eq!(
            found,
            vec!["WordPress 6.4.2 (CMS)", "React (JS Library)", "jQuery 3.7.1 (JS Library)"]
        );
    }

    #[test]
    fn empty_response_detects_nothing() {
        assert!(evidence(&[], "").is_empty());
        assert!(evidence(&[], "{\"not\": \"html\"}").is_empty());
    }

    #[test]
    fn only_the_root_probe_is_fingerprinted() {
        let target = https_target();
        let result = get("/api", 200, &[("Server", "nginx")], "");
        assert!(TechnologyFingerprint
            .extract(&ProbeContext { target: &target, index: 4, result: &result, first_response: true })
            .is_empty());
    }
}
