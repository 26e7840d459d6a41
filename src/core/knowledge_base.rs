//! This module acts as the central "brain" of the scanner.
//! It contains a static, read-only database of every signal code the extractors can
//! emit, with a human-readable title, explanation and remediation step.
//! Severities live with the extractor rule tables; this table only carries text.

use std::fmt;

/// High-level grouping for findings, used when printing the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    Transport,
    Headers,
    Exposure,
    Data,
    Software,
    Methods,
    Technology,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Transport => write!(f, "Transport Security"),
            FindingCategory::Headers => write!(f, "HTTP Security Headers"),
            FindingCategory::Exposure => write!(f, "Endpoint Exposure"),
            FindingCategory::Data => write!(f, "Sensitive Data"),
            FindingCategory::Software => write!(f, "Server Software"),
            FindingCategory::Methods => write!(f, "HTTP Methods"),
            FindingCategory::Technology => write!(f, "Technologies"),
        }
    }
}

/// Everything needed to explain a signal code to a user.
pub struct FindingDetail {
    /// A unique, machine-readable identifier (e.g. "HEADERS_HSTS_MISSING").
    pub code: &'static str,
    pub title: &'static str,
    pub category: FindingCategory,
    pub description: &'static str,
    pub remediation: &'static str,
}

const GENERIC_REMEDIATION: &str =
    "Review the affected endpoint and restrict what it exposes to unauthenticated clients.";

static FINDINGS: &[FindingDetail] = &[
    // --- Transport ---
    FindingDetail {
        code: "TRANSPORT_UNENCRYPTED",
        title: "Site Served Over Plain HTTP",
        category: FindingCategory::Transport,
        description: "The target was reached without TLS. Everything exchanged with it, credentials and session cookies included, travels in clear text.",
        remediation: "Serve the site over HTTPS with a valid certificate and redirect all plain HTTP traffic to it.",
    },

    // --- HTTP Headers ---
    FindingDetail {
        code: "HEADERS_HSTS_MISSING",
        title: "HSTS Header Missing",
        category: FindingCategory::Headers,
        description: "The HTTP Strict-Transport-Security (HSTS) header instructs browsers to only communicate with your site over HTTPS. It protects against protocol downgrade attacks and cookie hijacking.",
        remediation: "Add the 'Strict-Transport-Security' header to your web server responses. A strong value is 'max-age=31536000; includeSubDomains; preload'.",
    },
    FindingDetail {
        code: "HEADERS_CSP_MISSING",
        title: "CSP Header Missing",
        category: FindingCategory::Headers,
        description: "Content-Security-Policy (CSP) helps prevent Cross-Site Scripting (XSS) and data injection by defining which resources a browser is allowed to load.",
        remediation: "Implement a Content-Security-Policy header that defines trusted sources for scripts, styles, and other assets. Start restrictive and open it up as needed.",
    },
    FindingDetail {
        code: "HEADERS_X_FRAME_OPTIONS_MISSING",
        title: "X-Frame-Options Missing",
        category: FindingCategory::Headers,
        description: "This header protects visitors against clickjacking, where an attacker loads your site in an invisible iframe to trick users into clicking on malicious content.",
        remediation: "Add the 'X-Frame-Options' header and set it to 'DENY' or 'SAMEORIGIN'.",
    },
    FindingDetail {
        code: "HEADERS_X_CONTENT_TYPE_OPTIONS_MISSING",
        title: "X-Content-Type-Options Missing",
        category: FindingCategory::Headers,
        description: "This header stops browsers from guessing the content type of a response (MIME sniffing), which can turn an uploaded file into executable script.",
        remediation: "Add the 'X-Content-Type-Options' header with the value 'nosniff'.",
    },
    FindingDetail {
        code: "HEADERS_REFERRER_POLICY_MISSING",
        title: "Referrer-Policy Missing",
        category: FindingCategory::Headers,
        description: "Without a Referrer-Policy, full URLs of your pages, including tokens in query strings, can leak to third-party sites through the Referer header.",
        remediation: "Add the 'Referrer-Policy' header, for example 'strict-origin-when-cross-origin' or 'no-referrer'.",
    },

    // --- Endpoint exposure ---
    FindingDetail {
        code: "EXPOSURE_ADMIN_INTERFACE",
        title: "Administrative Interface Exposed",
        category: FindingCategory::Exposure,
        description: "An admin, debug or environment endpoint answered 200 without any sign of authentication. These endpoints usually allow configuration changes or leak internals.",
        remediation: "Put administrative and debug endpoints behind strong authentication, or remove them from public deployments entirely.",
    },
    FindingDetail {
        code: "EXPOSURE_API_UNAUTHENTICATED",
        title: "API Reachable Without Authentication",
        category: FindingCategory::Exposure,
        description: "An API endpoint answered 200 and the response carried no authentication challenge or session cookie.",
        remediation: "Require authentication on API endpoints and return 401 with a WWW-Authenticate challenge to anonymous clients.",
    },
    FindingDetail {
        code: "EXPOSURE_SENSITIVE_FILE",
        title: "Sensitive File Publicly Accessible",
        category: FindingCategory::Exposure,
        description: "A configuration, dependency manifest or diagnostic file was served to an anonymous client. Such files reveal versions, paths and sometimes credentials.",
        remediation: "Block public access to the file at the web server and keep configuration files outside the document root.",
    },
    FindingDetail {
        code: "SERVER_VERSION_DISCLOSED",
        title: "Server Version Disclosed",
        category: FindingCategory::Exposure,
        description: "The Server header reveals the exact software version, which lets attackers pick known exploits without probing.",
        remediation: "Configure the web server to send a generic Server header (e.g. 'server_tokens off' on nginx, 'ServerTokens Prod' on Apache).",
    },
    FindingDetail {
        code: "DISCLOSURE_BUILD_INFO",
        title: "Build Information Exposed",
        category: FindingCategory::Exposure,
        description: "A status endpoint publishes release metadata such as version, build time, commit hash or deployment environment. It tells attackers exactly which code is running.",
        remediation: "Restrict build and version endpoints to internal networks or authenticated operators, or strip them down to a health flag.",
    },
    FindingDetail {
        code: "DISCLOSURE_API_VERSION",
        title: "API Version Published",
        category: FindingCategory::Exposure,
        description: "The public API description document names the API release, which narrows down the implementation behind it.",
        remediation: "Serve API documentation only to authenticated consumers, or omit internal release numbers from it.",
    },
    FindingDetail {
        code: "API_RATE_LIMIT_MISSING",
        title: "No Rate Limiting Advertised",
        category: FindingCategory::Exposure,
        description: "The API answered without any X-RateLimit-* or Retry-After header, so clients are given no request quota. Unthrottled APIs are easy to brute-force and scrape.",
        remediation: "Enforce per-client request quotas at the gateway and advertise them with X-RateLimit-Limit, X-RateLimit-Remaining and X-RateLimit-Reset.",
    },

    // --- Sensitive data ---
    FindingDetail {
        code: "DATA_API_KEYS",
        title: "API Key In Response",
        category: FindingCategory::Data,
        description: "A response body contains something shaped like an API key assignment.",
        remediation: "Remove keys from responses, rotate the exposed key and keep secrets on the server side only.",
    },
    FindingDetail {
        code: "DATA_DATABASE_URLS",
        title: "Database Connection String In Response",
        category: FindingCategory::Data,
        description: "A response body contains a database or cache connection URL, which often embeds host names and credentials.",
        remediation: "Strip connection strings from any response and rotate the credentials they contain.",
    },
    FindingDetail {
        code: "DATA_EMAIL_ADDRESSES",
        title: "Email Addresses In Response",
        category: FindingCategory::Data,
        description: "A response body contains email addresses, which feed phishing and credential stuffing campaigns.",
        remediation: "Filter personal data out of public responses and only return it to authorized callers.",
    },
    FindingDetail {
        code: "DATA_JWT_TOKENS",
        title: "JWT In Response",
        category: FindingCategory::Data,
        description: "A response body contains a JSON Web Token. Leaked tokens can be replayed until they expire.",
        remediation: "Never embed tokens in public responses; revoke the exposed token and shorten token lifetimes.",
    },
    FindingDetail {
        code: "DATA_AWS_KEYS",
        title: "AWS Access Key In Response",
        category: FindingCategory::Data,
        description: "A response body contains an AWS access key id. Together with its secret it grants access to cloud resources.",
        remediation: "Deactivate the key in IAM immediately, audit its recent usage and move credentials to a secrets manager.",
    },
    FindingDetail {
        code: "DATA_PRIVATE_KEYS",
        title: "Private Key In Response",
        category: FindingCategory::Data,
        description: "A response body contains a PEM private key header. Anyone holding the key can impersonate the service it belongs to.",
        remediation: "Remove the key from the served content, revoke it and issue a new key pair.",
    },

    // --- Software ---
    FindingDetail {
        code: "SOFTWARE_OUTDATED",
        title: "Outdated Server Software",
        category: FindingCategory::Software,
        description: "The Server or X-Powered-By header announces a release line with publicly known vulnerabilities.",
        remediation: "Upgrade the component to the latest stable release and hide version details in response headers.",
    },

    // --- Methods ---
    FindingDetail {
        code: "METHOD_DANGEROUS_ALLOWED",
        title: "Dangerous HTTP Method Accepted",
        category: FindingCategory::Methods,
        description: "The root path answered a state-changing or diagnostic method (PUT, DELETE, PATCH, TRACE, OPTIONS) with something other than 404, 405 or 501.",
        remediation: "Disable every HTTP method the application does not need at the web server or gateway.",
    },

    // --- Technology ---
    FindingDetail {
        code: "TECH_DETECTED",
        title: "Technology Identified",
        category: FindingCategory::Technology,
        description: "A component of the target's stack was identified from headers, cookies or markup.",
        remediation: "No action required. Keep identified components patched and avoid advertising versions.",
    },
];

/// Retrieves the full detail for a given finding code from the static knowledge base.
pub fn get_finding_detail(code: &str) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.code == code)
}

/// Remediation text for a code, or a generic instruction for unknown codes.
pub fn remediation_for(code: &str) -> &'static str {
    get_finding_detail(code)
        .map(|detail| detail.remediation)
        .unwrap_or(GENERIC_REMEDIATION)
}
