//! URL safety validation for caller-submitted links.
//!
//! Every URL accepted for shortening passes through a single pipeline that
//! rejects oversized input, double-encoded payloads, embedded protocols,
//! SQL-injection patterns, disallowed schemes, script-injection tokens, SSRF
//! targets, IDN homograph hosts, and links back into this service's own
//! reserved paths. The checks run in a fixed order so the first failing rule
//! names the rejection; anything that survives is returned in canonical form
//! with its fragment removed.
//!
//! Rejection messages are caller-facing and name the violated rule. The
//! machine-readable rule token is available via [`UrlRejection::rule`].

use std::net::IpAddr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use url::{Host, Url};

use crate::security::ssrf;

/// Maximum accepted URL length in bytes, measured before decoding.
const MAX_URL_LENGTH: usize = 2048;

/// Schemes a stored link may use.
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Script-injection tokens, matched case-insensitively anywhere in the
/// decoded URL.
const XSS_TOKENS: &[&str] = &[
    "<script",
    "</script>",
    "javascript:",
    "onerror=",
    "onload=",
    "onclick=",
    "onmouseover=",
    "onfocus=",
    "onblur=",
    "onchange=",
    "onsubmit=",
    "<img",
    "<iframe",
    "<object",
    "<embed",
    "<link",
    "<meta",
    "fromcharcode",
    "eval(",
    "alert(",
    "document.cookie",
    "document.write",
    "innerhtml",
    "vbscript:",
    "expression(",
];

/// Path prefixes on the service's own domain that links may not target.
const INTERNAL_PATH_PREFIXES: &[&str] = &[
    "/admin",
    "/api",
    "/debug",
    "/metrics",
    "/status",
    "/.well-known",
    "/.env",
    "/config",
    "/internal",
    "/health",
];

/// Percent-escape sequence remaining after one round of decoding.
static RESIDUAL_ENCODING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[0-9a-fA-F]{2}").unwrap());

/// Two scheme markers anywhere in the URL, catching nested payloads like
/// `https://https://evil.com` and redirect chains embedded in queries.
static DOUBLE_PROTOCOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z][a-zA-Z0-9+.-]*://.*[a-zA-Z][a-zA-Z0-9+.-]*://").unwrap()
});

/// SQL keyword directly following a quote character.
///
/// Requiring the quote and a trailing word boundary keeps ordinary hosts
/// like `android.com` (which contains "and") from matching.
static QUOTED_SQL_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]\s*(?i:or|and|union|select|drop|insert|update|delete|where|exec|execute)\b"#)
        .unwrap()
});

/// Reason a URL was refused.
///
/// Messages are safe to return to callers; backend details never appear here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlRejection {
    #[error("URL exceeds the maximum length of {MAX_URL_LENGTH} bytes (got {length})")]
    TooLong { length: usize },

    #[error("URL contains an invalid percent-encoding sequence")]
    InvalidEncoding,

    #[error("URL is still percent-encoded after decoding, which indicates double encoding")]
    NestedEncoding,

    #[error("URL contains more than one protocol marker")]
    DoubleProtocol,

    #[error("URL contains a SQL keyword adjacent to a quote character")]
    SqlPattern,

    #[error("URL is not a valid absolute URL: {reason}")]
    Malformed { reason: String },

    #[error("URL has no host")]
    MissingHost,

    #[error("URL scheme '{scheme}' is not allowed; only http and https are accepted")]
    SchemeNotAllowed { scheme: String },

    #[error("URL contains the script-injection token '{token}'")]
    XssToken { token: &'static str },

    #[error("URL host '{host}' is a blocked destination")]
    BlockedHost { host: String },

    #[error("URL host resolves to the blocked address {address}")]
    BlockedAddress { address: IpAddr },

    #[error("URL host '{host}' contains non-ASCII characters")]
    IdnHost { host: String },

    #[error("URL targets the reserved path '{path}' on this service")]
    InternalPath { path: String },
}

impl UrlRejection {
    /// Stable machine-readable token identifying the violated rule.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::TooLong { .. } => "max_length",
            Self::InvalidEncoding => "invalid_encoding",
            Self::NestedEncoding => "nested_encoding",
            Self::DoubleProtocol => "double_protocol",
            Self::SqlPattern => "sql_pattern",
            Self::Malformed { .. } => "malformed",
            Self::MissingHost => "missing_host",
            Self::SchemeNotAllowed { .. } => "scheme",
            Self::XssToken { .. } => "xss_token",
            Self::BlockedHost { .. } => "blocked_host",
            Self::BlockedAddress { .. } => "blocked_address",
            Self::IdnHost { .. } => "idn_host",
            Self::InternalPath { .. } => "internal_path",
        }
    }
}

/// Validates URLs submitted for shortening.
///
/// Holds the service's own domain (so links cannot point back at reserved
/// service paths) and the DNS resolution budget for SSRF checks.
pub struct UrlValidator {
    own_domain: String,
    dns_timeout: Duration,
}

impl UrlValidator {
    /// Creates a validator for a service reachable at `own_domain`.
    pub fn new(own_domain: impl Into<String>, dns_timeout: Duration) -> Self {
        Self {
            own_domain: own_domain.into().to_ascii_lowercase(),
            dns_timeout,
        }
    }

    /// Runs the full safety pipeline over a raw submitted URL.
    ///
    /// Checks run in order: length, percent-decoding, double protocol, SQL
    /// pattern, parse, scheme, script tokens, SSRF (host names, IP literals,
    /// resolved addresses), IDN, own-domain reserved paths. The first failing
    /// check wins. On success the canonical form of the URL is returned with
    /// the fragment stripped.
    ///
    /// DNS resolution failures and timeouts admit the URL: an unresolvable
    /// host cannot be dereferenced, and refusing would drop legitimate links
    /// whenever the resolver hiccups.
    ///
    /// # Errors
    ///
    /// Returns the [`UrlRejection`] for the first violated rule.
    pub async fn validate(&self, raw: &str) -> Result<String, UrlRejection> {
        if raw.len() > MAX_URL_LENGTH {
            return Err(UrlRejection::TooLong { length: raw.len() });
        }

        let decoded =
            urlencoding::decode(raw).map_err(|_| UrlRejection::InvalidEncoding)?;

        if RESIDUAL_ENCODING.is_match(&decoded) {
            return Err(UrlRejection::NestedEncoding);
        }

        if DOUBLE_PROTOCOL.is_match(&decoded) {
            return Err(UrlRejection::DoubleProtocol);
        }

        if QUOTED_SQL_KEYWORD.is_match(&decoded) {
            return Err(UrlRejection::SqlPattern);
        }

        let mut parsed = Url::parse(&decoded).map_err(|e| UrlRejection::Malformed {
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme();
        if !ALLOWED_SCHEMES.contains(&scheme) {
            return Err(UrlRejection::SchemeNotAllowed {
                scheme: scheme.to_string(),
            });
        }

        let host = match parsed.host_str() {
            Some(h) if !h.is_empty() => h.to_owned(),
            _ => return Err(UrlRejection::MissingHost),
        };

        let lowered = decoded.to_lowercase();
        for token in XSS_TOKENS {
            if lowered.contains(token) {
                return Err(UrlRejection::XssToken { token });
            }
        }

        if ssrf::is_blocked_host(&host) {
            return Err(UrlRejection::BlockedHost { host });
        }

        let ip_literal = match parsed.host() {
            Some(Host::Ipv4(addr)) => Some(IpAddr::V4(addr)),
            Some(Host::Ipv6(addr)) => Some(IpAddr::V6(addr)),
            _ => None,
        };

        if let Some(address) = ip_literal {
            if ssrf::is_blocked_ip(address) {
                return Err(UrlRejection::BlockedAddress { address });
            }
        } else if let Some(address) =
            ssrf::blocked_resolved_address(&host, self.dns_timeout).await
        {
            return Err(UrlRejection::BlockedAddress { address });
        }

        // The url crate converts IDN hosts to punycode during parsing, so
        // the non-ASCII check has to look at the host as it was written.
        if let Some(raw_host) = authority_host(&decoded)
            && !raw_host.is_ascii()
        {
            return Err(UrlRejection::IdnHost {
                host: raw_host.to_string(),
            });
        }

        if host.eq_ignore_ascii_case(&self.own_domain) {
            let path = parsed.path().to_ascii_lowercase();
            for prefix in INTERNAL_PATH_PREFIXES {
                if path.starts_with(prefix) {
                    return Err(UrlRejection::InternalPath {
                        path: parsed.path().to_string(),
                    });
                }
            }
        }

        parsed.set_fragment(None);

        Ok(parsed.to_string())
    }
}

/// Extracts the host part of the authority as written in the input text.
fn authority_host(decoded: &str) -> Option<&str> {
    let (_, after_scheme) = decoded.split_once("://")?;
    let end = after_scheme
        .find(['/', '?', '#'])
        .unwrap_or(after_scheme.len());
    let authority = &after_scheme[..end];
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, rest)| rest);

    if let Some(bracketed) = host_port.strip_prefix('[') {
        return host_port.find(']').map(|i| &bracketed[..i - 1]);
    }

    match host_port.rsplit_once(':') {
        Some((h, port)) if port.chars().all(|c| c.is_ascii_digit()) => Some(h),
        _ => Some(host_port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UrlValidator {
        UrlValidator::new("short.example.com", Duration::from_millis(500))
    }

    async fn reject(url: &str) -> UrlRejection {
        validator()
            .validate(url)
            .await
            .expect_err("URL should have been rejected")
    }

    #[tokio::test]
    async fn test_accepts_plain_https_url() {
        let result = validator().validate("https://example.com/page?x=1").await;
        assert_eq!(result.unwrap(), "https://example.com/page?x=1");
    }

    #[tokio::test]
    async fn test_accepts_plain_http_url() {
        let result = validator().validate("http://example.com").await;
        assert_eq!(result.unwrap(), "http://example.com/");
    }

    #[tokio::test]
    async fn test_rejects_over_length_url() {
        let url = format!("https://example.com/?q={}", "a".repeat(2100));
        assert!(matches!(
            reject(&url).await,
            UrlRejection::TooLong { length } if length > MAX_URL_LENGTH
        ));
    }

    #[tokio::test]
    async fn test_accepts_url_at_length_boundary() {
        let url = format!("https://example.com/?q={}", "a".repeat(2048 - 23));
        assert_eq!(url.len(), 2048);
        assert!(validator().validate(&url).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_double_encoded_url() {
        // %2561 decodes once to %61; the leftover escape reveals nesting.
        let err = reject("https://example.com/%2561bc").await;
        assert_eq!(err, UrlRejection::NestedEncoding);
        assert_eq!(err.rule(), "nested_encoding");
    }

    #[tokio::test]
    async fn test_rejects_undecodable_escape() {
        // %FF is not valid UTF-8 on its own.
        let err = reject("https://example.com/%FF").await;
        assert_eq!(err, UrlRejection::InvalidEncoding);
    }

    #[tokio::test]
    async fn test_rejects_nested_protocol() {
        let err = reject("https://https://evil.com").await;
        assert_eq!(err, UrlRejection::DoubleProtocol);
    }

    #[tokio::test]
    async fn test_rejects_protocol_embedded_in_query() {
        let err = reject("https://example.com/redirect?to=https://other.com").await;
        assert_eq!(err, UrlRejection::DoubleProtocol);
    }

    #[tokio::test]
    async fn test_rejects_quoted_sql_keyword() {
        let err = reject("https://example.com/?q='OR'1'='1").await;
        assert_eq!(err, UrlRejection::SqlPattern);
    }

    #[tokio::test]
    async fn test_rejects_encoded_sql_payload() {
        // Decodes to: ' UNION SELECT
        let err = reject("https://example.com/search?q=%27%20UNION%20SELECT").await;
        assert_eq!(err, UrlRejection::SqlPattern);
    }

    #[tokio::test]
    async fn test_accepts_bare_sql_keyword_in_host() {
        // "android" contains "and"; without an adjacent quote it is fine.
        let result = validator().validate("https://android.com/").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_accepts_apostrophe_without_keyword() {
        let result = validator()
            .validate("https://example.com/people?name=O'Brien")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_unparseable_input() {
        assert!(matches!(
            reject("not a url at all").await,
            UrlRejection::Malformed { .. }
        ));
    }

    #[tokio::test]
    async fn test_rejects_relative_url() {
        assert!(matches!(
            reject("/relative/path").await,
            UrlRejection::Malformed { .. }
        ));
    }

    #[tokio::test]
    async fn test_rejects_disallowed_scheme() {
        let err = reject("ftp://example.com/file").await;
        assert_eq!(
            err,
            UrlRejection::SchemeNotAllowed {
                scheme: "ftp".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_rejects_javascript_scheme() {
        let err = reject("javascript:alert(1)").await;
        assert_eq!(err.rule(), "scheme");
    }

    #[tokio::test]
    async fn test_rejects_every_xss_token_in_query() {
        for token in XSS_TOKENS {
            let url = format!("https://example.com/page?x={token}");
            let err = validator()
                .validate(&url)
                .await
                .expect_err("token should be rejected");
            assert_eq!(err.rule(), "xss_token", "token '{}' was not caught", token);
        }
    }

    #[tokio::test]
    async fn test_rejects_xss_token_in_path() {
        let err = reject("https://example.com/<script>alert(1)</script>").await;
        assert_eq!(err.rule(), "xss_token");
    }

    #[tokio::test]
    async fn test_rejects_uppercase_xss_token() {
        let err = reject("https://example.com/?f=String.fromCharCode(88)").await;
        assert_eq!(err.rule(), "xss_token");
    }

    #[tokio::test]
    async fn test_rejects_localhost() {
        let err = reject("https://localhost/page").await;
        assert!(matches!(err, UrlRejection::BlockedHost { .. }));
    }

    #[tokio::test]
    async fn test_rejects_localhost_subdomain() {
        let err = reject("https://app.localhost/page").await;
        assert!(matches!(err, UrlRejection::BlockedHost { .. }));
    }

    #[tokio::test]
    async fn test_rejects_metadata_endpoint() {
        let err = reject("http://169.254.169.254/latest/meta-data/").await;
        assert!(matches!(
            err,
            UrlRejection::BlockedHost { .. } | UrlRejection::BlockedAddress { .. }
        ));

        let err = reject("http://metadata.google.internal/computeMetadata/v1/").await;
        assert!(matches!(err, UrlRejection::BlockedHost { .. }));
    }

    #[tokio::test]
    async fn test_rejects_loopback_ip_literal() {
        let err = reject("http://127.0.0.1:8080/admin").await;
        assert!(matches!(err, UrlRejection::BlockedAddress { .. }));
    }

    #[tokio::test]
    async fn test_rejects_private_ip_literal() {
        let err = reject("http://192.168.1.10/router").await;
        assert!(matches!(err, UrlRejection::BlockedAddress { .. }));
    }

    #[tokio::test]
    async fn test_rejects_ipv6_loopback_literal() {
        let err = reject("http://[::1]/page").await;
        assert!(matches!(err, UrlRejection::BlockedAddress { .. }));
    }

    #[tokio::test]
    async fn test_accepts_public_ip_literal() {
        let result = validator().validate("http://8.8.8.8/dns").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_admitted() {
        // .invalid never resolves; the DNS check fails open.
        let result = validator()
            .validate("https://unresolvable-host.invalid/page")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_idn_host() {
        // .invalid keeps the resolver out of the picture; the IDN rule
        // must fire regardless of DNS behavior.
        let err = reject("https://пример.invalid/path").await;
        assert!(matches!(err, UrlRejection::IdnHost { .. }));
        assert_eq!(err.rule(), "idn_host");
    }

    #[tokio::test]
    async fn test_rejects_idn_host_with_port_and_userinfo() {
        let err = reject("https://user@bücher.invalid:8443/shelf").await;
        assert!(matches!(err, UrlRejection::IdnHost { .. }));
    }

    #[tokio::test]
    async fn test_rejects_internal_path_on_own_domain() {
        let err = reject("https://short.example.com/admin/users").await;
        assert_eq!(
            err,
            UrlRejection::InternalPath {
                path: "/admin/users".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_internal_path_check_is_case_insensitive() {
        let err = reject("https://SHORT.example.com/Admin").await;
        assert!(matches!(err, UrlRejection::InternalPath { .. }));
    }

    #[tokio::test]
    async fn test_accepts_internal_path_on_other_domain() {
        let result = validator().validate("https://example.com/admin").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_accepts_non_reserved_path_on_own_domain() {
        let result = validator()
            .validate("https://short.example.com/about-us")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_strips_fragment() {
        let result = validator()
            .validate("https://example.com/page#section-2")
            .await;
        assert_eq!(result.unwrap(), "https://example.com/page");
    }

    #[tokio::test]
    async fn test_canonicalizes_host_and_default_port() {
        let result = validator().validate("HTTPS://EXAMPLE.COM:443/Path").await;
        assert_eq!(result.unwrap(), "https://example.com/Path");
    }

    #[tokio::test]
    async fn test_reencodes_decoded_spaces() {
        let result = validator().validate("https://example.com/a%20b").await;
        assert_eq!(result.unwrap(), "https://example.com/a%20b");
    }

    #[test]
    fn test_authority_host_extraction() {
        assert_eq!(authority_host("https://example.com/x"), Some("example.com"));
        assert_eq!(authority_host("https://example.com:8080"), Some("example.com"));
        assert_eq!(
            authority_host("https://user:pw@example.com/x"),
            Some("example.com")
        );
        assert_eq!(authority_host("https://[::1]:8080/x"), Some("::1"));
        assert_eq!(authority_host("no scheme here"), None);
    }
}
