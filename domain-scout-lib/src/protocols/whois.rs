//! WHOIS protocol implementation for the registration signal.
//!
//! Queries go straight to the registry over TCP port 43. WHOIS answers are
//! free-form text, so every response passes through [`classify_response`],
//! which keeps "the registry says there is no record" apart from "we could
//! not make sense of what the registry said".

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::registry::{builtin_whois_server, whois_query, IANA_WHOIS_SERVER};
use super::{WhoisLookup, WhoisRecord, WhoisSignal};
use crate::error::ScoutError;
use crate::utils::{extract_tld, is_transport_safe};

const WHOIS_PORT: u16 = 43;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB

lazy_static::lazy_static! {
    static ref DOMAIN_NAME_RE: Regex =
        Regex::new(r"(?im)^[ \t]*domain(?:[ \t]+name)?:[ \t]*(\S[^\r\n]*)")
            .expect("domain name pattern is valid");
    static ref REGISTRAR_RE: Regex =
        Regex::new(r"(?im)^[ \t]*(?:sponsoring[ \t]+)?registrar(?:[ \t]+name)?:[ \t]*(\S[^\r\n]*)")
            .expect("registrar pattern is valid");
    static ref EXPIRATION_RE: Regex = Regex::new(
        r"(?im)^[ \t]*(?:registry[ \t]+|registrar[ \t]+registration[ \t]+)?(?:expir(?:y|ation)[ \t]+date|expires(?:[ \t]+on)?|paid-till):[ \t]*(\S[^\r\n]*)"
    )
    .expect("expiration pattern is valid");
    static ref EMPTY_IDENTIFIER_RE: Regex =
        Regex::new(r"(?im)^[ \t]*domain(?:[ \t]+name)?:[ \t]*$")
            .expect("empty identifier pattern is valid");
}

/// Phrases registries use to say a name has no registration.
const NO_MATCH_PATTERNS: [&str; 17] = [
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "domain available",
    "status: available",
    "status: free",
    "no information available",
    "not registered",
    "no matching record",
    "no object found",
    "the queried object does not exist",
    "object does not exist",
    "no matching entry",
    "domain name not found",
    "this domain name has not been registered",
];

/// Fields that only appear in registration records.
const REGISTRATION_INDICATORS: [&str; 14] = [
    "domain status:",
    "registrar:",
    "creation date:",
    "created:",
    "registry domain id:",
    "registrant:",
    "admin contact:",
    "tech contact:",
    "name server:",
    "nameservers:",
    "expiry date:",
    "expires:",
    "updated date:",
    "last updated:",
];

/// Registry markers for a query that matched nothing.
const EMPTY_RESULT_MARKERS: [&str; 4] = [
    "result count: 0",
    "results: 0",
    "0 results found",
    "no results found",
];

const RATE_LIMIT_PATTERNS: [&str; 7] = [
    "rate limit exceeded",
    "too many requests",
    "quota exceeded",
    "limit exceeded",
    "throttled",
    "rate-limited",
    "query rate",
];

const UNSUPPORTED_TLD_PATTERNS: [&str; 6] = [
    "no whois server is known",
    "invalid tld",
    "unknown tld",
    "tld not found",
    "no such tld",
    "invalid domain extension",
];

/// WHOIS client talking to registry servers over TCP.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Deadline for each socket step (connect, write, read)
    timeout: Duration,
    port: u16,
    /// Send every query here instead of the registry server
    server_override: Option<String>,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            port: WHOIS_PORT,
            server_override: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Query a fixed server for every domain, skipping table and referral.
    pub fn with_server<S: Into<String>>(mut self, server: S) -> Self {
        self.server_override = Some(server.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Find the WHOIS server for a domain: override, built-in table, then
    /// an IANA referral for the TLD.
    async fn resolve_server(&self, domain: &str) -> Result<String, ScoutError> {
        if let Some(server) = &self.server_override {
            return Ok(server.clone());
        }
        if let Some(server) = builtin_whois_server(domain) {
            return Ok(server.to_string());
        }

        let tld = extract_tld(domain)
            .ok_or_else(|| ScoutError::network(domain, "domain has no TLD"))?;

        debug!(tld = %tld, "Asking IANA for WHOIS server");
        let response = self.query_server(IANA_WHOIS_SERVER, &tld, domain).await?;
        parse_iana_refer_response(&response).ok_or_else(|| {
            ScoutError::network(domain, format!("no WHOIS server is known for .{}", tld))
        })
    }

    /// Fetch the raw WHOIS text for a domain and the server that answered.
    pub async fn lookup_raw(&self, domain: &str) -> Result<(String, String), ScoutError> {
        let server = self.resolve_server(domain).await?;
        let raw = self
            .query_server(&server, &whois_query(&server, domain), domain)
            .await?;
        Ok((server, raw))
    }

    async fn query_server(
        &self,
        server: &str,
        query: &str,
        domain: &str,
    ) -> Result<String, ScoutError> {
        let mut stream = timeout(self.timeout, TcpStream::connect((server, self.port)))
            .await
            .map_err(|_| ScoutError::timeout(format!("WHOIS connect to {}", server), self.timeout))?
            .map_err(|e| {
                ScoutError::network(domain, format!("failed to connect to {}: {}", server, e))
            })?;

        let query_line = format!("{}\r\n", query);
        timeout(self.timeout, stream.write_all(query_line.as_bytes()))
            .await
            .map_err(|_| ScoutError::timeout(format!("WHOIS write to {}", server), self.timeout))?
            .map_err(|e| ScoutError::network(domain, format!("failed to send query: {}", e)))?;

        let mut response = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            match timeout(self.timeout, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buf[..n]);
                    if response.len() > MAX_RESPONSE_SIZE {
                        return Err(ScoutError::network(domain, "WHOIS response too large"));
                    }
                }
                Ok(Err(e)) => {
                    return Err(ScoutError::network(domain, format!("read error: {}", e)));
                }
                Err(_) => {
                    // Some servers never close the connection; keep what arrived.
                    if !response.is_empty() {
                        break;
                    }
                    return Err(ScoutError::timeout(
                        format!("WHOIS read from {}", server),
                        self.timeout,
                    ));
                }
            }
        }

        // UTF-8 first, Latin-1 otherwise
        Ok(String::from_utf8(response)
            .unwrap_or_else(|e| e.into_bytes().iter().map(|&b| b as char).collect()))
    }
}

#[async_trait]
impl WhoisSignal for WhoisClient {
    async fn lookup(&self, domain: &str) -> WhoisLookup {
        if !is_transport_safe(domain) {
            return WhoisLookup::TransportError(ScoutError::network(
                domain,
                "contains characters that cannot be sent in a WHOIS query",
            ));
        }
        let domain = domain.to_lowercase();

        match self.lookup_raw(&domain).await {
            Ok((server, raw)) => classify_response(&domain, &server, &raw),
            Err(e) => {
                debug!(domain = %domain, error = %e, "WHOIS lookup failed");
                WhoisLookup::TransportError(e)
            }
        }
    }
}

/// Classify a raw WHOIS body.
///
/// Order matters: a body carrying both a domain identifier and several
/// registration fields is a record even if its legal boilerplate happens to
/// contain a no-match phrase. "No record" needs positive evidence: a no-match
/// phrase, an empty-result marker, or a record skeleton whose identifier
/// field is blank. A body that looks registered but has no identifier, or
/// that is anything else (error pages, banners, truncated text), is a parse
/// error, never "available".
pub fn classify_response(domain: &str, server: &str, raw: &str) -> WhoisLookup {
    let text = raw.trim();
    if text.is_empty() {
        return WhoisLookup::NoRecord;
    }

    let lower = text.to_lowercase();
    let identifier = first_capture(&DOMAIN_NAME_RE, text);
    let indicators = REGISTRATION_INDICATORS
        .iter()
        .filter(|pattern| lower.contains(*pattern))
        .count();

    if let Some(domain_name) = &identifier {
        if indicators >= 2 {
            return WhoisLookup::DefiniteRecord(extract_record(domain_name, text));
        }
    }

    if RATE_LIMIT_PATTERNS.iter().any(|p| lower.contains(p)) {
        warn!(server = %server, "WHOIS server is rate limiting");
        return WhoisLookup::TransportError(ScoutError::rate_limited(
            server,
            format!("refused to answer for {}", domain),
        ));
    }

    if UNSUPPORTED_TLD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return WhoisLookup::TransportError(ScoutError::network(
            domain,
            format!("{} does not serve this TLD", server),
        ));
    }

    if NO_MATCH_PATTERNS.iter().any(|p| lower.contains(p)) {
        return WhoisLookup::NoRecord;
    }

    if let Some(domain_name) = identifier {
        return WhoisLookup::DefiniteRecord(extract_record(&domain_name, text));
    }

    if indicators >= 2 {
        return WhoisLookup::ParseError(ScoutError::parse(
            domain,
            "registration fields present without a domain identifier",
        ));
    }

    let empty_result = EMPTY_RESULT_MARKERS.iter().any(|p| lower.contains(p));
    if empty_result || EMPTY_IDENTIFIER_RE.is_match(text) {
        return WhoisLookup::NoRecord;
    }

    WhoisLookup::ParseError(ScoutError::parse(
        domain,
        format!("unrecognized response format from {}", server),
    ))
}

fn extract_record(domain_name: &str, text: &str) -> WhoisRecord {
    WhoisRecord {
        domain_name: domain_name.to_lowercase(),
        registrar: first_capture(&REGISTRAR_RE, text),
        expiration: first_capture(&EXPIRATION_RE, text),
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .find(|value| !value.is_empty() && !value.eq_ignore_ascii_case("redacted"))
}

/// Parse an IANA WHOIS response for the authoritative WHOIS server.
///
/// IANA uses `refer:` or `whois:`; `refer:` wins when both are present.
///
/// ```text
/// whois:        whois.verisign-grs.com
/// refer:        whois.verisign-grs.com
/// ```
pub fn parse_iana_refer_response(response: &str) -> Option<String> {
    let mut whois_server = None;

    for line in response.lines() {
        let line_trimmed = line.trim();
        if let Some(server) = line_trimmed.strip_prefix("refer:") {
            let server = server.trim();
            if !server.is_empty() {
                return Some(server.to_string());
            }
        } else if let Some(server) = line_trimmed.strip_prefix("whois:") {
            let server = server.trim();
            if !server.is_empty() {
                whois_server = Some(server.to_string());
            }
        }
    }

    whois_server
}
