//! Core data types for domain availability probing.
//!
//! `Outcome` keeps its fields private so the tri-state invariant
//! (`Unknown` iff an error is recorded, registration details only on `Taken`)
//! can only be established through its constructors.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Suffixes probed when the caller doesn't supply any.
pub const DEFAULT_SUFFIXES: [&str; 4] = [".com", ".co", ".ai", ".net"];

/// Default ceiling on concurrently running probes.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Hard upper bound accepted for the concurrency setting.
pub const MAX_CONCURRENCY: usize = 100;

/// Availability verdict for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// No registration found; the name can most likely be registered
    Available,
    /// A registration exists
    Taken,
    /// The probe could not reach a confident verdict
    Unknown,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "Available"),
            Availability::Taken => write!(f, "Taken"),
            Availability::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A fully-qualified domain formed from a base name and a suffix.
///
/// Only the expander builds these; the base and suffix are kept alongside the
/// joined name so results can be grouped without re-parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    base: String,
    suffix: String,
    fqdn: String,
}

impl Candidate {
    pub(crate) fn new(base: &str, suffix: &str) -> Self {
        Self {
            base: base.to_string(),
            suffix: suffix.to_string(),
            fqdn: format!("{}{}", base, suffix),
        }
    }

    /// The base name, e.g. `acme`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The suffix including its separator, e.g. `.com`.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The joined domain, e.g. `acme.com`.
    pub fn as_str(&self) -> &str {
        &self.fqdn
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqdn)
    }
}

impl Serialize for Candidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.fqdn)
    }
}

/// The ordered set of candidates for one run.
///
/// Produced by [`crate::expand_candidates`], consumed by the dispatcher and
/// used by the aggregator to account for every outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeBatch {
    candidates: Vec<Candidate>,
}

impl ProbeBatch {
    pub(crate) fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }
}

impl<'a> IntoIterator for &'a ProbeBatch {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// Result of probing one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    #[serde(rename = "domain")]
    candidate: Candidate,
    availability: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Outcome {
    /// The registry has no record of the candidate.
    pub fn available(candidate: Candidate) -> Self {
        Self {
            candidate,
            availability: Availability::Available,
            registrar: None,
            expiration: None,
            error: None,
        }
    }

    /// The candidate is registered. Either detail may be missing.
    pub fn taken(
        candidate: Candidate,
        registrar: Option<String>,
        expiration: Option<String>,
    ) -> Self {
        Self {
            candidate,
            availability: Availability::Taken,
            registrar: registrar.filter(|r| !r.trim().is_empty()),
            expiration: expiration.filter(|e| !e.trim().is_empty()),
            error: None,
        }
    }

    /// No confident verdict; `error` explains why.
    pub fn unknown<E: Into<String>>(candidate: Candidate, error: E) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "availability could not be determined".to_string();
        }
        Self {
            candidate,
            availability: Availability::Unknown,
            registrar: None,
            expiration: None,
            error: Some(error),
        }
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// The probed domain as a string.
    pub fn domain(&self) -> &str {
        self.candidate.as_str()
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn registrar(&self) -> Option<&str> {
        self.registrar.as_deref()
    }

    pub fn expiration(&self) -> Option<&str> {
        self.expiration.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Snapshot handed to progress observers after each completed probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Probes finished so far, including this one
    pub completed: usize,
    /// Size of the batch
    pub total: usize,
    /// The candidate that just finished
    pub domain: String,
    /// Its verdict
    pub availability: Availability,
}

/// Observer invoked once per completed probe.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Configuration options for a prober.
///
/// Captured once at construction; nothing here changes while a batch runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum number of probes in flight at once.
    /// Default: 20, Range: 1-100
    pub concurrency: usize,

    /// Deadline for the DNS lookup.
    /// Default: 3 seconds
    #[serde(skip)]
    pub dns_timeout: Duration,

    /// Deadline for each WHOIS socket step (connect, write, read).
    /// Default: 10 seconds
    #[serde(skip)]
    pub whois_timeout: Duration,

    /// Deadline for a whole probe. Derived from the other two when unset.
    #[serde(skip)]
    pub probe_timeout: Option<Duration>,

    /// Suffixes appended to every base name, each starting with '.'.
    pub suffixes: Vec<String>,

    /// Nameserver IP used for the DNS signal instead of the public default.
    pub nameserver: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            dns_timeout: Duration::from_secs(3),
            whois_timeout: Duration::from_secs(10),
            probe_timeout: None,
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            nameserver: None,
        }
    }
}

impl ProbeConfig {
    /// Set the concurrency ceiling, clamped to 1-100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Replace the suffix list. Entries are normalized (`com` becomes `.com`)
    /// and blanks are dropped.
    pub fn with_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.suffixes = suffixes
            .iter()
            .filter_map(|s| crate::expand::normalize_suffix(s))
            .collect();
        self
    }

    pub fn with_nameserver<S: Into<String>>(mut self, nameserver: S) -> Self {
        self.nameserver = Some(nameserver.into());
        self
    }

    /// Whole-probe deadline: explicit value, or DNS plus two WHOIS
    /// round-trips (IANA referral and registry query).
    pub fn effective_probe_timeout(&self) -> Duration {
        self.probe_timeout.unwrap_or_else(|| {
            self.dns_timeout
                .saturating_add(self.whois_timeout.saturating_mul(2))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate::new("acme", ".com")
    }

    #[test]
    fn test_candidate_parts() {
        let c = candidate();
        assert_eq!(c.base(), "acme");
        assert_eq!(c.suffix(), ".com");
        assert_eq!(c.as_str(), "acme.com");
        assert_eq!(c.to_string(), "acme.com");
    }

    #[test]
    fn test_unknown_always_carries_error() {
        let outcome = Outcome::unknown(candidate(), "");
        assert_eq!(outcome.availability(), Availability::Unknown);
        assert!(outcome.error().is_some());
        assert!(outcome.registrar().is_none());
    }

    #[test]
    fn test_taken_drops_blank_details() {
        let outcome = Outcome::taken(candidate(), Some("  ".to_string()), None);
        assert_eq!(outcome.availability(), Availability::Taken);
        assert!(outcome.registrar().is_none());
        assert!(outcome.error().is_none());
    }

    #[test]
    fn test_available_has_no_details() {
        let outcome = Outcome::available(candidate());
        assert!(outcome.registrar().is_none());
        assert!(outcome.expiration().is_none());
        assert!(outcome.error().is_none());
    }

    #[test]
    fn test_outcome_serializes_as_plain_data() {
        let outcome = Outcome::taken(
            candidate(),
            Some("NameCorp".to_string()),
            Some("2030-01-01".to_string()),
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["domain"], "acme.com");
        assert_eq!(json["availability"], "taken");
        assert_eq!(json["registrar"], "NameCorp");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.suffixes, vec![".com", ".co", ".ai", ".net"]);
        assert_eq!(config.effective_probe_timeout(), Duration::from_secs(23));
    }

    #[test]
    fn test_config_builders() {
        let config = ProbeConfig::default()
            .with_concurrency(500)
            .with_suffixes(vec!["io".to_string(), " .DEV ".to_string(), "".to_string()])
            .with_probe_timeout(Duration::from_secs(5));

        assert_eq!(config.concurrency, 100);
        assert_eq!(config.suffixes, vec![".io", ".dev"]);
        assert_eq!(config.effective_probe_timeout(), Duration::from_secs(5));

        assert_eq!(ProbeConfig::default().with_concurrency(0).concurrency, 1);
    }
}
