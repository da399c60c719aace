//! Signal sources used by the availability probe.
//!
//! Each source is a trait so a prober can be built over real network clients
//! or scripted fakes. Both return classifications rather than `Result`s: a
//! failed lookup is a valid signal, not an error for the caller to handle.

use crate::error::ScoutError;
use async_trait::async_trait;
use std::net::IpAddr;

/// DNS existence check.
pub mod dns;

/// Built-in WHOIS server table and query syntax.
pub mod registry;

/// WHOIS protocol implementation.
pub mod whois;

pub use dns::DnsResolver;
pub use registry::{builtin_whois_server, whois_query};
pub use whois::{classify_response, parse_iana_refer_response, WhoisClient};

/// What the DNS lookup said about a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsOutcome {
    /// The name resolves; strong hint that it is in use
    Resolved(Vec<IpAddr>),
    /// Name-not-found class of answer
    NotFound,
    /// Lookup failed for another reason (timeout, invalid name, ...)
    Failed(String),
}

impl DnsOutcome {
    pub fn resolves(&self) -> bool {
        matches!(self, DnsOutcome::Resolved(_))
    }
}

/// Registration details recovered from a WHOIS record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WhoisRecord {
    /// Registered domain name as echoed by the registry
    pub domain_name: String,
    pub registrar: Option<String>,
    pub expiration: Option<String>,
}

/// Classified WHOIS answer for one candidate.
#[derive(Debug, Clone)]
pub enum WhoisLookup {
    /// A registration record with a non-empty identifier
    DefiniteRecord(WhoisRecord),
    /// The registry has no record (explicit no-match, or a record without
    /// an identifier)
    NoRecord,
    /// The lookup never produced a usable answer
    TransportError(ScoutError),
    /// An answer arrived that is neither "no record" nor a definite record
    ParseError(ScoutError),
}

/// Source of the DNS signal.
#[async_trait]
pub trait DnsSignal: Send + Sync {
    async fn resolve(&self, domain: &str) -> DnsOutcome;
}

/// Source of the WHOIS signal.
#[async_trait]
pub trait WhoisSignal: Send + Sync {
    async fn lookup(&self, domain: &str) -> WhoisLookup;
}
