//! Main prober implementation.
//!
//! `DomainProber` owns the signal sources and the configuration captured at
//! construction. Probing a candidate never fails: whatever goes wrong ends up
//! in an `Unknown` outcome.

use crate::aggregate::aggregate;
use crate::concurrent::Dispatcher;
use crate::error::ScoutError;
use crate::expand::expand_candidates;
use crate::protocols::{DnsOutcome, DnsResolver, DnsSignal, WhoisClient, WhoisLookup, WhoisSignal};
use crate::types::{Candidate, Outcome, ProbeBatch, ProbeConfig, ProgressCallback};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Anything that can turn one candidate into one outcome.
///
/// Implementations must be total (always return an `Outcome`) and safe to
/// call concurrently with themselves.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn probe(&self, candidate: &Candidate) -> Outcome;
}

/// Combine the two signals into a verdict.
///
/// WHOIS decides. A resolving name is only a provisional "taken": it never
/// produces `Unknown` on its own and never overrides a definite WHOIS answer,
/// so a name that resolves but has no WHOIS record comes out `Available`.
pub fn reduce_signals(candidate: Candidate, dns: &DnsOutcome, whois: WhoisLookup) -> Outcome {
    if dns.resolves() {
        debug!(domain = %candidate, "Resolves in DNS, provisionally taken");
    }

    match whois {
        WhoisLookup::DefiniteRecord(record) => {
            Outcome::taken(candidate, record.registrar, record.expiration)
        }
        WhoisLookup::NoRecord => {
            if dns.resolves() {
                warn!(
                    domain = %candidate,
                    "Resolves in DNS but WHOIS has no record; reporting available"
                );
            }
            Outcome::available(candidate)
        }
        WhoisLookup::TransportError(e) | WhoisLookup::ParseError(e) => {
            Outcome::unknown(candidate, e.to_string())
        }
    }
}

/// Prober coordinating the DNS and WHOIS signals.
///
/// # Example
///
/// ```rust,no_run
/// use domain_scout_lib::{DomainProber, ProbeConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ProbeConfig::default().with_suffixes(vec![".com".into(), ".ai".into()]);
///     let prober = DomainProber::with_config(config);
///
///     let outcomes = prober.check_names(&["acme".to_string()]).await?;
///     for outcome in outcomes {
///         println!("{}: {}", outcome.domain(), outcome.availability());
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DomainProber {
    config: ProbeConfig,
    dns: Arc<dyn DnsSignal>,
    whois: Arc<dyn WhoisSignal>,
}

impl DomainProber {
    /// Create a prober with the default configuration and network clients.
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a prober with network clients built from `config`.
    pub fn with_config(config: ProbeConfig) -> Self {
        let dns = DnsResolver::new()
            .with_timeout(config.dns_timeout)
            .with_nameserver(config.nameserver.clone());
        let whois = WhoisClient::new().with_timeout(config.whois_timeout);
        Self::with_signals(config, Arc::new(dns), Arc::new(whois))
    }

    /// Create a prober over caller-supplied signal sources.
    pub fn with_signals(
        config: ProbeConfig,
        dns: Arc<dyn DnsSignal>,
        whois: Arc<dyn WhoisSignal>,
    ) -> Self {
        Self { config, dns, whois }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe a single candidate: DNS first, then WHOIS.
    #[instrument(skip(self), fields(domain = %candidate))]
    pub async fn check_candidate(&self, candidate: &Candidate) -> Outcome {
        let dns = self.dns.resolve(candidate.as_str()).await;
        let whois = self.whois.lookup(candidate.as_str()).await;
        reduce_signals(candidate.clone(), &dns, whois)
    }

    /// A dispatcher running this prober under the configured ceiling.
    pub fn dispatcher(&self) -> Dispatcher<DomainProber> {
        Dispatcher::new(
            Arc::new(self.clone()),
            self.config.concurrency,
            self.config.effective_probe_timeout(),
        )
    }

    /// Probe every candidate of a batch and return the ordered result set.
    ///
    /// # Errors
    ///
    /// Only `ScoutError::IncompleteResult`, if the dispatcher ever fails to
    /// account for a candidate.
    pub async fn check_batch(
        &self,
        batch: &ProbeBatch,
        progress: Option<ProgressCallback>,
    ) -> Result<Vec<Outcome>, ScoutError> {
        let outcomes = self.dispatcher().run(batch, progress).await;
        aggregate(batch, outcomes)
    }

    /// Expand base names with the configured suffixes and probe them all.
    ///
    /// Repeated names and suffixes are collapsed first (after trimming and
    /// lowercasing), so the result holds exactly one outcome per distinct
    /// name × distinct suffix pair, not `base_names.len() × suffixes.len()`.
    ///
    /// # Errors
    ///
    /// `ScoutError::InvalidInput` for a malformed name list, and
    /// `ScoutError::IncompleteResult` as for [`DomainProber::check_batch`].
    pub async fn check_names(&self, base_names: &[String]) -> Result<Vec<Outcome>, ScoutError> {
        let batch = expand_candidates(base_names, &self.config.suffixes)?;
        self.check_batch(&batch, None).await
    }
}

impl Default for DomainProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for DomainProber {
    async fn probe(&self, candidate: &Candidate) -> Outcome {
        self.check_candidate(candidate).await
    }
}
