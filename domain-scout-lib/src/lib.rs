//! # Domain Scout Library
//!
//! Concurrent domain-availability probing over DNS and WHOIS.
//!
//! Base names are expanded against a suffix list into candidates, every
//! candidate is probed under a bounded concurrency ceiling, and the result
//! set comes back complete and deterministically ordered: one outcome per
//! candidate, each `Available`, `Taken`, or `Unknown`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_scout_lib::{DomainProber, ProbeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prober = DomainProber::with_config(ProbeConfig::default().with_concurrency(10));
//!     let outcomes = prober.check_names(&["acme".to_string()]).await?;
//!
//!     for outcome in &outcomes {
//!         println!("{} {}", outcome.domain(), outcome.availability());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Signals
//!
//! - **DNS**: an existence hint only. A resolving name is provisionally taken.
//! - **WHOIS**: authoritative. A registration record means taken, a
//!   definite "no match" means available, anything else means unknown.

pub use aggregate::{aggregate, summarize, Summary};
pub use checker::{reduce_signals, DomainProber, Probe};
pub use concurrent::Dispatcher;
pub use config::{
    env_config_from, load_env_config, parse_duration, ConfigManager, DefaultsConfig, EnvConfig,
    FileConfig, SuggestConfig,
};
pub use error::ScoutError;
pub use expand::{expand_candidates, normalize_suffix};
pub use types::{
    Availability, Candidate, Outcome, ProbeBatch, ProbeConfig, Progress, ProgressCallback,
    DEFAULT_CONCURRENCY, DEFAULT_SUFFIXES, MAX_CONCURRENCY,
};

/// DNS and WHOIS signal sources, public so callers can supply their own.
pub mod protocols;

mod aggregate;
mod checker;
mod concurrent;
mod config;
mod error;
mod expand;
mod types;
mod utils;

pub type Result<T> = std::result::Result<T, ScoutError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
