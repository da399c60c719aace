//! Domain Scout CLI Application
//!
//! Turns a product description into candidate base names, probes every
//! name against a suffix list, and prints which domains are still free.

mod suggest;
mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::Term;
use domain_scout_lib::{
    expand_candidates, load_env_config, parse_duration, summarize, ConfigManager, DomainProber,
    ProbeConfig, MAX_CONCURRENCY,
};
use std::process;
use std::time::Instant;
use suggest::{NameSuggester, OpenAiSuggester, StaticNames, DEFAULT_COUNT, DEFAULT_MODEL};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-scout
#[derive(Parser, Debug)]
#[command(name = "domain-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Suggest domain names for an idea and check which are available")]
#[command(
    long_about = "Suggest domain names for a product or business description, then check each name against a list of suffixes using DNS and WHOIS.\n\nPass --names to skip the suggestion step and check your own names."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Description of the product or business to find names for
    #[arg(value_name = "PROMPT", help_heading = "Name Selection")]
    pub prompt: Option<String>,

    /// Check these base names instead of asking for suggestions
    #[arg(long = "names", value_name = "NAME", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Name Selection")]
    pub names: Option<Vec<String>>,

    /// Suffixes to check (comma-separated or multiple -s flags) [default: .com,.co,.ai,.net]
    #[arg(short = 's', long = "suffix", value_name = "SUFFIX", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Name Selection")]
    pub suffixes: Option<Vec<String>>,

    /// Preview the candidate domains without probing them
    #[arg(long = "dry-run", help_heading = "Name Selection")]
    pub dry_run: bool,

    /// Model used for name suggestions [default: gpt-4o-mini]
    #[arg(long = "model", value_name = "MODEL", help_heading = "Suggestions")]
    pub model: Option<String>,

    /// Number of names to ask for [default: 20]
    #[arg(long = "count", value_name = "N", help_heading = "Suggestions")]
    pub count: Option<usize>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Show registrar and expiry for taken domains, reasons for unknown ones
    #[arg(short = 'i', long = "info", help_heading = "Output Format")]
    pub info: bool,

    /// Max concurrent probes (default: 20, max: 100)
    #[arg(short = 'c', long = "concurrency", value_name = "N", help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Deadline for each probe, e.g. "30s" or "1m"
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Verbose logging on stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Everything a run needs, after all config layers are applied.
#[derive(Debug, Clone)]
struct Settings {
    probe: ProbeConfig,
    model: String,
    count: usize,
    base_url: Option<String>,
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; real environment variables always win.
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "domain_scout=debug,domain_scout_lib=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    let has_prompt = args
        .prompt
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());

    if !has_prompt && args.names.is_none() {
        return Err("You must give a PROMPT to get suggestions, or names with --names".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(format!("Concurrency must be between 1 and {}", MAX_CONCURRENCY));
        }
    }

    if args.count == Some(0) {
        return Err("--count must be at least 1".to_string());
    }

    if let Some(timeout) = &args.timeout {
        if parse_duration(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use a format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;
    debug!(?settings, "Resolved settings");

    let names = gather_names(&args, &settings).await?;
    let batch = expand_candidates(&names, &settings.probe.suffixes)?;

    if args.dry_run {
        let domains: Vec<&str> = batch.iter().map(|c| c.as_str()).collect();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&domains)?);
        } else {
            for domain in &domains {
                println!("{}", domain);
            }
        }
        eprintln!("{} domains would be checked", domains.len());
        return Ok(());
    }

    let prober = DomainProber::with_config(settings.probe.clone());
    let progress = if args.json { None } else { ui::progress_line() };

    let start_time = Instant::now();
    let outcomes = prober.check_batch(&batch, progress).await?;
    let duration = start_time.elapsed();

    let term = Term::stderr();
    if term.is_term() {
        let _ = term.clear_line();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        ui::print_results(&outcomes, args.info);
        ui::print_summary(&summarize(&outcomes), duration);
    }

    Ok(())
}

/// Base names from `--names`, or from the suggestion endpoint.
async fn gather_names(
    args: &Args,
    settings: &Settings,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let suggester: Box<dyn NameSuggester> = match &args.names {
        Some(names) => {
            if args.prompt.is_some() {
                warn!("Both PROMPT and --names given; using --names");
            }
            Box::new(StaticNames(names.clone()))
        }
        None => Box::new(OpenAiSuggester::from_env(
            settings.model.clone(),
            settings.count,
            settings.base_url.clone(),
        )?),
    };

    let spinner = if args.names.is_none() && !args.json {
        ui::Spinner::start("Generating names...".to_string())
    } else {
        None
    };

    let prompt = args.prompt.as_deref().unwrap_or_default();
    let result = suggester.suggest(prompt).await;

    if let Some(s) = spinner {
        s.stop().await;
    }

    Ok(result?)
}

/// Build settings from every layer.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (SCOUT_*)
/// 3. Config file: `--config`, else `SCOUT_CONFIG`, else discovered files
/// 4. Built-in defaults
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();
    let env_config = load_env_config();

    let explicit_path = args.config.clone().or_else(|| env_config.config.clone());
    let file_config = match explicit_path {
        Some(path) => {
            debug!(path = %path, "Using explicit config file");
            config_manager
                .load_file(&path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load()?,
    };

    let probe = file_config.apply_to(ProbeConfig::default());
    let probe = env_config.apply_to(probe);
    let probe = apply_cli_args(probe, args);

    let suggest = file_config.suggest.clone().unwrap_or_default();

    Ok(Settings {
        probe,
        model: args
            .model
            .clone()
            .or(env_config.model)
            .or(suggest.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        count: args.count.or(suggest.count).unwrap_or(DEFAULT_COUNT),
        base_url: suggest.base_url,
    })
}

/// Apply CLI arguments to config (highest precedence). Only flags the user
/// actually passed override earlier layers.
fn apply_cli_args(mut config: ProbeConfig, args: &Args) -> ProbeConfig {
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(suffixes) = &args.suffixes {
        config = config.with_suffixes(suffixes.clone());
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_duration) {
        config = config.with_probe_timeout(timeout);
    }
    config
}
