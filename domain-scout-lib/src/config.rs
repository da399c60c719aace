//! Configuration file parsing and management.
//!
//! Layers, lowest to highest precedence: built-in defaults, TOML files,
//! `SCOUT_*` environment variables, then whatever the caller applies last
//! (CLI flags). Each layer only overrides the values it actually sets.

use crate::error::ScoutError;
use crate::expand::normalize_suffix;
use crate::types::{ProbeConfig, MAX_CONCURRENCY};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// concurrency = 10
/// suffixes = [".com", ".io"]
/// timeout = "30s"
///
/// [suggest]
/// model = "gpt-4o-mini"
/// count = 20
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Probe defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Name suggestion settings, used by the CLI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest: Option<SuggestConfig>,
}

/// Default values for probe options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Suffixes appended to every base name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffixes: Option<Vec<String>>,

    /// Whole-probe deadline ("30s", "2m", or bare seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_timeout: Option<String>,

    /// Nameserver IP for the DNS signal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameserver: Option<String>,
}

/// Settings for the name suggestion step.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuggestConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// How many names to ask for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// Base URL of an OpenAI-compatible API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl FileConfig {
    /// Overlay the file's probe defaults onto `config`.
    ///
    /// Only call this on a validated config; unparseable durations are
    /// skipped.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        let Some(defaults) = &self.defaults else {
            return config;
        };

        if let Some(concurrency) = defaults.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(suffixes) = &defaults.suffixes {
            config = config.with_suffixes(suffixes.clone());
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration) {
            config = config.with_probe_timeout(timeout);
        }
        if let Some(timeout) = defaults.dns_timeout.as_deref().and_then(parse_duration) {
            config = config.with_dns_timeout(timeout);
        }
        if let Some(timeout) = defaults.whois_timeout.as_deref().and_then(parse_duration) {
            config = config.with_whois_timeout(timeout);
        }
        if let Some(nameserver) = &defaults.nameserver {
            config = config.with_nameserver(nameserver.clone());
        }
        config
    }
}

/// Configuration discovery and loading.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load and validate one configuration file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, ScoutError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScoutError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ScoutError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            ScoutError::config(format!(
                "Failed to parse TOML in {}: {}",
                path.display(),
                e
            ))
        })?;

        self.validate_config(&config)?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load every config file found in the standard locations, merged in
    /// precedence order (XDG, then home directory, then current directory).
    ///
    /// Broken files are reported and skipped rather than aborting the run.
    pub fn discover_and_load(&self) -> Result<FileConfig, ScoutError> {
        let mut merged = FileConfig::default();

        let locations = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in locations.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => merged = self.merge_configs(merged, config),
                Err(e) => warn!(path = %path.display(), error = %e, "Ignoring config file"),
            }
        }

        Ok(merged)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./.domain-scout.toml", "./domain-scout.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".domain-scout.toml", "domain-scout.toml"]
            .iter()
            .map(|name| Path::new(&home).join(name))
            .find(|p| p.exists())
    }

    /// `$XDG_CONFIG_HOME/domain-scout/config.toml`, defaulting to `~/.config`.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-scout").join("config.toml");
        path.exists().then_some(path)
    }

    /// Values from `higher` win field by field.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    concurrency: higher.concurrency.or(lower.concurrency),
                    suffixes: higher.suffixes.or(lower.suffixes),
                    timeout: higher.timeout.or(lower.timeout),
                    dns_timeout: higher.dns_timeout.or(lower.dns_timeout),
                    whois_timeout: higher.whois_timeout.or(lower.whois_timeout),
                    nameserver: higher.nameserver.or(lower.nameserver),
                }),
                (lower, higher) => higher.or(lower),
            },
            suggest: match (lower.suggest, higher.suggest) {
                (Some(lower), Some(higher)) => Some(SuggestConfig {
                    model: higher.model.or(lower.model),
                    count: higher.count.or(lower.count),
                    base_url: higher.base_url.or(lower.base_url),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    fn validate_config(&self, config: &FileConfig) -> Result<(), ScoutError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > MAX_CONCURRENCY {
                    return Err(ScoutError::config(format!(
                        "Concurrency must be between 1 and {}",
                        MAX_CONCURRENCY
                    )));
                }
            }

            let timeouts = [
                ("timeout", &defaults.timeout),
                ("dns_timeout", &defaults.dns_timeout),
                ("whois_timeout", &defaults.whois_timeout),
            ];
            for (key, value) in timeouts {
                if let Some(value) = value {
                    if parse_duration(value).is_none() {
                        return Err(ScoutError::config(format!(
                            "Invalid {} '{}'. Use a format like '5s', '30s', '2m'",
                            key, value
                        )));
                    }
                }
            }

            if let Some(suffixes) = &defaults.suffixes {
                if suffixes.is_empty() {
                    return Err(ScoutError::config("Suffix list cannot be empty"));
                }
                if let Some(bad) = suffixes.iter().find(|s| normalize_suffix(s).is_none()) {
                    return Err(ScoutError::config(format!("Invalid suffix '{}'", bad)));
                }
            }
        }

        if let Some(suggest) = &config.suggest {
            if suggest.count == Some(0) {
                return Err(ScoutError::config("Suggestion count must be at least 1"));
            }
        }

        Ok(())
    }
}

/// Configuration read from `SCOUT_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub suffixes: Option<Vec<String>>,
    pub timeout: Option<Duration>,
    pub whois_timeout: Option<Duration>,
    pub nameserver: Option<String>,
    pub model: Option<String>,
    pub config: Option<String>,
}

impl EnvConfig {
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(suffixes) = &self.suffixes {
            config = config.with_suffixes(suffixes.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_probe_timeout(timeout);
        }
        if let Some(timeout) = self.whois_timeout {
            config = config.with_whois_timeout(timeout);
        }
        if let Some(nameserver) = &self.nameserver {
            config = config.with_nameserver(nameserver.clone());
        }
        config
    }
}

/// Load configuration from the process environment.
///
/// Invalid values are logged and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

/// Build an `EnvConfig` from any variable lookup.
pub fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("SCOUT_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(n) if (1..=MAX_CONCURRENCY).contains(&n) => {
                debug!(concurrency = n, "Using SCOUT_CONCURRENCY");
                env_config.concurrency = Some(n);
            }
            _ => warn!(value = %val, "Invalid SCOUT_CONCURRENCY, must be 1-{}", MAX_CONCURRENCY),
        }
    }

    // Comma-separated, e.g. ".com,.io,ai"
    if let Some(val) = lookup("SCOUT_SUFFIXES") {
        let suffixes: Vec<String> = val.split(',').filter_map(normalize_suffix).collect();
        if suffixes.is_empty() {
            warn!(value = %val, "Ignoring empty SCOUT_SUFFIXES");
        } else {
            env_config.suffixes = Some(suffixes);
        }
    }

    if let Some(val) = lookup("SCOUT_TIMEOUT") {
        env_config.timeout = parse_duration(&val);
        if env_config.timeout.is_none() {
            warn!(value = %val, "Invalid SCOUT_TIMEOUT, use a format like '30s' or '2m'");
        }
    }

    if let Some(val) = lookup("SCOUT_WHOIS_TIMEOUT") {
        env_config.whois_timeout = parse_duration(&val);
        if env_config.whois_timeout.is_none() {
            warn!(value = %val, "Invalid SCOUT_WHOIS_TIMEOUT, use a format like '10s'");
        }
    }

    env_config.nameserver = non_blank(lookup("SCOUT_NAMESERVER"));
    env_config.model = non_blank(lookup("SCOUT_MODEL"));
    env_config.config = non_blank(lookup("SCOUT_CONFIG"));

    env_config
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse "5s", "2m", or bare seconds. Zero is rejected.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();

    let secs = if let Some(s) = input.strip_suffix('s') {
        s.trim().parse::<u64>().ok()
    } else if let Some(m) = input.strip_suffix('m') {
        m.trim().parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        input.parse::<u64>().ok()
    }?;

    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("30S"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration(" 7 "), Some(Duration::from_secs(7)));
        assert_eq!(parse_duration("0s"), None);
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn test_parse_duration_rejects_overflow() {
        assert_eq!(parse_duration("18446744073709551615m"), None);
        assert_eq!(
            parse_duration("18446744073709551615s"),
            Some(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"
[defaults]
concurrency = 25
suffixes = [".com", "io"]
timeout = "45s"
nameserver = "9.9.9.9"

[suggest]
model = "gpt-4o"
count = 10
"#,
        );

        let config = ConfigManager::new().load_file(file.path()).unwrap();
        let defaults = config.defaults.clone().unwrap();
        assert_eq!(defaults.concurrency, Some(25));
        assert_eq!(defaults.timeout.as_deref(), Some("45s"));

        let suggest = config.suggest.clone().unwrap();
        assert_eq!(suggest.model.as_deref(), Some("gpt-4o"));
        assert_eq!(suggest.count, Some(10));

        let probe = config.apply_to(ProbeConfig::default());
        assert_eq!(probe.concurrency, 25);
        assert_eq!(probe.suffixes, vec![".com", ".io"]);
        assert_eq!(probe.effective_probe_timeout(), Duration::from_secs(45));
        assert_eq!(probe.nameserver.as_deref(), Some("9.9.9.9"));
    }

    #[test]
    fn test_invalid_concurrency() {
        let file = write_config("[defaults]\nconcurrency = 0\n");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Concurrency"));
    }

    #[test]
    fn test_invalid_timeout_and_suffix() {
        let file = write_config("[defaults]\nwhois_timeout = \"later\"\n");
        assert!(ConfigManager::new().load_file(file.path()).is_err());

        let file = write_config("[defaults]\nsuffixes = [\" \"]\n");
        assert!(ConfigManager::new().load_file(file.path()).is_err());

        let file = write_config("[defaults]\nsuffixes = []\n");
        assert!(ConfigManager::new().load_file(file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[defaults\nconcurrency = ");
        let err = ConfigManager::new().load_file(file.path()).unwrap_err();
        assert!(matches!(err, ScoutError::Config { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::new()
            .load_file("/nonexistent/domain-scout.toml")
            .unwrap_err();
        assert!(matches!(err, ScoutError::File { .. }));
    }

    #[test]
    fn test_merge_configs_field_by_field() {
        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(5),
                suffixes: Some(vec![".com".to_string()]),
                ..Default::default()
            }),
            suggest: Some(SuggestConfig {
                model: Some("gpt-4o-mini".to_string()),
                ..Default::default()
            }),
        };
        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(50),
                ..Default::default()
            }),
            suggest: None,
        };

        let merged = ConfigManager::new().merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();
        assert_eq!(defaults.concurrency, Some(50));
        assert_eq!(defaults.suffixes, Some(vec![".com".to_string()]));
        assert_eq!(merged.suggest.unwrap().model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_env_config() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SCOUT_CONCURRENCY", "8"),
            ("SCOUT_SUFFIXES", "com, .io,,"),
            ("SCOUT_TIMEOUT", "1m"),
            ("SCOUT_MODEL", "  "),
            ("SCOUT_CONFIG", "/tmp/scout.toml"),
        ]);
        let env = env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env.concurrency, Some(8));
        assert_eq!(env.suffixes, Some(vec![".com".to_string(), ".io".to_string()]));
        assert_eq!(env.timeout, Some(Duration::from_secs(60)));
        assert_eq!(env.model, None);
        assert_eq!(env.config.as_deref(), Some("/tmp/scout.toml"));

        let probe = env.apply_to(ProbeConfig::default());
        assert_eq!(probe.concurrency, 8);
        assert_eq!(probe.suffixes, vec![".com", ".io"]);
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SCOUT_CONCURRENCY", "500"),
            ("SCOUT_SUFFIXES", " , "),
            ("SCOUT_TIMEOUT", "whenever"),
        ]);
        let env = env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env.concurrency, None);
        assert_eq!(env.suffixes, None);
        assert_eq!(env.timeout, None);
    }

    #[test]
    fn test_huge_env_timeouts_do_not_overflow() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SCOUT_WHOIS_TIMEOUT", "18446744073709551615"),
        ]);
        let env = env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        let probe = env.apply_to(ProbeConfig::default());

        assert_eq!(probe.whois_timeout, Duration::from_secs(u64::MAX));
        assert_eq!(probe.effective_probe_timeout(), Duration::MAX);

        let explicit = probe.with_probe_timeout(Duration::from_secs(30));
        assert_eq!(explicit.effective_probe_timeout(), Duration::from_secs(30));
    }
}
