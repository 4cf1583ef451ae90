//! Configuration management for logsift.
//!
//! Configuration is a TOML file with a `[defaults]` table and one
//! `[environments.<name>]` table per backend environment. Resolving an
//! environment merges its values over the defaults and applies environment
//! variable overrides.
//!
//! Precedence (highest to lowest):
//! 1. Command-line arguments (applied by the CLI layer)
//! 2. `LOGSIFT_*` environment variables
//! 3. The environment's table
//! 4. `[defaults]`

use serde::Deserialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Fallback values shared by all environments.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend environments.
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

/// Values applied when an environment does not override them.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    /// Records requested per backend round trip.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Records per output chunk before a flush is forced.
    #[serde(default = "default_max_records_per_chunk")]
    pub max_records_per_chunk: usize,

    /// Snapshot keep-alive window.
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,

    /// Base directory for extraction output.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// One named environment in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    /// Backend base URL.
    pub url: String,

    /// Default index for this environment.
    pub index: String,

    #[serde(default)]
    pub batch_size: Option<usize>,

    #[serde(default)]
    pub max_records_per_chunk: Option<usize>,

    #[serde(default)]
    pub keep_alive: Option<String>,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Fully resolved settings for one environment.
#[derive(Debug, Clone)]
pub struct Environment {
    pub url: String,
    pub index: String,
    pub batch_size: usize,
    pub max_records_per_chunk: usize,
    pub keep_alive: String,
    pub output_dir: PathBuf,
    pub timeout: u64,
}

// Default value functions
fn default_batch_size() -> usize {
    1000
}

fn default_max_records_per_chunk() -> usize {
    10_000
}

fn default_keep_alive() -> String {
    "1m".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("extracted_logs")
}

fn default_timeout() -> u64 {
    30
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_records_per_chunk: default_max_records_per_chunk(),
            keep_alive: default_keep_alive(),
            output_dir: default_output_dir(),
            timeout: default_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                crate::error::LogsiftError::Config(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                crate::error::LogsiftError::Io(e)
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Load configuration, falling back to a built-in local setup.
    ///
    /// An explicitly given path must exist. The default path is optional:
    /// when it is missing, a configuration with a single `local`
    /// environment pointing at `http://localhost:9200` is used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::builtin())
                }
            }
        }
    }

    /// Get the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".logsift")
            .join("config.toml")
    }

    /// Built-in configuration used when no config file is present.
    fn builtin() -> Self {
        let mut environments = BTreeMap::new();
        environments.insert(
            "local".to_string(),
            EnvironmentConfig {
                url: "http://localhost:9200".to_string(),
                index: "logs-multiples".to_string(),
                batch_size: None,
                max_records_per_chunk: None,
                keep_alive: None,
                output_dir: None,
                timeout: None,
            },
        );

        Self {
            defaults: Defaults::default(),
            environments,
        }
    }

    /// Resolve the named environment against the defaults and `LOGSIFT_*`
    /// environment variable overrides.
    pub fn resolve(&self, name: &str) -> Result<Environment> {
        let env = self
            .environments
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEnvironment(name.to_string()))?;

        let mut resolved = self.merge(env);

        if let Some(url) = env_override("LOGSIFT_URL") {
            resolved.url = url;
        }
        if let Some(index) = env_override("LOGSIFT_INDEX") {
            resolved.index = index;
        }
        if let Some(dir) = env_override("LOGSIFT_OUTPUT_DIR") {
            resolved.output_dir = PathBuf::from(dir);
        }

        Ok(resolved)
    }

    fn merge(&self, env: &EnvironmentConfig) -> Environment {
        Environment {
            url: env.url.clone(),
            index: env.index.clone(),
            batch_size: env.batch_size.unwrap_or(self.defaults.batch_size),
            max_records_per_chunk: env
                .max_records_per_chunk
                .unwrap_or(self.defaults.max_records_per_chunk),
            keep_alive: env
                .keep_alive
                .clone()
                .unwrap_or_else(|| self.defaults.keep_alive.clone()),
            output_dir: env
                .output_dir
                .clone()
                .unwrap_or_else(|| self.defaults.output_dir.clone()),
            timeout: env.timeout.unwrap_or(self.defaults.timeout),
        }
    }
}

impl Environment {
    /// Per-request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [defaults]
        batch_size = 500
        keep_alive = "2m"

        [environments.staging]
        url = "http://staging.example.com:9200"
        index = "logs-staging"

        [environments.prod]
        url = "http://prod.example.com:9200"
        index = "logs-prod"
        batch_size = 2000
        output_dir = "/var/extract"
    "#;

    #[test]
    fn test_environment_inherits_defaults() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let env = config.merge(&config.environments["staging"]);

        assert_eq!(env.batch_size, 500);
        assert_eq!(env.keep_alive, "2m");
        // Unset in both places: hard default applies.
        assert_eq!(env.max_records_per_chunk, 10_000);
        assert_eq!(env.output_dir, PathBuf::from("extracted_logs"));
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let env = config.merge(&config.environments["prod"]);

        assert_eq!(env.batch_size, 2000);
        assert_eq!(env.output_dir, PathBuf::from("/var/extract"));
    }

    #[test]
    fn test_unknown_environment_is_an_error() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert!(config.resolve("nonexistent").is_err());
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let err = Config::from_toml("this is not toml [").unwrap_err();
        assert!(matches!(
            err,
            crate::error::LogsiftError::Config(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_builtin_config_has_local_environment() {
        let config = Config::builtin();
        let env = config.merge(&config.environments["local"]);
        assert_eq!(env.url, "http://localhost:9200");
        assert_eq!(env.batch_size, 1000);
    }
}
