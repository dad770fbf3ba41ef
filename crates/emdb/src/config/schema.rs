use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::client::{imdb, ollama};
use crate::error::ConfigError;
use crate::job::sweeper::{DEFAULT_ABANDON_AFTER, DEFAULT_SWEEP_INTERVAL};
use crate::job::Category;
use crate::worker::DEFAULT_POLL_INTERVAL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub version: String,
    /// Defaults to `~/.emdb/data/emdb.db` when absent.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_abandon_after_secs")]
    pub abandon_after_secs: u64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Return every job to `todo` when the worker starts.
    #[serde(default = "default_true")]
    pub reset_on_startup: bool,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub imdb: ImdbConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL.as_secs()
}

fn default_abandon_after_secs() -> u64 {
    DEFAULT_ABANDON_AFTER.as_secs()
}

fn default_busy_timeout_ms() -> u64 {
    crate::db::DEFAULT_BUSY_TIMEOUT.as_millis() as u64
}

fn default_true() -> bool {
    true
}

fn default_categories() -> Vec<Category> {
    vec![Category::Simple, Category::Ai]
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database_path: None,
            poll_interval_secs: default_poll_interval_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            abandon_after_secs: default_abandon_after_secs(),
            busy_timeout_ms: default_busy_timeout_ms(),
            reset_on_startup: true,
            categories: default_categories(),
            imdb: ImdbConfig::default(),
            completion: CompletionConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn abandon_after(&self) -> Duration {
        Duration::from_secs(self.abandon_after_secs)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// The configured database path, or the per-user default.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        self.database_path
            .clone()
            .or_else(crate::db::default_database_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImdbConfig {
    #[serde(default = "default_imdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_imdb_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_imdb_base_url() -> String {
    imdb::DEFAULT_BASE_URL.to_string()
}

fn default_imdb_timeout_secs() -> u64 {
    imdb::DEFAULT_TIMEOUT.as_secs()
}

impl Default for ImdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_imdb_base_url(),
            timeout_secs: default_imdb_timeout_secs(),
        }
    }
}

impl ImdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the environment variable holding an API key, if the
    /// endpoint needs one.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_completion_base_url() -> String {
    ollama::DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    ollama::DEFAULT_MODEL.to_string()
}

fn default_completion_timeout_secs() -> u64 {
    ollama::DEFAULT_TIMEOUT.as_secs()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            model: default_model(),
            timeout_secs: default_completion_timeout_secs(),
            api_key_env: None,
        }
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<Option<SecretString>, ConfigError> {
        let Some(name) = self.api_key_env.as_deref().filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(Some(SecretString::from(value))),
            _ => Err(ConfigError::MissingEnv {
                name: name.to_string(),
            }),
        }
    }
}
