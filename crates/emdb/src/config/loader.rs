use std::path::Path;

use crate::config::schema::WorkerConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WorkerConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<WorkerConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: WorkerConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    for (name, value) in [
        ("poll_interval_secs", config.poll_interval_secs),
        ("sweep_interval_secs", config.sweep_interval_secs),
        ("abandon_after_secs", config.abandon_after_secs),
        ("imdb.timeout_secs", config.imdb.timeout_secs),
        ("completion.timeout_secs", config.completion.timeout_secs),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation {
                message: format!("{} must be greater than zero", name),
            });
        }
    }

    // A job may stay in `doing` for at least one full sweep period.
    if config.abandon_after_secs <= config.sweep_interval_secs {
        return Err(ConfigError::Validation {
            message: format!(
                "abandon_after_secs ({}) must be longer than sweep_interval_secs ({})",
                config.abandon_after_secs, config.sweep_interval_secs
            ),
        });
    }

    if config.categories.is_empty() {
        return Err(ConfigError::Validation {
            message: "At least one worker category is required".to_string(),
        });
    }

    if config.completion.model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "completion.model must not be empty".to_string(),
        });
    }

    Ok(())
}
