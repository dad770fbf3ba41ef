use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmdbError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Queue error: {0}")]
    Queue(#[from] crate::job::QueueError),

    #[error("Client error: {0}")]
    Client(#[from] crate::client::ClientError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Environment variable '{name}' is not set or not valid unicode")]
    MissingEnv { name: String },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to build async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    #[error("No database path configured and no home directory found")]
    NoDatabasePath,
}

pub type Result<T> = std::result::Result<T, EmdbError>;
