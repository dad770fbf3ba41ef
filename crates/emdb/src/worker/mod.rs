//! Job consumers: the polling loop and one handler per action.

use std::sync::Arc;

use thiserror::Error;

use crate::catalogue::{MovieRepository, ReviewRepository, StoreError};
use crate::client::{ClientError, CompletionClient, ImdbScraper, OllamaClient, ReviewScraper};
use crate::config::WorkerConfig;
use crate::db::{Database, SqliteMovieRepository, SqliteReviewRepository};
use crate::error::EmdbError;
use crate::job::{JobQueue, QueueError};

pub mod handlers;
pub mod prompt;
pub mod runner;

pub use runner::{Worker, DEFAULT_POLL_INTERVAL};

/// Why a handler gave up on a job. Every variant ends with the job marked
/// failed; none of them stops the loop.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Movie '{0}' not found")]
    MovieNotFound(String),

    #[error("Review '{0}' not found")]
    ReviewNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Malformed completion: {0}")]
    MalformedCompletion(String),
}

/// Everything a handler may touch.
#[derive(Clone)]
pub struct WorkerContext {
    pub queue: JobQueue,
    pub movies: Arc<dyn MovieRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub scraper: Arc<dyn ReviewScraper>,
    pub completion: Arc<dyn CompletionClient>,
    /// Model name passed to the completion client.
    pub model: String,
}

impl WorkerContext {
    /// Wires the SQLite stores and HTTP clients described by `config`
    /// around an open database.
    pub fn from_config(config: &WorkerConfig, db: Database) -> Result<Self, EmdbError> {
        let mut completion =
            OllamaClient::new(&config.completion.base_url, config.completion.timeout())?;
        if let Some(key) = config.completion.api_key()? {
            completion = completion.with_api_key(key);
        }

        Ok(Self {
            queue: JobQueue::new(db.clone()),
            movies: Arc::new(SqliteMovieRepository::new(db.clone())),
            reviews: Arc::new(SqliteReviewRepository::new(db)),
            scraper: Arc::new(ImdbScraper::new(&config.imdb.base_url, config.imdb.timeout())?),
            completion: Arc::new(completion),
            model: config.completion.model.clone(),
        })
    }
}
