pub mod catalogue;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod job;
pub mod logging;
pub mod worker;

pub use catalogue::{Movie, MovieRepository, Review, ReviewRepository, Titles};
pub use client::{CompletionClient, ImdbScraper, OllamaClient, ReviewScraper};
pub use config::{load_config, WorkerConfig};
pub use db::Database;
pub use error::{EmdbError, Result};
pub use job::{Action, Category, JobQueue, JobRecord, JobStatus, QueueError, Sweeper};
pub use worker::{HandlerError, Worker, WorkerContext};
