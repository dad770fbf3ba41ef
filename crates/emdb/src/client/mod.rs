//! External collaborators reached over HTTP: the review scraper and the
//! language-model completion endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::catalogue::{Movie, Review};

pub mod error;
pub mod imdb;
pub mod ollama;

pub use error::ClientError;
pub use imdb::ImdbScraper;
pub use ollama::OllamaClient;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum length of an error body kept in [`ClientError::Status`].
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Fetches the current reviews of a movie from an external site.
#[async_trait]
pub trait ReviewScraper: Send + Sync {
    async fn fetch_reviews(&self, movie: &Movie) -> error::Result<Vec<Review>>;
}

/// Sends a prompt to a language model and returns its raw answer.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> error::Result<String>;
}

pub(crate) fn build_http_client(timeout: Duration) -> error::Result<Client> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
        .map_err(ClientError::Build)
}

pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
