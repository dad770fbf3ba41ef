use thiserror::Error;

/// Errors from the external HTTP collaborators.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Movie '{0}' has no IMDB id")]
    MissingImdbId(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
