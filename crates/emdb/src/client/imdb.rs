//! IMDB user review scraper.
//!
//! The reviews page is parsed with a handful of regular expressions rather
//! than a DOM: every review sits in a `lister-item-content` block that ends
//! with a `Permalink` anchor, and only those two markers are relied upon.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use super::error::{ClientError, Result};
use super::{build_http_client, truncate_body, ReviewScraper};
use crate::catalogue::{Movie, Review, ReviewSource};

pub const DEFAULT_BASE_URL: &str = "https://www.imdb.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

static RE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div\b[^>]*\bclass="[^"]*\blister-item-content\b[^"]*"[^>]*>"#).unwrap()
});
static RE_PERMALINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\b[^>]*?\bhref="([^"]*)"[^>]*>\s*Permalink\s*</a>"#).unwrap()
});
static RE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_INDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s+").unwrap());
static RE_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_RATING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)/10\n").unwrap());

const FOOTER_PHRASES: [&str; 3] = ["Was this review helpful?", "Sign in to vote.", "Permalink"];

pub struct ImdbScraper {
    client: Client,
    base_url: String,
}

impl ImdbScraper {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReviewScraper for ImdbScraper {
    async fn fetch_reviews(&self, movie: &Movie) -> Result<Vec<Review>> {
        if movie.imdb_id.is_empty() {
            return Err(ClientError::MissingImdbId(movie.id.clone()));
        }

        let url = format!("{}/title/{}/reviews", self.base_url, movie.imdb_id);
        debug!(%url, movie_id = %movie.id, "Fetching reviews");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                url: url.clone(),
                source: e,
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                url,
                status,
                body: truncate_body(&body),
            });
        }

        let html = response.text().await.map_err(|e| ClientError::Http {
            url: url.clone(),
            source: e,
        })?;

        let reviews = parse_reviews(&html, movie, &self.base_url);
        info!(movie_id = %movie.id, count = reviews.len(), "Scraped reviews");
        Ok(reviews)
    }
}

/// Extracts the reviews of `movie` from a reviews page. Blocks without a
/// permalink are skipped.
pub fn parse_reviews(html: &str, movie: &Movie, base_url: &str) -> Vec<Review> {
    let starts: Vec<usize> = RE_BLOCK.find_iter(html).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(html.len());
            let block = &html[start..end];

            let permalink = RE_PERMALINK.captures(block)?.get(1)?.as_str();
            let (rating, text) = scrub_review(&html_to_text(block));

            Some(Review {
                id: uuid::Uuid::new_v4().to_string(),
                movie_id: movie.id.clone(),
                source: ReviewSource::Imdb,
                url: format!("{}{}", base_url, decode_entities(permalink)),
                review: text,
                movie_rating: rating,
                ..Default::default()
            })
        })
        .collect()
}

/// Cleans the visible text of a review block and pulls out the `N/10`
/// rating, which is 0 when the reviewer gave none.
pub fn scrub_review(review: &str) -> (i32, String) {
    let mut review = review.to_string();
    for phrase in FOOTER_PHRASES {
        review = review.replace(phrase, "");
    }

    let review = RE_INDENT.replace_all(&review, "\n");
    let mut review = RE_BLANK_LINES.replace_all(&review, "\n\n").into_owned();

    let mut rating = 0;
    if let Some(caps) = RE_RATING.captures(&review) {
        let matched = caps[0].to_string();
        rating = caps[1].parse().unwrap_or(0);
        review = review.replace(&matched, "");
    }

    (rating, review.trim().to_string())
}

fn html_to_text(html: &str) -> String {
    let with_breaks = RE_BREAK.replace_all(html, "\n");
    decode_entities(&RE_TAG.replace_all(&with_breaks, ""))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
