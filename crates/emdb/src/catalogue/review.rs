use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a review was scraped from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    #[default]
    Imdb,
}

impl ReviewSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewSource::Imdb => "imdb",
        }
    }
}

impl fmt::Display for ReviewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for ReviewSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imdb" => Ok(ReviewSource::Imdb),
            _ => Err(format!("Invalid review source: {}", s)),
        }
    }
}

/// Other titles a review mentions, as found by the language model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Titles {
    #[serde(default)]
    pub movies: Vec<String>,
    #[serde(default)]
    pub tv_shows: Vec<String>,
    #[serde(default)]
    pub games: Vec<String>,
    #[serde(default)]
    pub books: Vec<String>,
}

impl Titles {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
            && self.tv_shows.is_empty()
            && self.games.is_empty()
            && self.books.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub movie_id: String,
    pub source: ReviewSource,
    pub url: String,
    pub review: String,
    /// Rating the reviewer gave the movie, 0 to 10, 0 when absent.
    pub movie_rating: i32,
    /// Operator score of the review itself, 0 when unrated.
    pub quality: i32,
    pub titles: Titles,
}
