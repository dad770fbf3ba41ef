//! The closed set of job actions and the worker categories they belong to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::QueueError;

/// Every kind of work the queue accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Re-scrape the reviews of one movie.
    RefreshReviews,
    /// Fan out one `RefreshReviews` job per movie.
    RefreshAllReviews,
    /// Ask the language model which other titles a review mentions.
    FindTitles,
    /// Fan out one `FindTitles` job per review.
    FindAllTitles,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::RefreshReviews,
        Action::RefreshAllReviews,
        Action::FindTitles,
        Action::FindAllTitles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::RefreshReviews => "refresh-reviews",
            Action::RefreshAllReviews => "refresh-all-reviews",
            Action::FindTitles => "find-titles",
            Action::FindAllTitles => "find-all-titles",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Action::FindTitles => Category::Ai,
            Action::RefreshReviews | Action::RefreshAllReviews | Action::FindAllTitles => {
                Category::Simple
            }
        }
    }

    /// Fan-out actions ignore their subject.
    pub fn is_fan_out(&self) -> bool {
        matches!(self, Action::RefreshAllReviews | Action::FindAllTitles)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Action {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| QueueError::InvalidAction(s.to_string()))
    }
}

/// Worker categories. A worker claims only jobs whose action falls in one
/// of its categories, so slow language-model calls never hold up scraping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Simple,
    Ai,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Simple => "simple",
            Category::Ai => "ai",
        }
    }

    pub fn actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| a.category() == *self)
            .collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Category::Simple),
            "ai" => Ok(Category::Ai),
            other => Err(QueueError::InvalidCategory(other.to_string())),
        }
    }
}
