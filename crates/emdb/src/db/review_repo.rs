//! SQLite-backed review store. Mentioned titles are kept as a JSON column.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};
use crate::catalogue::{Review, ReviewRepository, StoreError, Titles};

const COLUMNS: &str = "id, movie_id, source, url, review, movie_rating, quality, mentioned_titles";

/// A raw review row; source and titles are decoded afterwards so their
/// errors can be reported with the column name.
struct ReviewRow {
    id: String,
    movie_id: String,
    source: String,
    url: String,
    review: String,
    movie_rating: i32,
    quality: i32,
    mentioned_titles: String,
}

impl ReviewRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            movie_id: row.get("movie_id")?,
            source: row.get("source")?,
            url: row.get("url")?,
            review: row.get("review")?,
            movie_rating: row.get("movie_rating")?,
            quality: row.get("quality")?,
            mentioned_titles: row.get("mentioned_titles")?,
        })
    }

    fn into_review(self) -> Result<Review, DatabaseError> {
        let titles: Titles = if self.mentioned_titles.trim().is_empty() {
            Titles::default()
        } else {
            serde_json::from_str(&self.mentioned_titles).map_err(|e| DatabaseError::Json {
                column: "mentioned_titles",
                source: e,
            })?
        };
        let source = self.source.parse().unwrap_or_else(|e: String| {
            log::warn!("Review {}: {}, assuming imdb", self.id, e);
            Default::default()
        });
        Ok(Review {
            id: self.id,
            movie_id: self.movie_id,
            source,
            url: self.url,
            review: self.review,
            movie_rating: self.movie_rating,
            quality: self.quality,
            titles,
        })
    }
}

#[derive(Clone)]
pub struct SqliteReviewRepository {
    db: Database,
}

impl SqliteReviewRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn query(&self, sql: &str, arg: Option<&str>) -> Result<Vec<Review>, StoreError> {
        let reviews = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = match arg {
                Some(arg) => stmt.query_map(params![arg], ReviewRow::from_row)?,
                None => stmt.query_map([], ReviewRow::from_row)?,
            }
            .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(ReviewRow::into_review).collect()
        })?;
        Ok(reviews)
    }
}

impl ReviewRepository for SqliteReviewRepository {
    fn find_one(&self, id: &str) -> Result<Option<Review>, StoreError> {
        let review = self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM review WHERE id = ?1", COLUMNS),
                params![id],
                ReviewRow::from_row,
            )
            .optional()?
            .map(ReviewRow::into_review)
            .transpose()
        })?;
        Ok(review)
    }

    fn find_all(&self) -> Result<Vec<Review>, StoreError> {
        self.query(&format!("SELECT {} FROM review ORDER BY rowid", COLUMNS), None)
    }

    fn find_by_movie_id(&self, movie_id: &str) -> Result<Vec<Review>, StoreError> {
        self.query(
            &format!("SELECT {} FROM review WHERE movie_id = ?1 ORDER BY rowid", COLUMNS),
            Some(movie_id),
        )
    }

    fn store(&self, review: &Review) -> Result<(), StoreError> {
        let titles = serde_json::to_string(&review.titles).map_err(|e| DatabaseError::Json {
            column: "mentioned_titles",
            source: e,
        })?;
        self.db.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO review ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    COLUMNS
                ),
                params![
                    review.id,
                    review.movie_id,
                    review.source.as_str(),
                    review.url,
                    review.review,
                    review.movie_rating,
                    review.quality,
                    titles,
                ],
            )?;
            Ok(())
        })?;
        Ok(())
    }

    fn store_titles(&self, review_id: &str, titles: &Titles) -> Result<bool, StoreError> {
        let titles = serde_json::to_string(titles).map_err(|e| DatabaseError::Json {
            column: "mentioned_titles",
            source: e,
        })?;
        let changed = self.db.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE review SET mentioned_titles = ?2 WHERE id = ?1",
                params![review_id, titles],
            )?)
        })?;
        Ok(changed > 0)
    }

    fn delete_by_movie_id(&self, movie_id: &str) -> Result<usize, StoreError> {
        let removed = self.db.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM review WHERE movie_id = ?1", params![movie_id])?)
        })?;
        Ok(removed)
    }
}
