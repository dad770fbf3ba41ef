//! Movie catalogue records and the storage contracts the worker needs.

use thiserror::Error;

use crate::db::DatabaseError;

pub mod movie;
pub mod review;

pub use movie::Movie;
pub use review::{Review, ReviewSource, Titles};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read and write access to movies.
pub trait MovieRepository: Send + Sync {
    fn find_one(&self, id: &str) -> Result<Option<Movie>, StoreError>;
    fn find_all(&self) -> Result<Vec<Movie>, StoreError>;
    /// Inserts or replaces a movie.
    fn store(&self, movie: &Movie) -> Result<(), StoreError>;
}

/// Read and write access to reviews.
pub trait ReviewRepository: Send + Sync {
    fn find_one(&self, id: &str) -> Result<Option<Review>, StoreError>;
    fn find_all(&self) -> Result<Vec<Review>, StoreError>;
    fn find_by_movie_id(&self, movie_id: &str) -> Result<Vec<Review>, StoreError>;
    /// Inserts or replaces a review.
    fn store(&self, review: &Review) -> Result<(), StoreError>;
    /// Updates only the mentioned titles of an existing review. Returns
    /// `false` when the review no longer exists; nothing is inserted.
    fn store_titles(&self, review_id: &str, titles: &Titles) -> Result<bool, StoreError>;
    /// Deletes all reviews of a movie, returning how many were removed.
    fn delete_by_movie_id(&self, movie_id: &str) -> Result<usize, StoreError>;
}
