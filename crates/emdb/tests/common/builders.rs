//! Builders for catalogue records.

#![allow(dead_code)]

use emdb::catalogue::{Movie, Review, ReviewSource, Titles};

/// Builder for creating `Movie` instances.
pub struct MovieBuilder {
    movie: Movie,
}

impl MovieBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            movie: Movie {
                id: id.to_string(),
                imdb_id: format!("tt{:07}", id.len() * 1000 + 1),
                title: format!("Movie {}", id),
                year: 1999,
                ..Default::default()
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.movie.title = title.to_string();
        self
    }

    pub fn english_title(mut self, title: &str) -> Self {
        self.movie.english_title = title.to_string();
        self
    }

    pub fn imdb_id(mut self, imdb_id: &str) -> Self {
        self.movie.imdb_id = imdb_id.to_string();
        self
    }

    pub fn build(self) -> Movie {
        self.movie
    }
}

/// Builder for creating `Review` instances.
pub struct ReviewBuilder {
    review: Review,
}

impl ReviewBuilder {
    pub fn new(id: &str, movie_id: &str) -> Self {
        Self {
            review: Review {
                id: id.to_string(),
                movie_id: movie_id.to_string(),
                source: ReviewSource::Imdb,
                url: format!("https://www.imdb.com/review/{}/", id),
                review: format!("Review {} of {}.", id, movie_id),
                ..Default::default()
            },
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.review.review = text.to_string();
        self
    }

    pub fn rating(mut self, rating: i32) -> Self {
        self.review.movie_rating = rating;
        self
    }

    pub fn titles(mut self, titles: Titles) -> Self {
        self.review.titles = titles;
        self
    }

    pub fn build(self) -> Review {
        self.review
    }
}
