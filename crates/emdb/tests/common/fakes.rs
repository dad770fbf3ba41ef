//! In-process stand-ins for the external collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use emdb::catalogue::{Movie, MovieRepository, Review, ReviewRepository, StoreError, Titles};
use emdb::client::{ClientError, CompletionClient, ReviewScraper};

/// Scraper returning canned reviews per movie id.
#[derive(Default)]
pub struct FakeScraper {
    reviews: Mutex<HashMap<String, Vec<Review>>>,
    failing: Mutex<bool>,
    calls: AtomicUsize,
}

impl FakeScraper {
    pub fn set_reviews(&self, movie_id: &str, reviews: Vec<Review>) {
        self.reviews
            .lock()
            .unwrap()
            .insert(movie_id.to_string(), reviews);
    }

    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewScraper for FakeScraper {
    async fn fetch_reviews(&self, movie: &Movie) -> Result<Vec<Review>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.failing.lock().unwrap() {
            return Err(ClientError::Status {
                url: format!("https://www.imdb.com/title/{}/reviews", movie.imdb_id),
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(&movie.id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Completion client that always gives the same answer and records the
/// prompts it was sent.
pub struct FakeCompletion {
    answer: Mutex<Result<String, String>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeCompletion {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Mutex::new(Ok(answer.to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            answer: Mutex::new(Err(reason.to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, answer: &str) {
        *self.answer.lock().unwrap() = Ok(answer.to_string());
    }

    /// `(model, prompt)` pairs in call order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ClientError> {
        self.prompts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        match &*self.answer.lock().unwrap() {
            Ok(answer) => Ok(answer.clone()),
            Err(reason) => Err(ClientError::Decode {
                url: "http://localhost:11434/api/generate".to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Review store that delegates to another one but starts failing `store`
/// after a number of successful writes.
pub struct FlakyReviewStore {
    inner: Arc<dyn ReviewRepository>,
    stores_left: AtomicUsize,
}

impl FlakyReviewStore {
    pub fn new(inner: Arc<dyn ReviewRepository>, successful_stores: usize) -> Self {
        Self {
            inner,
            stores_left: AtomicUsize::new(successful_stores),
        }
    }
}

impl ReviewRepository for FlakyReviewStore {
    fn find_one(&self, id: &str) -> Result<Option<Review>, StoreError> {
        self.inner.find_one(id)
    }

    fn find_all(&self) -> Result<Vec<Review>, StoreError> {
        self.inner.find_all()
    }

    fn find_by_movie_id(&self, movie_id: &str) -> Result<Vec<Review>, StoreError> {
        self.inner.find_by_movie_id(movie_id)
    }

    fn store(&self, review: &Review) -> Result<(), StoreError> {
        let left = self.stores_left.load(Ordering::SeqCst);
        if left == 0 {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.stores_left.store(left - 1, Ordering::SeqCst);
        self.inner.store(review)
    }

    fn store_titles(&self, review_id: &str, titles: &Titles) -> Result<bool, StoreError> {
        self.inner.store_titles(review_id, titles)
    }

    fn delete_by_movie_id(&self, movie_id: &str) -> Result<usize, StoreError> {
        self.inner.delete_by_movie_id(movie_id)
    }
}

/// Movie store whose listing always fails.
pub struct UnlistableMovieStore {
    pub inner: Arc<dyn MovieRepository>,
}

impl MovieRepository for UnlistableMovieStore {
    fn find_one(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        self.inner.find_one(id)
    }

    fn find_all(&self) -> Result<Vec<Movie>, StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    fn store(&self, movie: &Movie) -> Result<(), StoreError> {
        self.inner.store(movie)
    }
}

/// Completion client that refreshes a movie's reviews while "thinking", the
/// way a concurrent `refresh-reviews` worker would.
pub struct RefreshingCompletion {
    pub reviews: Arc<dyn ReviewRepository>,
    pub movie_id: String,
    pub replacements: Vec<Review>,
    pub answer: String,
}

#[async_trait]
impl CompletionClient for RefreshingCompletion {
    async fn complete(&self, _model: &str, _prompt: &str) -> Result<String, ClientError> {
        self.reviews
            .delete_by_movie_id(&self.movie_id)
            .expect("Failed to delete reviews");
        for review in &self.replacements {
            self.reviews.store(review).expect("Failed to store review");
        }
        Ok(self.answer.clone())
    }
}
