//! Test harness for isolated worker runs.
//!
//! Each `TestHarness` owns a temp directory with its own SQLite file, real
//! SQLite movie and review stores on top of it, and fake network
//! collaborators.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use emdb::catalogue::{Movie, MovieRepository, Review, ReviewRepository};
use emdb::db::{Database, SqliteMovieRepository, SqliteReviewRepository};
use emdb::job::{Action, Category, JobQueue, JobRecord};
use emdb::worker::{Worker, WorkerContext};

use super::fakes::{FakeCompletion, FakeScraper};

pub const TEST_MODEL: &str = "mistral";

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
    pub queue: JobQueue,
    pub movies: Arc<SqliteMovieRepository>,
    pub reviews: Arc<SqliteReviewRepository>,
    pub scraper: Arc<FakeScraper>,
    pub completion: Arc<FakeCompletion>,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("emdb.db");
        let db = Database::open(&db_path).expect("Failed to open test database");

        Self {
            queue: JobQueue::new(db.clone()),
            movies: Arc::new(SqliteMovieRepository::new(db.clone())),
            reviews: Arc::new(SqliteReviewRepository::new(db.clone())),
            scraper: Arc::new(FakeScraper::default()),
            completion: Arc::new(FakeCompletion::answering("[]")),
            db,
            db_path,
            temp_dir,
        }
    }

    /// A separate connection to the same file, as another worker process
    /// would have.
    pub fn open_second_handle(&self) -> Database {
        Database::open(&self.db_path).expect("Failed to open second handle")
    }

    pub fn context(&self) -> WorkerContext {
        WorkerContext {
            queue: self.queue.clone(),
            movies: self.movies.clone(),
            reviews: self.reviews.clone(),
            scraper: self.scraper.clone(),
            completion: self.completion.clone(),
            model: TEST_MODEL.to_string(),
        }
    }

    pub fn worker(&self, categories: &[Category]) -> Worker {
        Worker::new(self.context(), categories.to_vec())
            .with_poll_interval(Duration::from_millis(10))
    }

    /// A worker that takes every category.
    pub fn any_worker(&self) -> Worker {
        self.worker(&[Category::Simple, Category::Ai])
    }

    pub fn add_movie(&self, movie: Movie) -> Movie {
        self.movies.store(&movie).expect("Failed to store movie");
        movie
    }

    pub fn add_review(&self, review: Review) -> Review {
        self.reviews.store(&review).expect("Failed to store review");
        review
    }

    pub fn jobs(&self) -> Vec<JobRecord> {
        self.queue.list().expect("Failed to list jobs")
    }

    /// Jobs with the given action, oldest first.
    pub fn jobs_for(&self, action: Action) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self
            .jobs()
            .into_iter()
            .filter(|j| j.action == action.as_str())
            .collect();
        jobs.sort_by_key(|j| j.id);
        jobs
    }
}
