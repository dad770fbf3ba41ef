//! Shared test utilities for emdb integration tests.
//!
//! This module provides:
//! - `TestHarness` with a temp-dir database and fake collaborators
//! - Fake scraper, completion client and failing stores
//! - Builders for movies and reviews
//! - A one-shot HTTP stub server for the real clients

pub mod builders;
pub mod fakes;
pub mod harness;
pub mod http;

pub use builders::*;
pub use fakes::*;
pub use harness::TestHarness;
