//! Dataset loading abstraction
//!
//! The engine consumes validated movies and ratings; where they come from is a
//! loader concern. `FileDatasetLoader` reads MovieLens-style files from disk.

use crate::{
    error::AppResult,
    models::{Movie, Rating},
};

pub mod files;

pub use files::FileDatasetLoader;

/// Source of the movie catalog and the rating dataset
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DatasetLoader: Send + Sync {
    /// Load every movie, in catalog order
    async fn load_movies(&self) -> AppResult<Vec<Movie>>;

    /// Load every rating event
    async fn load_ratings(&self) -> AppResult<Vec<Rating>>;

    /// Loader name for logging and debugging
    fn name(&self) -> &'static str;
}
