//! Poster artwork providers.
//!
//! The recommendation endpoints attach artwork to every movie they return.
//! Lookups go through [`PosterProvider`] so the source can be swapped (or
//! mocked in tests) without touching the handlers.

use crate::{error::AppResult, models::Artwork};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Fetch poster and backdrop paths for a movie id
    ///
    /// Any failure (transport, non-success status, malformed body) is an error;
    /// callers decide whether to drop the movie.
    async fn fetch_artwork(&self, movie_id: i64) -> AppResult<Artwork>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
