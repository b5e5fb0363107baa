use serde::{Deserialize, Deserializer, Serialize};

pub mod movie;

pub use movie::{Movie, ScoredMovie};

// ============================================================================
// Catalog Export Types
// ============================================================================

/// One row of the TMDB movies export
#[derive(Debug, Clone, Deserialize)]
pub struct RawMovieRow {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    /// Serialized list of `{"id": .., "name": ..}` objects
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub runtime: Option<f64>,
}

/// Reads an optional number cell: blank is `None`, anything else must parse
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number '{}': {}", value, e))),
    }
}

/// One row of the TMDB credits export
#[derive(Debug, Clone, Deserialize)]
pub struct RawCreditsRow {
    pub movie_id: i64,
    /// Serialized list of cast members in billing order
    #[serde(default)]
    pub cast: Option<String>,
}

/// A movies row joined with its credits row, before normalization
#[derive(Debug, Clone)]
pub struct RawMovieRecord {
    pub movie: RawMovieRow,
    pub cast: Option<String>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Subset of the TMDB `/3/movie/{id}` response used for display
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Artwork {
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

// ============================================================================
// API Response Types
// ============================================================================

/// A movie returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieResponse {
    pub movie_id: i64,
    pub title: String,
    pub genres: String,
    pub cast: String,
    pub vote_average: f64,
    pub overview: String,
    pub runtime: Option<f64>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// Similarity to the queried movie as a percentage (recommendations only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl MovieResponse {
    pub fn new(scored: &ScoredMovie, artwork: Artwork) -> Self {
        let movie = &scored.movie;
        Self {
            movie_id: movie.movie_id,
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            cast: movie.cast.clone(),
            vote_average: movie.vote_average,
            overview: movie.overview.clone(),
            runtime: movie.runtime,
            poster_path: artwork.poster_path,
            backdrop_path: artwork.backdrop_path,
            similarity_score: scored.score.map(|s| f64::from(s) * 100.0),
        }
    }
}
