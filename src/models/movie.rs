use serde::{Deserialize, Serialize};

/// A normalized catalog entry.
///
/// Its position in the corpus is its row index in every model artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Stable TMDB identifier
    pub movie_id: i64,
    pub title: String,
    /// Space-joined genre names in source order
    pub genres: String,
    /// Space-joined names of the top-billed cast
    pub cast: String,
    pub overview: String,
    pub vote_average: f64,
    pub runtime: Option<f64>,
}

/// A movie selected by a query, with its similarity when the query ranks by it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMovie {
    pub movie: Movie,
    pub score: Option<f32>,
}

impl ScoredMovie {
    pub fn unscored(movie: Movie) -> Self {
        Self { movie, score: None }
    }
}
