use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

use super::vectorizer::{SparseVector, TfIdfVectorizer};

/// Weights applied to the per-field similarities; they sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityWeights {
    pub overview: f64,
    pub genres: f64,
    pub cast: f64,
}

impl SimilarityWeights {
    pub const DEFAULT: SimilarityWeights = SimilarityWeights {
        overview: 0.1,
        genres: 0.6,
        cast: 0.3,
    };

    pub fn total(&self) -> f64 {
        self.overview + self.genres + self.cast
    }
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Dense, row-major `dim × dim` similarity matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct SimilarityMatrix {
    dim: usize,
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct RawMatrix {
    dim: usize,
    values: Vec<f32>,
}

impl TryFrom<RawMatrix> for SimilarityMatrix {
    type Error = String;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        if raw.dim.checked_mul(raw.dim) != Some(raw.values.len()) {
            return Err(format!(
                "similarity matrix holds {} values, expected {}x{}",
                raw.values.len(),
                raw.dim,
                raw.dim
            ));
        }
        Ok(Self {
            dim: raw.dim,
            values: raw.values,
        })
    }
}

impl SimilarityMatrix {
    fn zeros(dim: usize) -> Self {
        Self {
            dim,
            values: vec![0.0; dim * dim],
        }
    }

    /// Builds a matrix from explicit rows; every row must be `rows.len()` long
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let dim = rows.len();
        if let Some(bad) = rows.iter().position(|row| row.len() != dim) {
            return Err(AppError::ModelInconsistency(format!(
                "row {} has {} columns, expected {}",
                bad,
                rows[bad].len(),
                dim
            )));
        }
        Ok(Self {
            dim,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.dim + j]
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    fn add_symmetric(&mut self, i: usize, j: usize, value: f32) {
        self.values[i * self.dim + j] += value;
        self.values[j * self.dim + i] += value;
    }

    /// Adds `weight` times the pairwise cosine of `vectors` into every cell.
    ///
    /// Vectors must be L2-normalized and one per row. Uses an inverted index so
    /// only pairs sharing a term are touched; no per-field matrix is kept.
    pub fn accumulate_cosine(&mut self, weight: f64, vectors: &[SparseVector]) -> AppResult<()> {
        let n = self.dim;
        if vectors.len() != n {
            return Err(AppError::ModelInconsistency(format!(
                "{} vectors cannot update a {}x{} similarity matrix",
                vectors.len(),
                n,
                n
            )));
        }

        let mut postings: HashMap<u32, Vec<(usize, f32)>> = HashMap::new();
        for (doc, vector) in vectors.iter().enumerate() {
            for &(term, w) in vector.entries() {
                postings.entry(term).or_default().push((doc, w));
            }
        }

        let mut scratch = vec![0.0f32; n];
        for (i, vector) in vectors.iter().enumerate() {
            if vector.is_zero() {
                continue;
            }
            for &(term, w) in vector.entries() {
                for &(j, other) in &postings[&term] {
                    // Upper triangle only; mirrored on write
                    if j > i {
                        scratch[j] += w * other;
                    }
                }
            }
            for j in (i + 1)..n {
                if scratch[j] != 0.0 {
                    let cosine = f64::from(scratch[j].clamp(0.0, 1.0));
                    self.add_symmetric(i, j, (weight * cosine) as f32);
                    scratch[j] = 0.0;
                }
            }
            self.values[i * n + i] += weight as f32;
        }
        Ok(())
    }

    fn clamp_unit(&mut self) {
        for value in self.values.iter_mut() {
            *value = value.clamp(0.0, 1.0);
        }
    }
}

/// Full pairwise cosine similarity of L2-normalized vectors
pub fn cosine_similarity(vectors: &[SparseVector]) -> SimilarityMatrix {
    let mut matrix = SimilarityMatrix::zeros(vectors.len());
    // One vector per row by construction
    let _ = matrix.accumulate_cosine(1.0, vectors);
    matrix.clamp_unit();
    matrix
}

/// The fitted vectorizers of the three catalog fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVectorizers {
    pub overview: TfIdfVectorizer,
    pub genres: TfIdfVectorizer,
    pub cast: TfIdfVectorizer,
}

impl FieldVectorizers {
    pub fn fit(corpus: &[Movie]) -> Self {
        Self::fit_transform(corpus).0
    }

    fn fit_transform(corpus: &[Movie]) -> (Self, [Vec<SparseVector>; 3]) {
        let overviews: Vec<&str> = corpus.iter().map(|m| m.overview.as_str()).collect();
        let genres: Vec<&str> = corpus.iter().map(|m| m.genres.as_str()).collect();
        let cast: Vec<&str> = corpus.iter().map(|m| m.cast.as_str()).collect();

        let (overview_vec, overview_docs) = TfIdfVectorizer::fit_transform(&overviews);
        let (genres_vec, genre_docs) = TfIdfVectorizer::fit_transform(&genres);
        let (cast_vec, cast_docs) = TfIdfVectorizer::fit_transform(&cast);

        (
            Self {
                overview: overview_vec,
                genres: genres_vec,
                cast: cast_vec,
            },
            [overview_docs, genre_docs, cast_docs],
        )
    }
}

/// Vectorizes the three fields of the corpus and combines their similarities
pub fn compose(
    corpus: &[Movie],
    weights: SimilarityWeights,
) -> AppResult<(FieldVectorizers, SimilarityMatrix)> {
    if corpus.is_empty() {
        return Err(AppError::EmptyCorpus);
    }

    let (vectorizers, [overview_docs, genre_docs, cast_docs]) =
        FieldVectorizers::fit_transform(corpus);

    tracing::info!(
        movies = corpus.len(),
        overview_terms = vectorizers.overview.vocabulary_size(),
        genre_terms = vectorizers.genres.vocabulary_size(),
        cast_terms = vectorizers.cast.vocabulary_size(),
        "Fitted field vectorizers"
    );

    let mut combined = SimilarityMatrix::zeros(corpus.len());
    combined.accumulate_cosine(weights.overview, &overview_docs)?;
    combined.accumulate_cosine(weights.genres, &genre_docs)?;
    combined.accumulate_cosine(weights.cast, &cast_docs)?;
    combined.clamp_unit();

    tracing::info!(dim = combined.dim(), "Combined similarity matrix built");
    Ok((vectorizers, combined))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64, genres: &str, cast: &str, overview: &str) -> Movie {
        Movie {
            movie_id: id,
            title: format!("Movie {}", id),
            genres: genres.to_string(),
            cast: cast.to_string(),
            overview: overview.to_string(),
            vote_average: 5.0,
            runtime: None,
        }
    }

    fn sample_corpus() -> Vec<Movie> {
        vec![
            movie(1, "Action Adventure", "Tom Hardy", "A soldier fights in a war"),
            movie(2, "Action Thriller", "Tom Cruise", "A spy fights a war of secrets"),
            movie(3, "Romance Drama", "Emma Stone", "Two lovers meet in Paris"),
            movie(4, "", "", ""),
            movie(5, "Action Adventure", "Tom Hardy", "A soldier fights in a war"),
        ]
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert_eq!(SimilarityWeights::DEFAULT.total(), 1.0);
    }

    #[test]
    fn test_empty_corpus_fails() {
        let result = compose(&[], SimilarityWeights::DEFAULT);
        assert!(matches!(result, Err(AppError::EmptyCorpus)));
    }

    #[test]
    fn test_combined_matrix_is_square_symmetric_and_bounded() {
        let corpus = sample_corpus();
        let (_, matrix) = compose(&corpus, SimilarityWeights::DEFAULT).unwrap();

        assert_eq!(matrix.dim(), corpus.len());
        for i in 0..matrix.dim() {
            for j in 0..matrix.dim() {
                let value = matrix.get(i, j);
                assert!((0.0..=1.0).contains(&value));
                assert_eq!(value, matrix.get(j, i));
            }
        }
    }

    #[test]
    fn test_diagonal_is_row_maximum() {
        let (_, matrix) = compose(&sample_corpus(), SimilarityWeights::DEFAULT).unwrap();
        for i in 0..matrix.dim() {
            let max = matrix.row(i).iter().cloned().fold(f32::MIN, f32::max);
            assert_eq!(matrix.get(i, i), max);
        }
    }

    #[test]
    fn test_single_movie_corpus() {
        let (_, matrix) = compose(&[movie(1, "Drama", "", "")], SimilarityWeights::DEFAULT).unwrap();
        assert_eq!(matrix.dim(), 1);
        assert!((matrix.get(0, 0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_genre_overlap_dominates() {
        let (_, matrix) = compose(&sample_corpus(), SimilarityWeights::DEFAULT).unwrap();
        // Shared genre ranks above unrelated genre
        assert!(matrix.get(0, 1) > matrix.get(0, 2));
        // Identical content matches perfectly
        assert!((matrix.get(0, 4) - 1.0).abs() < 1e-5);
        // Empty fields are orthogonal to everything
        assert_eq!(matrix.get(3, 0), 0.0);
        assert_eq!(matrix.get(3, 3), 0.0);
    }

    #[test]
    fn test_accumulated_cosine_matches_weighted_field_matrices() {
        let fields = [
            (0.1, vec!["war soldier", "war spy", "love paris"]),
            (0.6, vec!["action", "action thriller", "romance"]),
            (0.3, vec!["hardy", "cruise", "stone"]),
        ];

        let mut combined = SimilarityMatrix::zeros(3);
        let mut expected = vec![0.0f64; 9];
        for (weight, docs) in &fields {
            let (_, vectors) = TfIdfVectorizer::fit_transform(docs);
            let field = cosine_similarity(&vectors);
            for (cell, value) in expected.iter_mut().enumerate() {
                *value += weight * f64::from(field.values[cell]);
            }
            combined.accumulate_cosine(*weight, &vectors).unwrap();
        }
        combined.clamp_unit();

        for (cell, value) in expected.iter().enumerate() {
            assert!((f64::from(combined.values[cell]) - value).abs() < 1e-6);
        }
        assert!((combined.get(0, 0) - 1.0).abs() < 1e-6);
        assert_eq!(combined.get(0, 2), 0.0);
    }

    #[test]
    fn test_accumulate_rejects_wrong_vector_count() {
        let (_, vectors) = TfIdfVectorizer::fit_transform(&["drama", "comedy"]);
        let mut matrix = SimilarityMatrix::zeros(3);
        let result = matrix.accumulate_cosine(1.0, &vectors);
        assert!(matches!(result, Err(AppError::ModelInconsistency(_))));
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let result = SimilarityMatrix::from_rows(vec![vec![1.0, 0.0], vec![1.0]]);
        assert!(matches!(result, Err(AppError::ModelInconsistency(_))));
    }

    #[test]
    fn test_deserialize_rejects_wrong_value_count() {
        let json = r#"{"dim": 2, "values": [1.0, 0.0, 0.0]}"#;
        assert!(serde_json::from_str::<SimilarityMatrix>(json).is_err());
    }
}
