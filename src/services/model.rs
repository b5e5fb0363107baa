use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

use super::similarity::{compose, FieldVectorizers, SimilarityMatrix, SimilarityWeights};

/// The corpus, its combined similarity matrix and the fitted vectorizers.
///
/// Row `i` of the corpus is row and column `i` of the matrix and document `i`
/// of every vectorizer. The only constructors check this, so a misaligned
/// model cannot exist.
#[derive(Debug, Clone)]
pub struct Model {
    movies: Vec<Movie>,
    similarity: SimilarityMatrix,
    vectorizers: FieldVectorizers,
}

impl Model {
    /// Builds a model from scratch out of a normalized corpus
    pub fn build(movies: Vec<Movie>) -> AppResult<Self> {
        let (vectorizers, similarity) = compose(&movies, SimilarityWeights::DEFAULT)?;
        Self::from_parts(movies, similarity, vectorizers)
    }

    /// Assembles a model from separately produced parts, checking index alignment
    pub fn from_parts(
        movies: Vec<Movie>,
        similarity: SimilarityMatrix,
        vectorizers: FieldVectorizers,
    ) -> AppResult<Self> {
        let rows = movies.len();
        if similarity.dim() != rows {
            return Err(AppError::ModelInconsistency(format!(
                "corpus has {} movies but the similarity matrix is {}x{}",
                rows,
                similarity.dim(),
                similarity.dim()
            )));
        }

        for (field, vectorizer) in [
            ("overview", &vectorizers.overview),
            ("genres", &vectorizers.genres),
            ("cast", &vectorizers.cast),
        ] {
            if vectorizer.document_count() != rows {
                return Err(AppError::ModelInconsistency(format!(
                    "{} vectorizer was fitted on {} documents, corpus has {}",
                    field,
                    vectorizer.document_count(),
                    rows
                )));
            }
        }

        Ok(Self {
            movies,
            similarity,
            vectorizers,
        })
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn vectorizers(&self) -> &FieldVectorizers {
        &self.vectorizers
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
