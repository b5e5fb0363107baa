use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, ScoredMovie},
};

use super::model::Model;

/// Number of movies returned by every ranked query
pub const RESULT_LIMIT: usize = 10;

/// Read-only queries over a loaded model.
///
/// Sorting always happens on freshly built local vectors; the model is never
/// mutated.
pub struct Recommender<'a> {
    model: &'a Model,
}

impl<'a> Recommender<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// All non-blank titles in corpus order
    pub fn titles(&self) -> Vec<String> {
        self.model
            .movies()
            .iter()
            .filter(|m| !m.title.trim().is_empty())
            .map(|m| m.title.clone())
            .collect()
    }

    /// Row index of the first movie whose title matches case-insensitively
    pub fn find_by_title(&self, title: &str) -> AppResult<usize> {
        let wanted = title.to_lowercase();
        self.model
            .movies()
            .iter()
            .position(|m| m.title.to_lowercase() == wanted)
            .ok_or_else(|| AppError::NotFound(format!("Movie '{}' not found", title)))
    }

    /// The `limit` movies most similar to `title`, excluding the movie itself
    pub fn recommend(&self, title: &str, limit: usize) -> AppResult<Vec<ScoredMovie>> {
        let title = require_param("title", title)?;
        let index = self.find_by_title(title)?;
        self.recommend_by_index(index, limit)
    }

    pub fn recommend_by_index(&self, index: usize, limit: usize) -> AppResult<Vec<ScoredMovie>> {
        let ranked = self.rank_similar(index, limit)?;
        Ok(ranked
            .into_iter()
            .map(|(row, score)| ScoredMovie {
                movie: self.model.movies()[row].clone(),
                score: Some(score),
            })
            .collect())
    }

    /// `(row, score)` pairs ordered by score descending, then row ascending
    pub fn rank_similar(&self, index: usize, limit: usize) -> AppResult<Vec<(usize, f32)>> {
        if index >= self.model.len() {
            return Err(AppError::NotFound(format!(
                "No movie at row {} (corpus has {})",
                index,
                self.model.len()
            )));
        }

        let mut scores: Vec<(usize, f32)> = self
            .model
            .similarity()
            .row(index)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(row, _)| row != index)
            .collect();

        // Stable: equal scores keep corpus order
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores.truncate(limit);
        Ok(scores)
    }

    /// Movies whose genres contain `genre` (case-insensitive), best rated first
    pub fn by_genre(&self, genre: &str, limit: usize) -> AppResult<Vec<ScoredMovie>> {
        let genre = require_param("genre", genre)?.to_lowercase();
        let matches: Vec<&Movie> = self
            .model
            .movies()
            .iter()
            .filter(|m| m.genres.to_lowercase().contains(&genre))
            .collect();
        Ok(top_rated(matches, limit))
    }

    /// The best rated movies of the whole catalog
    pub fn trending(&self, limit: usize) -> Vec<ScoredMovie> {
        top_rated(self.model.movies().iter().collect(), limit)
    }
}

/// Trims a required query parameter, rejecting it when blank
pub fn require_param<'p>(name: &str, value: &'p str) -> AppResult<&'p str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{} parameter is required",
            capitalize(name)
        )));
    }
    Ok(value)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn top_rated(mut movies: Vec<&Movie>, limit: usize) -> Vec<ScoredMovie> {
    movies.sort_by(|a, b| by_rating_desc(a, b));
    movies
        .into_iter()
        .take(limit)
        .cloned()
        .map(ScoredMovie::unscored)
        .collect()
}

fn by_rating_desc(a: &Movie, b: &Movie) -> Ordering {
    b.vote_average.total_cmp(&a.vote_average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::similarity::{FieldVectorizers, SimilarityMatrix};

    fn movie(id: i64, title: &str, genres: &str, vote_average: f64) -> Movie {
        Movie {
            movie_id: id,
            title: title.to_string(),
            genres: genres.to_string(),
            cast: String::new(),
            overview: String::new(),
            vote_average,
            runtime: None,
        }
    }

    fn model_with(movies: Vec<Movie>, rows: Vec<Vec<f32>>) -> Model {
        let vectorizers = FieldVectorizers::fit(&movies);
        Model::from_parts(movies, SimilarityMatrix::from_rows(rows).unwrap(), vectorizers).unwrap()
    }

    fn scenario() -> Model {
        model_with(
            vec![
                movie(1, "Alpha", "Action", 8.0),
                movie(2, "Beta", "Action", 6.0),
                movie(3, "Gamma", "Drama", 9.0),
            ],
            vec![
                vec![1.0, 0.8, 0.1],
                vec![0.8, 1.0, 0.2],
                vec![0.1, 0.2, 1.0],
            ],
        )
    }

    fn titles(results: &[ScoredMovie]) -> Vec<&str> {
        results.iter().map(|r| r.movie.title.as_str()).collect()
    }

    #[test]
    fn test_genre_filter_sorted_by_rating() {
        let model = scenario();
        let results = Recommender::new(&model).by_genre("Action", RESULT_LIMIT).unwrap();
        assert_eq!(titles(&results), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_genre_filter_is_case_insensitive_substring() {
        let model = scenario();
        let results = Recommender::new(&model).by_genre("  act ", RESULT_LIMIT).unwrap();
        assert_eq!(titles(&results), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_trending() {
        let model = scenario();
        let results = Recommender::new(&model).trending(RESULT_LIMIT);
        assert_eq!(titles(&results), vec!["Gamma", "Alpha", "Beta"]);
        assert!(results.iter().all(|r| r.score.is_none()));
    }

    #[test]
    fn test_recommend_excludes_self_and_ranks_by_score() {
        let model = scenario();
        let results = Recommender::new(&model).recommend("alpha", RESULT_LIMIT).unwrap();
        assert_eq!(titles(&results), vec!["Beta", "Gamma"]);
        assert_eq!(results[0].score, Some(0.8));
        assert_eq!(results[1].score, Some(0.1));
    }

    #[test]
    fn test_recommend_unknown_title() {
        let model = scenario();
        let result = Recommender::new(&model).recommend("NoSuchMovie", RESULT_LIMIT);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_blank_parameters_are_rejected() {
        let model = scenario();
        let recommender = Recommender::new(&model);
        assert!(matches!(recommender.by_genre("  ", 10), Err(AppError::InvalidInput(_))));
        assert!(matches!(recommender.recommend("", 10), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_duplicate_title_resolves_to_first_row() {
        let model = model_with(
            vec![
                movie(1, "Twin", "Drama", 5.0),
                movie(2, "TWIN", "Drama", 5.0),
                movie(3, "Other", "Drama", 5.0),
            ],
            vec![
                vec![1.0, 1.0, 0.5],
                vec![1.0, 1.0, 0.5],
                vec![0.5, 0.5, 1.0],
            ],
        );
        let recommender = Recommender::new(&model);
        assert_eq!(recommender.find_by_title("twin").unwrap(), 0);
        // The twin ties with self but self is still excluded
        let results = recommender.recommend("twin", 10).unwrap();
        assert_eq!(results[0].movie.movie_id, 2);
        assert!(results.iter().all(|r| r.movie.movie_id != 1));
    }

    #[test]
    fn test_ties_keep_corpus_order_and_limit_applies() {
        let movies: Vec<Movie> = (0..15)
            .map(|i| movie(i, &format!("M{}", i), "Drama", 7.0))
            .collect();
        let rows: Vec<Vec<f32>> = (0..15)
            .map(|i| (0..15).map(|j| if i == j { 1.0 } else { 0.3 }).collect())
            .collect();
        let model = model_with(movies, rows);
        let recommender = Recommender::new(&model);

        let ranked = recommender.rank_similar(4, RESULT_LIMIT).unwrap();
        let rows: Vec<usize> = ranked.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3, 5, 6, 7, 8, 9, 10]);

        let trending = recommender.trending(RESULT_LIMIT);
        let ids: Vec<i64> = trending.iter().map(|r| r.movie.movie_id).collect();
        assert_eq!(ids, (0..10).collect::<Vec<i64>>());
    }

    #[test]
    fn test_out_of_range_row_is_not_found() {
        let model = scenario();
        let recommender = Recommender::new(&model);
        assert!(matches!(recommender.rank_similar(3, 10), Err(AppError::NotFound(_))));
        assert!(matches!(recommender.recommend_by_index(99, 10), Err(AppError::NotFound(_))));
        assert_eq!(recommender.recommend_by_index(2, 10).unwrap().len(), 2);
    }

    #[test]
    fn test_titles_skip_blank() {
        let model = model_with(
            vec![movie(1, "Alpha", "", 1.0), movie(2, " ", "", 1.0)],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        );
        assert_eq!(Recommender::new(&model).titles(), vec!["Alpha".to_string()]);
    }
}
