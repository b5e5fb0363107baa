use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::{
    error::AppResult,
    models::{RawCreditsRow, RawMovieRecord, RawMovieRow},
};

/// Reads the movies and credits exports from disk and joins them
pub fn read_catalog(movies_path: &Path, credits_path: &Path) -> AppResult<Vec<RawMovieRecord>> {
    tracing::info!(
        movies = %movies_path.display(),
        credits = %credits_path.display(),
        "Reading catalog exports"
    );

    let movies = read_rows::<RawMovieRow, _>(csv::Reader::from_path(movies_path)?)?;
    let credits = read_rows::<RawCreditsRow, _>(csv::Reader::from_path(credits_path)?)?;

    Ok(join_credits(movies, credits))
}

/// Reads both exports from arbitrary readers
pub fn read_catalog_from<M: Read, C: Read>(movies: M, credits: C) -> AppResult<Vec<RawMovieRecord>> {
    let movies = read_rows::<RawMovieRow, _>(csv::Reader::from_reader(movies))?;
    let credits = read_rows::<RawCreditsRow, _>(csv::Reader::from_reader(credits))?;
    Ok(join_credits(movies, credits))
}

fn read_rows<T, R>(mut reader: csv::Reader<R>) -> AppResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    R: Read,
{
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Inner join on the movie id, keeping the order of the movies export.
///
/// Movies without credits are dropped; a repeated credits id keeps its first row.
pub fn join_credits(movies: Vec<RawMovieRow>, credits: Vec<RawCreditsRow>) -> Vec<RawMovieRecord> {
    let movie_count = movies.len();
    let mut cast_by_id: HashMap<i64, Option<String>> = HashMap::with_capacity(credits.len());
    for row in credits {
        cast_by_id.entry(row.movie_id).or_insert(row.cast);
    }

    let records: Vec<RawMovieRecord> = movies
        .into_iter()
        .filter_map(|movie| {
            let cast = cast_by_id.get(&movie.id)?.clone();
            Some(RawMovieRecord { movie, cast })
        })
        .collect();

    if records.len() < movie_count {
        tracing::warn!(
            dropped = movie_count - records.len(),
            "Movies without a credits row were dropped"
        );
    }

    tracing::info!(rows = records.len(), "Catalog joined");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    const MOVIES: &str = "\
budget,genres,id,overview,runtime,title,vote_average
237000000,\"[{\"\"id\"\": 28, \"\"name\"\": \"\"Action\"\"}]\",19995,In the 22nd century,162.0,Avatar,7.2
0,[],1,,,Orphan,
300000000,[],285,Captain Barbossa,169,Pirates,6.9
";

    const CREDITS: &str = "\
movie_id,title,cast,crew
285,Pirates,[],[]
19995,Avatar,\"[{\"\"name\"\": \"\"Sam Worthington\"\"}]\",[]
285,Pirates again,\"[{\"\"name\"\": \"\"Ignored\"\"}]\",[]
";

    #[test]
    fn test_join_keeps_movies_order_and_drops_unmatched() {
        let records = read_catalog_from(MOVIES.as_bytes(), CREDITS.as_bytes()).unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.movie.id).collect();
        assert_eq!(ids, vec![19995, 285]);
    }

    #[test]
    fn test_first_credits_row_wins() {
        let records = read_catalog_from(MOVIES.as_bytes(), CREDITS.as_bytes()).unwrap();
        assert_eq!(records[1].cast.as_deref(), Some("[]"));
    }

    #[test]
    fn test_numeric_columns() {
        let records = read_catalog_from(MOVIES.as_bytes(), CREDITS.as_bytes()).unwrap();
        assert_eq!(records[0].movie.runtime, Some(162.0));
        assert_eq!(records[0].movie.vote_average, Some(7.2));
        assert_eq!(records[0].movie.title.as_deref(), Some("Avatar"));
    }

    #[test]
    fn test_blank_numeric_fields_are_absent() {
        let movies = "id,title,runtime,vote_average\n7,Blank,,\n";
        let credits = "movie_id,cast\n7,[]\n";
        let records = read_catalog_from(movies.as_bytes(), credits.as_bytes()).unwrap();
        assert_eq!(records[0].movie.runtime, None);
        assert_eq!(records[0].movie.vote_average, None);
        assert_eq!(records[0].movie.overview, None);
    }

    #[test]
    fn test_malformed_numeric_field_fails() {
        let movies = "id,title,runtime,vote_average\n7,Broken,abc,6.1\n";
        let credits = "movie_id,cast\n7,[]\n";
        let result = read_catalog_from(movies.as_bytes(), credits.as_bytes());
        assert!(matches!(result, Err(AppError::Csv(_))));
    }
}
