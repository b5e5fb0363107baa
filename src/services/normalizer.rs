use serde::Deserialize;

use crate::models::{Movie, RawMovieRecord};

/// Number of top-billed cast members kept per movie
pub const PRINCIPAL_CAST: usize = 3;

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

/// Turns joined catalog records into the model corpus.
///
/// Output row `i` is input row `i`; nothing is sorted or filtered.
pub fn normalize(records: Vec<RawMovieRecord>) -> Vec<Movie> {
    records.into_iter().map(normalize_record).collect()
}

fn normalize_record(record: RawMovieRecord) -> Movie {
    let RawMovieRecord { movie, cast } = record;
    Movie {
        movie_id: movie.id,
        title: movie.title.unwrap_or_default(),
        genres: join_names(movie.genres.as_deref(), None),
        cast: join_names(cast.as_deref(), Some(PRINCIPAL_CAST)),
        overview: movie.overview.unwrap_or_default(),
        vote_average: movie.vote_average.unwrap_or(0.0),
        runtime: movie.runtime,
    }
}

/// Decodes a serialized list of `{"name": ..}` objects into space-joined names.
///
/// Absent, blank or undecodable input yields an empty string.
pub fn join_names(raw: Option<&str>, limit: Option<usize>) -> String {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return String::new(),
    };

    match serde_json::from_str::<Vec<NamedEntry>>(raw) {
        Ok(entries) => entries
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|entry| entry.name)
            .collect::<Vec<_>>()
            .join(" "),
        Err(e) => {
            tracing::debug!(error = %e, "Undecodable name list, using empty string");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawMovieRow;

    fn record(id: i64, genres: Option<&str>, cast: Option<&str>) -> RawMovieRecord {
        RawMovieRecord {
            movie: RawMovieRow {
                id,
                title: Some(format!("Movie {}", id)),
                genres: genres.map(str::to_string),
                overview: None,
                vote_average: Some(5.0),
                runtime: None,
            },
            cast: cast.map(str::to_string),
        }
    }

    #[test]
    fn test_genres_keep_source_order() {
        let raw = r#"[{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}, {"id": 14, "name": "Fantasy"}]"#;
        assert_eq!(join_names(Some(raw), None), "Action Adventure Fantasy");
    }

    #[test]
    fn test_cast_truncated_to_principal() {
        let raw = r#"[{"name": "Sam Worthington"}, {"name": "Zoe Saldana"}, {"name": "Sigourney Weaver"}, {"name": "Stephen Lang"}]"#;
        assert_eq!(
            join_names(Some(raw), Some(PRINCIPAL_CAST)),
            "Sam Worthington Zoe Saldana Sigourney Weaver"
        );
    }

    #[test]
    fn test_bad_input_yields_empty_string() {
        assert_eq!(join_names(None, None), "");
        assert_eq!(join_names(Some("   "), None), "");
        assert_eq!(join_names(Some("not json"), None), "");
        assert_eq!(join_names(Some(r#"[{"id": 1}]"#), None), "");
    }

    #[test]
    fn test_normalize_preserves_order_and_defaults() {
        let corpus = normalize(vec![
            record(3, None, Some(r#"[{"name": "A"}]"#)),
            record(1, Some(r#"[{"name": "Drama"}]"#), None),
        ]);

        assert_eq!(corpus[0].movie_id, 3);
        assert_eq!(corpus[0].genres, "");
        assert_eq!(corpus[0].cast, "A");
        assert_eq!(corpus[0].overview, "");
        assert_eq!(corpus[1].movie_id, 1);
        assert_eq!(corpus[1].genres, "Drama");
        assert_eq!(corpus[1].cast, "");
    }
}
