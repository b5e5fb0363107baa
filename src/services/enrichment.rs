use std::sync::Arc;

use crate::models::{MovieResponse, ScoredMovie};

use super::providers::PosterProvider;

/// Outcome of attaching artwork to one ranked movie
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Enriched(MovieResponse),
    Omitted { movie_id: i64, reason: String },
}

impl Enrichment {
    pub fn into_response(self) -> Option<MovieResponse> {
        match self {
            Enrichment::Enriched(response) => Some(response),
            Enrichment::Omitted { .. } => None,
        }
    }
}

/// Fetches artwork for every movie concurrently, one task per movie.
///
/// The output has one entry per input, in input order.
pub async fn enrich_all(
    provider: Arc<dyn PosterProvider>,
    movies: Vec<ScoredMovie>,
) -> Vec<Enrichment> {
    let tasks: Vec<_> = movies
        .into_iter()
        .map(|scored| {
            let provider = Arc::clone(&provider);
            let movie_id = scored.movie.movie_id;
            let task = tokio::spawn(async move {
                match provider.fetch_artwork(scored.movie.movie_id).await {
                    Ok(artwork) => Enrichment::Enriched(MovieResponse::new(&scored, artwork)),
                    Err(e) => Enrichment::Omitted {
                        movie_id: scored.movie.movie_id,
                        reason: e.to_string(),
                    },
                }
            });
            (movie_id, task)
        })
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for (movie_id, task) in tasks {
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(movie_id, error = %e, "Enrichment task join error");
                Enrichment::Omitted {
                    movie_id,
                    reason: e.to_string(),
                }
            }
        };
        results.push(outcome);
    }
    results
}

/// Enriches ranked movies and drops the ones whose artwork lookup failed
pub async fn enrich(
    provider: Arc<dyn PosterProvider>,
    movies: Vec<ScoredMovie>,
) -> Vec<MovieResponse> {
    let provider_name = provider.name();
    let requested = movies.len();
    let outcomes = enrich_all(provider, movies).await;

    let responses: Vec<MovieResponse> = outcomes
        .into_iter()
        .filter_map(|outcome| {
            if let Enrichment::Omitted { movie_id, reason } = &outcome {
                tracing::warn!(
                    provider = provider_name,
                    movie_id = *movie_id,
                    reason = %reason,
                    "Dropping movie without artwork"
                );
            }
            outcome.into_response()
        })
        .collect();

    if responses.len() < requested {
        tracing::warn!(
            requested,
            returned = responses.len(),
            "Partial artwork enrichment"
        );
    }

    responses
}
