/// TMDB movie details provider
///
/// Artwork comes from `/3/movie/{id}`, which returns (among many other fields)
/// relative `poster_path` and `backdrop_path` values. Either may be null.
use std::time::Duration;

use reqwest::Client as HttpClient;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::Artwork,
    services::providers::PosterProvider,
};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Creates a provider whose requests give up after `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn movie_url(&self, movie_id: i64) -> String {
        format!("{}/3/movie/{}", self.api_url, movie_id)
    }
}

#[async_trait::async_trait]
impl PosterProvider for TmdbProvider {
    #[instrument(skip(self), fields(provider = "TMDB"))]
    async fn fetch_artwork(&self, movie_id: i64) -> AppResult<Artwork> {
        let response = self
            .http_client
            .get(self.movie_url(movie_id))
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await
            // The request URL carries the API key
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {} for movie {}: {}",
                status, movie_id, body
            )));
        }

        let artwork: Artwork = response.json().await.map_err(reqwest::Error::without_url)?;

        tracing::debug!(
            movie_id,
            has_poster = artwork.poster_path.is_some(),
            "Fetched artwork from TMDB"
        );

        Ok(artwork)
    }

    fn name(&self) -> &'static str {
        "TMDB"
    }
}
