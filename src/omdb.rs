use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{MovieDraft, round_rating},
};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum OmdbError {
    #[error("OMDB API key is not configured")]
    MissingApiKey,

    #[error("OMDB request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OMDB Error: {0}")]
    NotFound(String),
}

impl From<OmdbError> for AppError {
    fn from(err: OmdbError) -> Self {
        match err {
            OmdbError::MissingApiKey => AppError::Configuration(err.to_string()),
            OmdbError::Transport(_) => {
                tracing::error!(error = %err, "movie metadata provider unavailable");
                AppError::ServiceUnavailable("Movie metadata provider is unavailable".to_string())
            },
            OmdbError::NotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}

pub struct OmdbClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl OmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        base_url: String,
        rps: u32,
    ) -> Self {
        if api_key.is_none() {
            tracing::warn!("no OMDB_API_KEY provided, imports by IMDB id will fail");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, base_url, limiter }
    }

    pub async fn fetch_by_imdb_id(&self, imdb_id: &str) -> Result<OmdbMovie, OmdbError> {
        let api_key = self.api_key.as_deref().ok_or(OmdbError::MissingApiKey)?;

        self.limiter.until_ready().await;

        tracing::debug!(imdb_id = %imdb_id, "fetching OMDB metadata");
        let payload: OmdbPayload = self
            .client
            .get(&self.base_url)
            .query(&[("i", imdb_id), ("apikey", api_key), ("plot", "full")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        payload.into_result()
    }
}

/// Body of an OMDB lookup. A miss still comes back as 200 with
/// `Response: "False"` and an `Error` message.
#[derive(Debug, Deserialize)]
struct OmdbPayload {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(flatten)]
    movie: OmdbMovie,
}

impl OmdbPayload {
    fn into_result(self) -> Result<OmdbMovie, OmdbError> {
        if self.response.as_deref() == Some("False") {
            let message = self.error.unwrap_or_else(|| "Movie not found!".to_string());
            return Err(OmdbError::NotFound(message));
        }
        Ok(self.movie)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OmdbMovie {
    pub title: Option<String>,
    pub year: Option<String>,
    pub rated: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub poster: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    pub box_office: Option<String>,
}

impl OmdbMovie {
    /// Maps provider fields onto a catalog record. `requested_id` is used
    /// when the provider omits `imdbID`.
    pub fn into_draft(self, requested_id: &str) -> MovieDraft {
        MovieDraft {
            imdb_id: self.imdb_id.unwrap_or_else(|| requested_id.to_string()),
            title: or_not_available(self.title),
            year: parse_year(self.year.as_deref()),
            rated: self.rated,
            released: or_not_available(self.released),
            runtime: self.runtime,
            genre: self.genre,
            director: self.director,
            writer: self.writer,
            actors: self.actors,
            plot: or_not_available(self.plot),
            poster: or_not_available(self.poster),
            imdb_rating: Some(parse_rating(self.imdb_rating.as_deref())),
            box_office: Some(or_not_available(self.box_office)),
        }
    }
}

fn or_not_available(value: Option<String>) -> String {
    value.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Leading digits of the year field ("1994", "2008–2013"), or 0.
fn parse_year(raw: Option<&str>) -> i32 {
    let raw = raw.unwrap_or_default().trim();
    let end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    raw[..end].parse().unwrap_or(0)
}

fn parse_rating(raw: Option<&str>) -> f64 {
    match raw.map(str::trim) {
        None | Some(NOT_AVAILABLE) => 0.0,
        Some(s) => s.parse::<f64>().ok().filter(|r| r.is_finite()).map(round_rating).unwrap_or(0.0),
    }
}
