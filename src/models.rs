use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::{entities::movie, error::AppError};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Raw query string of the listing endpoint. Values stay strings so that
/// garbage falls back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn from_query(page: Option<&str>, size: Option<&str>) -> Self {
        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            size: positive(size).unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip, or `None` when the page lies beyond anything the
    /// database can address (offsets are bound as `i64`).
    pub fn offset(&self) -> Option<u64> {
        (self.page - 1).checked_mul(self.size).filter(|offset| i64::try_from(*offset).is_ok())
    }

    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.size)
    }
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub movies: Vec<movie::Model>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub imdb_id: Option<String>,
}

/// Full payload for direct creation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    #[validate(required(message = "imdbId is required"))]
    pub imdb_id: Option<String>,
    #[validate(
        required(message = "title is required"),
        length(min = 1, max = 500, message = "title must be between 1 and 500 characters")
    )]
    pub title: Option<String>,
    #[validate(required(message = "year is required"))]
    pub year: Option<i32>,
    pub rated: Option<String>,
    #[validate(required(message = "released is required"))]
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub actors: Option<String>,
    #[validate(required(message = "plot is required"))]
    pub plot: Option<String>,
    #[validate(
        required(message = "poster is required"),
        length(max = 1000, message = "poster must be at most 1000 characters")
    )]
    pub poster: Option<String>,
    #[validate(range(min = 0.0, max = 10.0, message = "imdbRating must be between 0 and 10"))]
    pub imdb_rating: Option<f64>,
    pub box_office: Option<String>,
}

impl NewMovie {
    pub fn into_draft(self) -> Result<MovieDraft, AppError> {
        self.validate()?;
        Ok(MovieDraft {
            imdb_id: self.imdb_id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            rated: self.rated,
            released: self.released.unwrap_or_default(),
            runtime: self.runtime,
            genre: self.genre,
            director: self.director,
            writer: self.writer,
            actors: self.actors,
            plot: self.plot.unwrap_or_default(),
            poster: self.poster.unwrap_or_default(),
            imdb_rating: self.imdb_rating.map(round_rating),
            box_office: self.box_office,
        })
    }
}

/// A fully resolved record, ready to insert.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDraft {
    pub imdb_id: String,
    pub title: String,
    pub year: i32,
    pub rated: Option<String>,
    pub released: String,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub actors: Option<String>,
    pub plot: String,
    pub poster: String,
    pub imdb_rating: Option<f64>,
    pub box_office: Option<String>,
}

/// Partial update. Required columns can only be replaced; nullable columns
/// can also be cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoviePatch {
    #[validate(length(min = 1, message = "imdbId must not be empty"))]
    pub imdb_id: Option<String>,
    #[validate(length(min = 1, max = 500, message = "title must be between 1 and 500 characters"))]
    pub title: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub rated: Option<Option<String>>,
    pub released: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub runtime: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub genre: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub director: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub writer: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub actors: Option<Option<String>>,
    pub plot: Option<String>,
    #[validate(length(max = 1000, message = "poster must be at most 1000 characters"))]
    pub poster: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub imdb_rating: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub box_office: Option<Option<String>>,
}

impl MoviePatch {
    pub fn check(mut self) -> Result<Self, AppError> {
        let mut details = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => match AppError::from(errors) {
                AppError::Validation(details) => details,
                other => return Err(other),
            },
        };
        if let Some(Some(rating)) = self.imdb_rating {
            if !(0.0..=10.0).contains(&rating) {
                details.push("imdbRating must be between 0 and 10".to_string());
            }
        }
        if !details.is_empty() {
            details.sort();
            return Err(AppError::Validation(details));
        }
        self.imdb_rating = self.imdb_rating.map(|r| r.map(round_rating));
        Ok(self)
    }
}

fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Ratings carry a single fractional digit.
pub fn round_rating(rating: f64) -> f64 {
    (rating * 10.0).round() / 10.0
}
