//! Movie catalog operations behind the HTTP handlers.
//!
//! Every write takes the [`Caller`] and checks
//! [`Capability::ManageCatalog`] before touching the store.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::{Caller, Capability},
    entities::movie,
    error::{AppError, AppResult},
    metrics::{CreationSource, record_creation},
    models::{ListQuery, MoviePage, MoviePatch, NewMovie, PageRequest},
    omdb::OmdbClient,
    store::MovieStore,
};

#[derive(Clone)]
pub struct Catalog {
    store: MovieStore,
    omdb: Arc<OmdbClient>,
}

impl Catalog {
    pub fn new(store: MovieStore, omdb: Arc<OmdbClient>) -> Self {
        Self { store, omdb }
    }

    pub fn store(&self) -> &MovieStore {
        &self.store
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<MoviePage> {
        let page = PageRequest::from_query(query.page.as_deref(), query.size.as_deref());
        let title = query.title.as_deref().map(str::trim).filter(|t| !t.is_empty());

        let (movies, total_items) = self.store.list(page, title).await?;
        debug!(page = page.page, size = page.size, title = ?title, total_items, "listed movies");

        Ok(MoviePage {
            total_items,
            total_pages: page.total_pages(total_items),
            current_page: page.page,
            page_size: page.size,
            movies,
        })
    }

    pub async fn get(&self, id: &str) -> AppResult<movie::Model> {
        let id = parse_id(id)?;
        self.store.get(id).await?.ok_or_else(AppError::movie_not_found)
    }

    pub async fn create(&self, caller: &Caller, payload: NewMovie) -> AppResult<movie::Model> {
        caller.require(Capability::ManageCatalog)?;

        let draft = payload.into_draft()?;
        let created = self.store.insert(draft).await?;
        record_creation(CreationSource::Direct);
        info!(id = %created.id, imdb_id = %created.imdb_id, user_id = ?caller.user_id, "movie created");
        Ok(created)
    }

    /// validate → check duplicate → fetch → map → persist.
    pub async fn import_by_imdb_id(
        &self,
        caller: &Caller,
        imdb_id: Option<&str>,
    ) -> AppResult<movie::Model> {
        caller.require(Capability::ManageCatalog)?;

        let imdb_id = validate_imdb_id(imdb_id)?;
        self.ensure_not_catalogued(imdb_id).await?;

        let fetched = self.omdb.fetch_by_imdb_id(imdb_id).await?;
        let draft = fetched.into_draft(imdb_id);

        let created = self.store.insert(draft).await?;
        record_creation(CreationSource::Imdb);
        info!(id = %created.id, imdb_id = %created.imdb_id, user_id = ?caller.user_id, "movie imported");
        Ok(created)
    }

    async fn ensure_not_catalogued(&self, imdb_id: &str) -> AppResult<()> {
        match self.store.find_by_imdb_id(imdb_id).await? {
            Some(existing) => {
                debug!(imdb_id = %imdb_id, id = %existing.id, "movie already catalogued");
                Err(AppError::Conflict("Movie already exists in database".to_string()))
            },
            None => Ok(()),
        }
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        patch: MoviePatch,
    ) -> AppResult<movie::Model> {
        caller.require(Capability::ManageCatalog)?;

        let id = parse_id(id)?;
        let patch = patch.check()?;
        let updated = self.store.update(id, patch).await?.ok_or_else(AppError::movie_not_found)?;
        info!(id = %updated.id, user_id = ?caller.user_id, "movie updated");
        Ok(updated)
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> AppResult<()> {
        caller.require(Capability::ManageCatalog)?;

        let id = parse_id(id)?;
        if !self.store.delete(id).await? {
            return Err(AppError::movie_not_found());
        }
        info!(id = %id, user_id = ?caller.user_id, "movie deleted");
        Ok(())
    }
}

/// A malformed id cannot name a stored movie.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::movie_not_found())
}

/// `tt` followed by one or more ASCII digits.
pub fn validate_imdb_id(raw: Option<&str>) -> AppResult<&str> {
    let id = raw.map(str::trim).unwrap_or_default();
    if id.is_empty() {
        return Err(AppError::BadRequest("imdbId is required".to_string()));
    }
    let well_formed = id
        .strip_prefix("tt")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return Err(AppError::BadRequest(format!(
            "imdbId '{id}' is invalid, expected 'tt' followed by digits"
        )));
    }
    Ok(id)
}
