pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod models;
pub mod omdb;
pub mod routes;
pub mod store;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    auth::TokenVerifier, catalog::Catalog, config::Config, omdb::OmdbClient, store::MovieStore,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(config: &Config, db: DatabaseConnection) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("movie-catalog/0.1")
            .timeout(config.omdb_timeout)
            .build()?;

        let omdb = OmdbClient::new(
            http,
            config.omdb_api_key.clone(),
            config.omdb_base_url.clone(),
            config.omdb_rps,
        );

        let catalog = Catalog::new(MovieStore::new(db), Arc::new(omdb));
        let tokens = Arc::new(TokenVerifier::new(&config.jwt_secret));

        Ok(Self { catalog, tokens })
    }
}
