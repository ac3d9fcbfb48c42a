//! Test infrastructure for the movie catalog integration tests.
//!
//! `TestApp` runs the production router against an in-memory SQLite database
//! and a fake OMDB server listening on a local port.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_test::TestServer;
use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
use serde_json::{Value, json};

use movie_catalog::{
    AppState, config::Config, db, entities::movie, models::MovieDraft, models::PageRequest, routes,
};

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const OMDB_API_KEY: &str = "test-omdb-key";

/// IMDB ids the fake provider knows about.
pub const SHAWSHANK: &str = "tt0111161";
pub const UNRATED: &str = "tt0000002";
pub const PROVIDER_FAILURE: &str = "tt5000000";

#[derive(Clone, Default)]
struct FakeOmdbState {
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

/// Stand-in for the OMDB API.
pub struct FakeOmdb {
    pub base_url: String,
    state: FakeOmdbState,
}

impl FakeOmdb {
    pub async fn spawn() -> Self {
        let state = FakeOmdbState::default();
        let app = Router::new().route("/", get(fake_omdb)).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}/"), state }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.state.last_query.lock().unwrap().clone()
    }
}

async fn fake_omdb(
    State(state): State<FakeOmdbState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().unwrap() = Some(params.clone());

    if params.get("apikey").map(String::as_str) != Some(OMDB_API_KEY) {
        let body = json!({ "Response": "False", "Error": "Invalid API key!" });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    match params.get("i").map(String::as_str) {
        Some(SHAWSHANK) => Json(shawshank_payload()).into_response(),
        Some(UNRATED) => Json(json!({
            "Title": "Obscure Short",
            "Year": "1911",
            "Rated": "N/A",
            "Released": "N/A",
            "Runtime": "12 min",
            "Genre": "Short",
            "Director": "Unknown",
            "Writer": "N/A",
            "Actors": "N/A",
            "Plot": "N/A",
            "Poster": "N/A",
            "imdbRating": "N/A",
            "imdbID": UNRATED,
            "Response": "True"
        }))
        .into_response(),
        Some(PROVIDER_FAILURE) => StatusCode::BAD_GATEWAY.into_response(),
        _ => Json(json!({ "Response": "False", "Error": "Incorrect IMDb ID." })).into_response(),
    }
}

pub fn shawshank_payload() -> Value {
    json!({
        "Title": "The Shawshank Redemption",
        "Year": "1994",
        "Rated": "R",
        "Released": "14 Oct 1994",
        "Runtime": "142 min",
        "Genre": "Drama",
        "Director": "Frank Darabont",
        "Writer": "Stephen King, Frank Darabont",
        "Actors": "Tim Robbins, Morgan Freeman, Bob Gunton",
        "Plot": "A banker convicted of uxoricide forms a friendship over a quarter century with a hardened convict.",
        "Poster": "https://m.media-amazon.com/images/M/shawshank.jpg",
        "imdbRating": "9.3",
        "imdbID": SHAWSHANK,
        "BoxOffice": "$28,767,189",
        "Response": "True"
    })
}

pub struct TestApp {
    server: TestServer,
    state: Arc<AppState>,
    omdb: Option<FakeOmdb>,
}

impl TestApp {
    /// App wired to a fake OMDB with a valid key.
    pub async fn new() -> Self {
        let omdb = FakeOmdb::spawn().await;
        let base_url = omdb.base_url.clone();
        Self::build(base_url, Some(OMDB_API_KEY.to_string()), Some(omdb)).await
    }

    /// App with no OMDB key configured.
    pub async fn without_omdb_key() -> Self {
        let omdb = FakeOmdb::spawn().await;
        let base_url = omdb.base_url.clone();
        Self::build(base_url, None, Some(omdb)).await
    }

    /// App whose OMDB base URL points at a closed port.
    pub async fn with_unreachable_omdb() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Self::build(format!("http://{addr}/"), Some(OMDB_API_KEY.to_string()), None).await
    }

    async fn build(omdb_base_url: String, omdb_api_key: Option<String>, omdb: Option<FakeOmdb>) -> Self {
        let config = Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            omdb_api_key,
            omdb_base_url,
            omdb_timeout: Duration::from_secs(5),
            omdb_rps: 100,
            jwt_secret: JWT_SECRET.to_string(),
        };

        let conn = db::connect_and_migrate(&config.database_url, config.database_max_connections)
            .await
            .expect("failed to set up test database");
        let state = Arc::new(AppState::new(&config, conn).expect("failed to build state"));
        let server =
            TestServer::new(routes::router(state.clone())).expect("failed to create test server");

        Self { server, state, omdb }
    }

    pub fn server(&self) -> &TestServer {
        &self.server
    }

    pub fn omdb(&self) -> &FakeOmdb {
        self.omdb.as_ref().expect("this app has no fake OMDB")
    }

    pub fn token(&self, user_id: &str, role: Option<&str>) -> String {
        let mut claims = json!({ "userId": user_id, "exp": get_current_timestamp() + 3600 });
        if let Some(role) = role {
            claims["role"] = json!(role);
        }
        encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
            .expect("failed to sign token")
    }

    pub fn admin_token(&self) -> String {
        self.token("admin-1", Some("admin"))
    }

    pub fn user_token(&self) -> String {
        self.token("user-1", Some("user"))
    }

    /// Inserts a movie straight into the store.
    pub async fn seed(&self, title: &str, imdb_id: &str) -> movie::Model {
        self.state
            .catalog
            .store()
            .insert(draft(title, imdb_id))
            .await
            .expect("failed to seed movie")
    }

    pub async fn movie_count(&self) -> u64 {
        let page = PageRequest { page: 1, size: 1 };
        let (_, total) = self.state.catalog.store().list(page, None).await.unwrap();
        total
    }
}

pub fn draft(title: &str, imdb_id: &str) -> MovieDraft {
    MovieDraft {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: 1995,
        rated: Some("R".to_string()),
        released: "15 Dec 1995".to_string(),
        runtime: Some("170 min".to_string()),
        genre: Some("Crime, Drama".to_string()),
        director: Some("Michael Mann".to_string()),
        writer: None,
        actors: None,
        plot: "A plot.".to_string(),
        poster: "https://example.com/poster.jpg".to_string(),
        imdb_rating: Some(8.3),
        box_office: None,
    }
}

/// A complete direct-create payload.
pub fn new_movie_payload(title: &str) -> Value {
    json!({
        "imdbId": "tt0113277",
        "title": title,
        "year": 1995,
        "rated": "R",
        "released": "15 Dec 1995",
        "runtime": "170 min",
        "genre": "Crime, Drama",
        "director": "Michael Mann",
        "writer": "Michael Mann",
        "actors": "Al Pacino, Robert De Niro",
        "plot": "A group of high-end professional thieves start to feel the heat from the LAPD.",
        "poster": "https://example.com/heat.jpg",
        "imdbRating": 8.3,
        "boxOffice": "$67,436,818"
    })
}
