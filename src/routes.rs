use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{FromRequest, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    auth::{Caller, authenticate, require_catalog_manager},
    entities::movie,
    error::{AppError, AppResult},
    models::{ImportRequest, ListQuery, MoviePage, MoviePatch, NewMovie},
};

/// `Json` whose rejections use the service's error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

pub fn router(state: Arc<AppState>) -> Router {
    let writes = Router::new()
        .route("/add", post(add_movie))
        .route("/addByImdbId", post(add_movie_by_imdb_id))
        .route("/update/{id}", put(update_movie))
        .route("/delete/{id}", delete(delete_movie))
        // Layers run bottom-up: authenticate, then the capability check.
        .route_layer(middleware::from_fn(require_catalog_manager))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/getMovies", get(list_movies))
        .route("/getMovies/{id}", get(get_movie))
        .merge(writes)
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any)),
        )
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<MoviePage>> {
    Ok(Json(state.catalog.list(&query).await?))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<movie::Model>> {
    Ok(Json(state.catalog.get(&id).await?))
}

pub async fn add_movie(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiJson(payload): ApiJson<NewMovie>,
) -> AppResult<(StatusCode, Json<movie::Model>)> {
    let created = state.catalog.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn add_movie_by_imdb_id(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<ImportRequest>,
) -> AppResult<(StatusCode, Json<movie::Model>)> {
    let created = state.catalog.import_by_imdb_id(&caller, req.imdb_id.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<MoviePatch>,
) -> AppResult<Json<movie::Model>> {
    Ok(Json(state.catalog.update(&caller, &id, patch).await?))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.catalog.delete(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
