use std::sync::Arc;

use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use movie_catalog::{AppState, config::Config, db, metrics, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movie_catalog=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::register_metrics();

    let db = db::connect_and_migrate(&config.database_url, config.database_max_connections).await?;
    let state = Arc::new(AppState::new(&config, db)?);

    let app = routes::router(state)
        .route("/metrics", get(move || std::future::ready(prometheus.render())));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
