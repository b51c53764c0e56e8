mod config;
mod guard;
mod routes;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::EdgeConfig::from_env().expect("invalid edge configuration");
    if !config.assets_dir.is_dir() {
        tracing::warn!(dir = %config.assets_dir.display(), "assets directory missing; pages will 404");
    }

    let app = routes::app(&config);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, assets = %config.assets_dir.display(), "edge router listening");
    axum::serve(listener, app).await.expect("server failed");
}
