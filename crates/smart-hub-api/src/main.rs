//! Smart Hub - settings, sensor ingest and history API server

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use hub_engine::{SmartHub, SunriseSunsetClient, SunsetLookup};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod routes;

use config::ServerConfig;

/// Application state shared across handlers
pub struct AppState<L> {
    pub hub: Arc<SmartHub<L>>,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            hub: Arc::clone(&self.hub),
        }
    }
}

/// Build the router; CORS admits only `cors_origin`, for reads and settings updates
fn router<L: SunsetLookup>(state: AppState<L>, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([cors_origin]))
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/settings",
            get(routes::get_settings::<L>).put(routes::put_settings::<L>),
        )
        .route("/sensors_data", post(routes::post_reading::<L>))
        .route("/graph", get(routes::get_graph::<L>))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_hub_api=debug,hub_engine=debug,info".into()),
        )
        .init();

    tracing::info!("Starting Smart Hub API server");

    let config = ServerConfig::from_env()?;
    let cors_origin = HeaderValue::from_str(&config.cors_origin)
        .with_context(|| format!("invalid CORS origin: {}", config.cors_origin))?;

    tracing::info!(
        "Sunset lookups via {} (default location {}, {})",
        config.sunset_api_url,
        config.hub.default_location.lat,
        config.hub.default_location.lng
    );
    let lookup = SunriseSunsetClient::new(config.sunset_api_url.clone());
    let hub = Arc::new(SmartHub::new(config.hub.clone(), lookup));
    hub.start()?;

    let app = router(AppState { hub }, cors_origin);

    tracing::info!("Listening on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
