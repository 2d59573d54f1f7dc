pub mod error;
pub mod platform;
pub mod routes;
pub mod state;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use sitewright_core::config::ComposeConfig;
use sitewright_core::orchestrator::Platform;
use sitewright_core::registry::DeploymentDb;

use crate::platform::HttpPlatform;
use crate::state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Deployments
        .route(
            "/api/websites/{website_id}/deployments",
            post(routes::deployments::create_deployment),
        )
        .route(
            "/api/websites/{website_id}/deployments",
            get(routes::deployments::list_deployments),
        )
        .route(
            "/api/deployments/{deployment_id}",
            get(routes::deployments::get_deployment),
        )
        // Composition preview
        .route("/api/compose/preview", post(routes::compose::preview))
        .layer(cors)
        .with_state(app_state)
}

/// Open the registry, fail stale in-flight deployments left over from a
/// previous process, and serve the API.
pub async fn serve(
    registry_path: &Path,
    control_base: String,
    config: ComposeConfig,
    port: u16,
) -> anyhow::Result<()> {
    let registry = Arc::new(DeploymentDb::open(registry_path)?);
    let recovered = registry.startup_recovery(Duration::from_secs(30 * 60))?;
    if recovered > 0 {
        tracing::warn!(recovered, "failed stale deployments from previous run");
    }

    let platform: Arc<dyn Platform> =
        Arc::new(HttpPlatform::new(control_base, &config.health_check)?);
    let app = build_router(AppState::new(registry, platform, config));

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("sitewright API listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
