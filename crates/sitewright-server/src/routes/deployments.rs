use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use sitewright_core::assemble::{assemble, PagePlan};
use sitewright_core::blocks::{
    default_selection, validate_website_id, BlockSelection, ContentBlockSelection,
};
use sitewright_core::profile::BusinessProfile;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeployRequest {
    pub profile: BusinessProfile,
    /// Explicit block selection; omitted means the trade's default layout.
    #[serde(default)]
    pub blocks: Option<Vec<BlockSelection>>,
}

/// POST /api/websites/:website_id/deployments — compose the site and queue
/// a deployment. Responds 202 with the new deployment id; the pipeline runs
/// in the background.
pub async fn create_deployment(
    State(app): State<AppState>,
    Path(website_id): Path<String>,
    Json(req): Json<DeployRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    validate_website_id(&website_id)?;
    req.profile.validate_for_deploy()?;

    let config = app.config.clone();
    let artifact = tokio::task::spawn_blocking(move || {
        let selection = match req.blocks {
            Some(blocks) => ContentBlockSelection {
                website_id: website_id.clone(),
                blocks,
            },
            None => default_selection(&req.profile, &website_id),
        };
        let plan = PagePlan::for_profile(&req.profile, &config);
        assemble(&req.profile, &selection, &plan, &config, chrono::Utc::now())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let website_id = artifact.website_id.clone();
    let deployment_id = app.orchestrator.deploy(artifact)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "deployment_id": deployment_id,
            "website_id": website_id,
            "state": "queued",
        })),
    ))
}

/// GET /api/deployments/:deployment_id — current status snapshot.
pub async fn get_deployment(
    State(app): State<AppState>,
    Path(deployment_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = app.registry.get(deployment_id)?;
    Ok(Json(serde_json::to_value(&record)?))
}

/// GET /api/websites/:website_id/deployments — history, newest first.
pub async fn list_deployments(
    State(app): State<AppState>,
    Path(website_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_website_id(&website_id)?;
    let records = app.registry.list_for_website(&website_id)?;
    Ok(Json(serde_json::to_value(&records)?))
}
