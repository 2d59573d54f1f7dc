use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use sitewright_core::assemble::{assemble, PagePlan};
use sitewright_core::blocks::{
    default_selection, validate_website_id, BlockSelection, ContentBlockSelection,
};
use sitewright_core::profile::BusinessProfile;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub website_id: String,
    pub profile: BusinessProfile,
    #[serde(default)]
    pub blocks: Option<Vec<BlockSelection>>,
}

/// POST /api/compose/preview — run the full composition pipeline and return
/// the artifact without deploying anything.
pub async fn preview(
    State(app): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_website_id(&req.website_id)?;
    req.profile.validate_for_deploy()?;

    let config = app.config.clone();
    let artifact = tokio::task::spawn_blocking(move || {
        let selection = match req.blocks {
            Some(blocks) => ContentBlockSelection {
                website_id: req.website_id.clone(),
                blocks,
            },
            None => default_selection(&req.profile, &req.website_id),
        };
        let plan = PagePlan::for_profile(&req.profile, &config);
        assemble(&req.profile, &selection, &plan, &config, chrono::Utc::now())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(&artifact)?))
}
