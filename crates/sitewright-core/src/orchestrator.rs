//! Deployment orchestrator: drives a site artifact through
//! build → publish → activate → health-check, recording every step in the
//! registry before the step runs. Each deployment is an independent spawned
//! task; deployments for different websites never contend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::artifact::SiteArtifact;
use crate::config::ComposeConfig;
use crate::deploy::DeploymentRecord;
use crate::error::{Result, SiteError};
use crate::registry::DeploymentDb;
use crate::types::DeployState;

// ---------------------------------------------------------------------------
// SiteBundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleFile {
    pub route: String,
    pub markup: String,
}

/// A deployable rendering of one artifact: every route's full page markup
/// plus the template version it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteBundle {
    pub website_id: String,
    pub business_id: String,
    pub template_version: String,
    pub files: Vec<BundleFile>,
}

impl SiteBundle {
    pub fn from_artifact(artifact: &SiteArtifact) -> Self {
        Self {
            website_id: artifact.website_id.clone(),
            business_id: artifact.business_id.clone(),
            template_version: artifact.template_version.clone(),
            files: artifact
                .pages
                .iter()
                .map(|(route, page)| BundleFile {
                    route: route.clone(),
                    markup: page.full_markup(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Platform seam
// ---------------------------------------------------------------------------

/// External build/push/runtime platform. `publish` signals retryable
/// failures with `SiteError::TransientPublish`; anything else is permanent.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Finalize the rendered bundle into its deployable form.
    async fn build(&self, bundle: &SiteBundle) -> Result<()>;

    /// Push the bundle to the hosting target.
    async fn publish(&self, bundle: &SiteBundle) -> Result<()>;

    /// Switch traffic routing to the new bundle; returns the live URL.
    async fn activate(&self, bundle: &SiteBundle) -> Result<String>;

    /// Restore traffic routing to the previously live bundle.
    async fn rollback(&self, website_id: &str) -> Result<()>;

    /// Liveness probe against the activated route.
    async fn health_check(&self, url: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// DeploymentEvent
// ---------------------------------------------------------------------------

/// Emitted on terminal state transitions. Consumers (webhook emitters, UIs)
/// can subscribe without the state machine knowing about them.
#[derive(Debug, Clone)]
pub struct DeploymentEvent {
    pub deployment_id: Uuid,
    pub website_id: String,
    pub state: DeployState,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    registry: Arc<DeploymentDb>,
    platform: Arc<dyn Platform>,
    config: ComposeConfig,
    events: broadcast::Sender<DeploymentEvent>,
}

impl Orchestrator {
    pub fn new(registry: Arc<DeploymentDb>, platform: Arc<dyn Platform>, config: ComposeConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            registry,
            platform,
            config,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeploymentEvent> {
        self.events.subscribe()
    }

    /// Idempotent deploy entry point. Creates the `Queued` record — failing
    /// fast with a conflict if one is already in flight for the website —
    /// then spawns the pipeline task and returns the new deployment id.
    pub fn deploy(&self, artifact: SiteArtifact) -> Result<Uuid> {
        if artifact.home_page().is_none() {
            return Err(SiteError::Assembly(
                "artifact is missing its home route".into(),
            ));
        }

        let record = DeploymentRecord::new(&artifact.website_id, &artifact.business_id);
        self.registry.create(&record)?;
        let deployment_id = record.deployment_id;
        info!(
            deployment_id = %deployment_id,
            website_id = %artifact.website_id,
            routes = artifact.pages.len(),
            "deployment queued"
        );

        let registry = Arc::clone(&self.registry);
        let platform = Arc::clone(&self.platform);
        let config = self.config.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let website_id = artifact.website_id.clone();
            let outcome =
                run_pipeline(&registry, platform.as_ref(), &config, deployment_id, artifact).await;

            let terminal = match outcome {
                Ok(live_url) => {
                    info!(deployment_id = %deployment_id, live_url = %live_url, "deployment live");
                    DeployState::Live
                }
                Err(e) => {
                    error!(deployment_id = %deployment_id, error = %e, "deployment failed");
                    let _ = registry.transition(
                        deployment_id,
                        DeployState::Failed,
                        Some(&e.to_string()),
                    );
                    DeployState::Failed
                }
            };
            let _ = events.send(DeploymentEvent {
                deployment_id,
                website_id,
                state: terminal,
            });
        });

        Ok(deployment_id)
    }

    /// Read-only status snapshot; never blocks the pipeline.
    pub fn status(&self, deployment_id: Uuid) -> Result<DeploymentRecord> {
        self.registry.get(deployment_id)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Wrap a step in its state's maximum dwell time.
async fn with_dwell<T>(
    state: DeployState,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    let limit = state
        .max_dwell()
        .unwrap_or(Duration::from_secs(600));
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SiteError::Timeout {
            state: state.to_string(),
            limit_secs: limit.as_secs(),
        }),
    }
}

/// Run the full pipeline for one deployment, returning the live URL.
/// Every state transition is durably recorded before its step executes.
async fn run_pipeline(
    registry: &DeploymentDb,
    platform: &dyn Platform,
    config: &ComposeConfig,
    deployment_id: Uuid,
    artifact: SiteArtifact,
) -> Result<String> {
    // Building: permanent failures only, no retry.
    registry.transition(deployment_id, DeployState::Building, None)?;
    let bundle = SiteBundle::from_artifact(&artifact);
    with_dwell(DeployState::Building, platform.build(&bundle)).await?;

    // Publishing: bounded exponential backoff on transient failures.
    registry.transition(deployment_id, DeployState::Publishing, None)?;
    with_dwell(
        DeployState::Publishing,
        publish_with_retry(platform, &bundle, &config.publish_retry),
    )
    .await?;

    // Activating.
    registry.transition(deployment_id, DeployState::Activating, None)?;
    let live_url = with_dwell(DeployState::Activating, platform.activate(&bundle)).await?;

    // Health checking: bounded re-activation retries, rollback on exhaustion.
    // Re-activation may route to a fresh URL, so the step returns the one
    // that finally probed healthy.
    registry.transition(deployment_id, DeployState::HealthChecking, None)?;
    let live_url = with_dwell(
        DeployState::HealthChecking,
        health_check_with_retry(registry, platform, config, deployment_id, &bundle, live_url),
    )
    .await?;

    registry.transition(deployment_id, DeployState::Live, Some(&live_url))?;
    Ok(live_url)
}

async fn publish_with_retry(
    platform: &dyn Platform,
    bundle: &SiteBundle,
    policy: &crate::deploy::RetryPolicy,
) -> Result<()> {
    let mut last_error = String::new();
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.delay_for(attempt)).await;
        match platform.publish(bundle).await {
            Ok(()) => return Ok(()),
            Err(SiteError::TransientPublish(msg)) => {
                warn!(
                    website_id = %bundle.website_id,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %msg,
                    "transient publish failure"
                );
                last_error = msg;
            }
            Err(e) => return Err(e),
        }
    }
    Err(SiteError::PublishExhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}

/// Probe the activated route. A failed probe re-enters `Activating`,
/// re-activates, and probes again up to the policy bound. Exhaustion rolls
/// traffic back to the previously live bundle before reporting failure, so
/// an unhealthy deployment never keeps serving traffic.
async fn health_check_with_retry(
    registry: &DeploymentDb,
    platform: &dyn Platform,
    config: &ComposeConfig,
    deployment_id: Uuid,
    bundle: &SiteBundle,
    mut live_url: String,
) -> Result<String> {
    let policy = &config.health_check;
    let mut last_error = String::new();
    for probe in 1..=policy.max_probes {
        match platform.health_check(&live_url).await {
            Ok(()) => return Ok(live_url),
            Err(e) => {
                warn!(
                    deployment_id = %deployment_id,
                    probe,
                    max_probes = policy.max_probes,
                    error = %e,
                    "health probe failed"
                );
                last_error = e.to_string();
            }
        }
        if probe < policy.max_probes {
            tokio::time::sleep(policy.interval()).await;
            registry.transition(deployment_id, DeployState::Activating, None)?;
            live_url = platform.activate(bundle).await?;
            registry.transition(deployment_id, DeployState::HealthChecking, None)?;
        }
    }

    if let Err(e) = platform.rollback(&bundle.website_id).await {
        error!(
            website_id = %bundle.website_id,
            error = %e,
            "rollback after failed health checks also failed"
        );
    }
    Err(SiteError::HealthCheckExhausted {
        attempts: policy.max_probes,
        last_error: format!("{last_error} (traffic rolled back)"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
