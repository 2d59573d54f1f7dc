use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown content block type: {0}")]
    UnknownBlockType(String),

    #[error("duplicate block order {order} for website '{website_id}'")]
    DuplicateBlockOrder { website_id: String, order: u32 },

    #[error("block '{block}' is missing required data: {field}")]
    MissingBlockData { block: String, field: String },

    #[error("invalid website id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidWebsiteId(String),

    #[error("assembly failed: {0}")]
    Assembly(String),

    #[error("duplicate page title '{title}' on routes '{first}' and '{second}'")]
    DuplicateTitle {
        title: String,
        first: String,
        second: String,
    },

    #[error("deployment already in flight for website '{website_id}': {deployment_id}")]
    DeployConflict {
        website_id: String,
        deployment_id: Uuid,
    },

    #[error("deployment not found: {0}")]
    DeploymentNotFound(Uuid),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("build failed: {0}")]
    Build(String),

    #[error("publish rejected: {0}")]
    Publish(String),

    #[error("transient publish failure: {0}")]
    TransientPublish(String),

    #[error("publish failed after {attempts} attempts: {last_error}")]
    PublishExhausted { attempts: u32, last_error: String },

    #[error("activation failed: {0}")]
    Activation(String),

    #[error("health check failed: {0}")]
    HealthCheck(String),

    #[error("health check exhausted after {attempts} probes: {last_error}")]
    HealthCheckExhausted { attempts: u32, last_error: String },

    #[error("deployment step '{state}' exceeded its {limit_secs}s dwell time")]
    Timeout { state: String, limit_secs: u64 },

    #[error("registry error: {0}")]
    Registry(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SiteError {
    /// True for input-shaped errors the caller must fix before retrying.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SiteError::Validation(_)
                | SiteError::UnknownBlockType(_)
                | SiteError::DuplicateBlockOrder { .. }
                | SiteError::MissingBlockData { .. }
                | SiteError::InvalidWebsiteId(_)
        )
    }

    /// True for structural conflicts detected during assembly.
    pub fn is_assembly(&self) -> bool {
        matches!(
            self,
            SiteError::Assembly(_) | SiteError::DuplicateTitle { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
