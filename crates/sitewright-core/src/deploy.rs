use crate::types::DeployState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DeploymentRecord
// ---------------------------------------------------------------------------

/// Durable status entry for one deploy attempt. Created at request time,
/// mutated only through the registry's `transition`, retained indefinitely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployment_id: Uuid,
    pub website_id: String,
    pub business_id: String,
    pub state: DeployState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set only when the deployment reaches `Live`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    /// Set only on `Failed`; never empty for a terminal failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl DeploymentRecord {
    pub fn new(website_id: impl Into<String>, business_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            deployment_id: Uuid::new_v4(),
            website_id: website_id.into(),
            business_id: business_id.into(),
            state: DeployState::Queued,
            created_at: now,
            updated_at: now,
            live_url: None,
            error_detail: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Bounded exponential backoff, shared by the publishing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Backoff base in milliseconds; attempt `n` (1-based) waits
    /// `base * 2^(n-1)`, capped at `max_delay_ms`.
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 250,
            max_delay_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before re-running attempt `attempt` (1-based; the first attempt
    /// has no delay).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exp = (attempt - 2).min(31);
        let ms = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

// ---------------------------------------------------------------------------
// HealthPolicy
// ---------------------------------------------------------------------------

/// Fixed-interval probing for the health-check step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPolicy {
    pub max_probes: u32,
    pub interval_ms: u64,
    /// Per-probe response deadline.
    pub probe_timeout_ms: u64,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            max_probes: 5,
            interval_ms: 2_000,
            probe_timeout_ms: 5_000,
        }
    }
}

impl HealthPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
