//! Durable deployment registry backed by redb.
//!
//! Single `DEPLOYMENTS` table keyed by the 16 raw deployment-UUID bytes,
//! values JSON-encoded `DeploymentRecord`s. All mutation happens inside one
//! redb write transaction, so concurrent status readers never observe a
//! half-written record, and conflicting `create` calls for the same website
//! serialize on the single writer — exactly one wins.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::warn;
use uuid::Uuid;

use crate::deploy::DeploymentRecord;
use crate::error::{Result, SiteError};
use crate::types::DeployState;

const DEPLOYMENTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("deployments");

fn db_err(e: impl std::fmt::Display) -> SiteError {
    SiteError::Registry(e.to_string())
}

// ---------------------------------------------------------------------------
// DeploymentDb
// ---------------------------------------------------------------------------

/// The single source of truth for deployment status. The orchestrator is the
/// only writer; status queries are read-only.
pub struct DeploymentDb {
    db: Database,
}

impl DeploymentDb {
    /// Open or create the registry database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(db_err)?;
        // Ensure the table exists before any reads
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(DEPLOYMENTS).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    /// Insert a new `Queued` record, enforcing at most one non-terminal
    /// record per website. The existence check and the insert share one
    /// write transaction, which is what makes concurrent deploy requests
    /// for the same website resolve to exactly one winner.
    pub fn create(&self, record: &DeploymentRecord) -> Result<()> {
        let value = serde_json::to_vec(record)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(DEPLOYMENTS).map_err(db_err)?;
            for entry in table.iter().map_err(db_err)? {
                let (_, v) = entry.map_err(db_err)?;
                let existing: DeploymentRecord = serde_json::from_slice(v.value())?;
                if existing.website_id == record.website_id && !existing.is_terminal() {
                    return Err(SiteError::DeployConflict {
                        website_id: record.website_id.clone(),
                        deployment_id: existing.deployment_id,
                    });
                }
            }
            table
                .insert(record.deployment_id.as_bytes().as_slice(), value.as_slice())
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    /// Apply a state transition.
    ///
    /// Illegal edges are rejected as a logged no-op — this guards against
    /// out-of-order completions from retried asynchronous steps. `detail`
    /// carries the live URL for `Live` and the error message for `Failed`.
    /// Returns the post-call record.
    pub fn transition(
        &self,
        deployment_id: Uuid,
        new_state: DeployState,
        detail: Option<&str>,
    ) -> Result<DeploymentRecord> {
        let wt = self.db.begin_write().map_err(db_err)?;
        let record = {
            let mut table = wt.open_table(DEPLOYMENTS).map_err(db_err)?;
            let key = deployment_id.as_bytes().as_slice();
            // The access guard borrows the table, so decode and release it
            // before the insert below.
            let mut record: DeploymentRecord = match table.get(key).map_err(db_err)? {
                Some(v) => serde_json::from_slice(v.value())?,
                None => return Err(SiteError::DeploymentNotFound(deployment_id)),
            };

            if !record.state.can_transition_to(new_state) {
                warn!(
                    deployment_id = %deployment_id,
                    from = %record.state,
                    to = %new_state,
                    "rejecting illegal deployment transition"
                );
                return Ok(record);
            }

            record.state = new_state;
            record.updated_at = Utc::now();
            match new_state {
                DeployState::Live => {
                    record.live_url = detail.map(str::to_string);
                }
                DeployState::Failed => {
                    // A terminal failure always carries a non-empty detail.
                    let msg = detail.filter(|d| !d.is_empty()).unwrap_or("unspecified error");
                    record.error_detail = Some(msg.to_string());
                }
                _ => {}
            }

            let value = serde_json::to_vec(&record)?;
            table.insert(key, value.as_slice()).map_err(db_err)?;
            record
        };
        wt.commit().map_err(db_err)?;
        Ok(record)
    }

    /// Snapshot of one record.
    pub fn get(&self, deployment_id: Uuid) -> Result<DeploymentRecord> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(DEPLOYMENTS).map_err(db_err)?;
        let value = table
            .get(deployment_id.as_bytes().as_slice())
            .map_err(db_err)?;
        match value {
            Some(v) => Ok(serde_json::from_slice(v.value())?),
            None => Err(SiteError::DeploymentNotFound(deployment_id)),
        }
    }

    /// The in-flight (non-terminal) record for a website, if any.
    pub fn get_active_for_website(&self, website_id: &str) -> Result<Option<DeploymentRecord>> {
        Ok(self
            .scan(|r| r.website_id == website_id && !r.is_terminal())?
            .into_iter()
            .next())
    }

    /// All deploy attempts for a website, newest first.
    pub fn list_for_website(&self, website_id: &str) -> Result<Vec<DeploymentRecord>> {
        let mut records = self.scan(|r| r.website_id == website_id)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// All records, newest first.
    pub fn list_all(&self) -> Result<Vec<DeploymentRecord>> {
        let mut records = self.scan(|_| true)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// On daemon startup, force any non-terminal record older than `max_age`
    /// to `Failed`. A deployment stuck from a crash would otherwise hold the
    /// at-most-one-non-terminal slot and lock its website out of
    /// redeployment forever. Returns the number of records recovered.
    pub fn startup_recovery(&self, max_age: Duration) -> Result<u32> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).map_err(db_err)?;
        let stale = self.scan(|r| !r.is_terminal() && r.updated_at < cutoff)?;
        let mut count = 0u32;
        for record in stale {
            self.transition(
                record.deployment_id,
                DeployState::Failed,
                Some("recovered from restart"),
            )?;
            count += 1;
        }
        Ok(count)
    }

    fn scan(
        &self,
        keep: impl Fn(&DeploymentRecord) -> bool,
    ) -> Result<Vec<DeploymentRecord>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(DEPLOYMENTS).map_err(db_err)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            let record: DeploymentRecord = serde_json::from_slice(v.value())?;
            if keep(&record) {
                result.push(record);
            }
        }
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
