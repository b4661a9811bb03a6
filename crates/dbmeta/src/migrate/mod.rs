//! Transactional application of schema update scripts.
//!
//! A [`MigrationPlan`] is executed inside one transaction: domains first,
//! then tables, then procedures. The first failing script rolls back every
//! change made by the plan, including earlier groups; otherwise the whole
//! plan is committed.

mod plan;

pub use plan::{ExecutionGroup, MigrationPlan, GROUP_ORDER};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::core::traits::TransactionalConnection;
use crate::error::{MetaError, Result};
use crate::scripts::{ScriptCategory, ScriptFailure};

/// Where the executor is in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorState {
    /// Nothing sent to the database yet.
    Pending,
    /// Transaction open, applying the given group.
    Running(ScriptCategory),
    /// Every group applied and committed.
    Committed,
    /// A script or the commit failed; all changes discarded.
    RolledBack,
}

/// Result of a committed update run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status.
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the transaction was committed.
    pub completed_at: DateTime<Utc>,

    /// Scripts executed, in execution order.
    pub applied: Vec<String>,

    /// Scripts left out because no supported statement was recognized.
    pub skipped: Vec<String>,
}

impl MigrationResult {
    /// Serialize the result as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs a [`MigrationPlan`] all-or-nothing.
#[derive(Debug)]
pub struct MigrationExecutor {
    state: ExecutorState,
    applied: Vec<String>,
}

impl Default for MigrationExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationExecutor {
    pub fn new() -> Self {
        Self {
            state: ExecutorState::Pending,
            applied: Vec::new(),
        }
    }

    pub fn state(&self) -> &ExecutorState {
        &self.state
    }

    /// Apply the plan in one transaction.
    ///
    /// On success the transaction is committed. On the first script failure
    /// the transaction is rolled back and a [`MetaError::Migration`] naming
    /// the script is returned. The transaction never stays open.
    pub async fn execute<C>(&mut self, conn: &mut C, plan: &MigrationPlan) -> Result<MigrationResult>
    where
        C: TransactionalConnection + ?Sized,
    {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        self.state = ExecutorState::Pending;
        self.applied.clear();

        info!(
            "Starting update {} with {} scripts ({} skipped)",
            run_id,
            plan.len(),
            plan.skipped().len()
        );

        conn.begin().await?;

        if let Err(failure) = self.apply_groups(conn, plan).await {
            return Err(self.roll_back(conn, failure).await);
        }

        if let Err(e) = conn.commit().await {
            let failure = ScriptFailure {
                file: "<commit>".to_string(),
                message: e.detail(),
            };
            return Err(self.roll_back(conn, failure).await);
        }
        self.state = ExecutorState::Committed;

        let completed_at = Utc::now();
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        info!(
            "Update committed: {} scripts applied in {:.2}s",
            self.applied.len(),
            duration_seconds
        );

        Ok(MigrationResult {
            run_id,
            status: "committed".to_string(),
            duration_seconds,
            started_at,
            completed_at,
            applied: self.applied.clone(),
            skipped: plan.skipped().iter().map(|s| s.file_name()).collect(),
        })
    }

    async fn apply_groups<C>(
        &mut self,
        conn: &mut C,
        plan: &MigrationPlan,
    ) -> std::result::Result<(), ScriptFailure>
    where
        C: TransactionalConnection + ?Sized,
    {
        for group in plan.groups() {
            if group.is_empty() {
                continue;
            }
            self.state = ExecutorState::Running(group.category);
            info!("=== Applying group: {} ===", group.category);

            for classified in &group.scripts {
                let file = classified.script.file_name();
                info!("Executing script: {}", file);
                conn.execute(&classified.script.raw_text)
                    .await
                    .map_err(|e| ScriptFailure {
                        file: file.clone(),
                        message: e.detail(),
                    })?;
                info!("Script {} executed", file);
                self.applied.push(file);
            }
        }
        Ok(())
    }

    async fn roll_back<C>(&mut self, conn: &mut C, failure: ScriptFailure) -> MetaError
    where
        C: TransactionalConnection + ?Sized,
    {
        error!("Script {} failed: {}", failure.file, failure.message);
        let message = match conn.rollback().await {
            Ok(()) => failure.message,
            Err(e) => {
                error!("Rollback failed: {}", e);
                format!("{}; rollback also failed: {}", failure.message, e.detail())
            }
        };
        self.state = ExecutorState::RolledBack;
        info!("All changes from this update were rolled back");
        MetaError::migration(failure.file, message)
    }
}
