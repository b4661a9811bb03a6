//! Best-effort execution of bootstrap scripts against a fresh database.
//!
//! Unlike the migration executor, scripts run one by one without a
//! surrounding transaction. A failing script is recorded and the next one
//! still runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::core::traits::SchemaConnection;
use crate::scripts::{ScriptFailure, ScriptFile};

/// Outcome of a build run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    /// Database file that was created.
    pub database_file: PathBuf,
    /// Scripts that executed successfully, in execution order.
    pub succeeded: Vec<String>,
    /// Scripts that failed, with the driver's message.
    pub failed: Vec<ScriptFailure>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Log the success and failure lists.
    pub fn log(&self) {
        info!("=== Script execution report ===");
        info!("Succeeded: {}", self.succeeded.len());
        for file in &self.succeeded {
            info!("  {}", file);
        }
        info!("Failed: {}", self.failed.len());
        for failure in &self.failed {
            error!("  {}: {}", failure.file, failure.message);
        }
    }
}

/// Runs scripts independently and collects a per-file report.
#[derive(Debug, Default)]
pub struct SchemaBuilder;

impl SchemaBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Execute every script in the given order. Never stops early.
    pub async fn run<C>(&self, conn: &mut C, scripts: &[ScriptFile]) -> BuildReport
    where
        C: SchemaConnection + ?Sized,
    {
        let mut report = BuildReport::default();

        for script in scripts {
            let file = script.file_name();
            info!("Executing script: {}", file);
            match conn.execute(&script.raw_text).await {
                Ok(()) => report.succeeded.push(file),
                Err(e) => {
                    let message = e.detail();
                    error!("Script {} failed: {}", file, message);
                    report.failed.push(ScriptFailure { file, message });
                }
            }
        }

        report
    }
}
