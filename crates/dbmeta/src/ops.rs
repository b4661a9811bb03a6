//! The three schema operations: build, export and update.
//!
//! Each operation acquires its connection once, after its own preconditions
//! have been checked, and closes it on every exit path.

use std::future::Future;
use std::path::Path;

use tracing::{info, warn};

use crate::build::{BuildReport, SchemaBuilder};
use crate::config::BuildConfig;
use crate::core::traits::{
    CatalogReader, DatabaseProvisioner, SchemaConnection, TransactionalConnection,
};
use crate::error::{MetaError, Result};
use crate::export::{ExportReport, MetadataExporter};
use crate::migrate::{MigrationExecutor, MigrationPlan, MigrationResult};
use crate::scripts::load_scripts;

/// Create a new database in `database_dir` and run every script in `scripts_dir`.
///
/// Fails before touching the server if the database file already exists.
/// Per-script failures are collected in the report, not returned as errors.
pub async fn build<P>(
    provisioner: &P,
    database_dir: &Path,
    scripts_dir: &Path,
    config: &BuildConfig,
) -> Result<BuildReport>
where
    P: DatabaseProvisioner + ?Sized,
{
    std::fs::create_dir_all(database_dir)?;

    let database_file = database_dir.join(&config.database_file);
    if database_file.exists() {
        return Err(MetaError::Precondition(format!(
            "database file {:?} already exists",
            database_file
        )));
    }
    ensure_scripts_dir(scripts_dir)?;
    let scripts = load_scripts(scripts_dir)?;

    info!("Creating database {:?}", database_file);
    let mut conn = provisioner.create_database(&database_file).await?;

    let mut report = SchemaBuilder::new().run(&mut conn, &scripts).await;
    close_quietly(&mut conn).await;

    report.database_file = database_file;
    report.log();
    Ok(report)
}

/// Export domains, tables and procedures as `.sql` files into `output_dir`.
pub async fn export<R, F>(connect: F, output_dir: &Path) -> Result<ExportReport>
where
    R: CatalogReader,
    F: Future<Output = Result<R>>,
{
    let mut reader = connect.await?;
    let outcome = MetadataExporter::new(output_dir).export(&mut reader).await;
    if let Err(e) = reader.close().await {
        warn!("Failed to close catalog connection: {}", e);
    }
    outcome
}

/// Apply the scripts in `scripts_dir` to an existing database in one transaction.
pub async fn update<C, F>(connect: F, scripts_dir: &Path) -> Result<MigrationResult>
where
    C: TransactionalConnection,
    F: Future<Output = Result<C>>,
{
    ensure_scripts_dir(scripts_dir)?;
    let plan = MigrationPlan::from_scripts(load_scripts(scripts_dir)?);

    let mut conn = connect.await?;
    let outcome = MigrationExecutor::new().execute(&mut conn, &plan).await;
    close_quietly(&mut conn).await;
    outcome
}

fn ensure_scripts_dir(scripts_dir: &Path) -> Result<()> {
    if !scripts_dir.is_dir() {
        return Err(MetaError::Precondition(format!(
            "scripts directory {:?} does not exist",
            scripts_dir
        )));
    }
    Ok(())
}

async fn close_quietly<C>(conn: &mut C)
where
    C: SchemaConnection + ?Sized,
{
    if let Err(e) = conn.close().await {
        warn!("Failed to close connection: {}", e);
    }
}
