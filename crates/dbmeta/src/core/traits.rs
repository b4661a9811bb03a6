//! Connection traits separating the schema pipeline from the database driver.
//!
//! - [`CatalogReader`]: Reads domain, column and procedure rows from the catalog
//! - [`SchemaConnection`]: Executes single DDL statements
//! - [`TransactionalConnection`]: Adds an explicit transaction around statements
//! - [`DatabaseProvisioner`]: Creates a new, empty database file
//!
//! The Firebird driver implements all four; tests use in-memory doubles.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

use super::schema::{ColumnRow, DomainRow, ProcedureRow};

/// Receives column rows one at a time. Returning an error stops the scan.
pub type ColumnSink<'a> = &'a mut (dyn FnMut(ColumnRow) -> Result<()> + Send);

/// Read schema metadata from a database catalog.
///
/// # Ordering
///
/// [`scan_table_columns`](CatalogReader::scan_table_columns) must deliver
/// rows ordered by table name and then by column position. The exporter
/// folds over them as they arrive and rejects any other order.
#[async_trait]
pub trait CatalogReader: Send {
    /// User domains that are not the implicit source of a table column.
    async fn domains(&mut self) -> Result<Vec<DomainRow>>;

    /// Feed the columns of user tables to `sink` as they are read,
    /// ordered by table name then position.
    ///
    /// The first error from `sink` ends the scan and is returned.
    async fn scan_table_columns(&mut self, sink: ColumnSink<'_>) -> Result<()>;

    /// User stored procedures with their source text.
    async fn procedures(&mut self) -> Result<Vec<ProcedureRow>>;

    /// Close the underlying connection. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}

/// Execute DDL statements one at a time.
///
/// Implementations must not impose a statement timeout: schema changes on
/// large tables are allowed to run to completion.
#[async_trait]
pub trait SchemaConnection: Send {
    /// Execute one statement. Outside a transaction it is committed on success.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Close the underlying connection. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}

/// A connection that can group statements into one transaction.
#[async_trait]
pub trait TransactionalConnection: SchemaConnection {
    /// Start a transaction; subsequent statements run inside it.
    async fn begin(&mut self) -> Result<()>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the open transaction, discarding every statement since `begin`.
    async fn rollback(&mut self) -> Result<()>;
}

/// Create empty databases for the build operation.
#[async_trait]
pub trait DatabaseProvisioner: Send + Sync {
    type Connection: SchemaConnection;

    /// Create the database file at `path` and return a connection to it.
    async fn create_database(&self, path: &Path) -> Result<Self::Connection>;
}
