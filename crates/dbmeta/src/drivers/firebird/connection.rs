//! Firebird connection implementing the catalog and schema traits.
//!
//! `rsfbclient` is blocking, so every call runs on the blocking thread pool.
//! The connection is moved into the blocking task and handed back when the
//! call returns, which keeps exactly one statement in flight.
//!
//! The driver sets no statement timeout; long DDL runs to completion.

use std::path::Path;

use async_trait::async_trait;
use rsfbclient::prelude::*;
use rsfbclient::{FbError, FromRow, SimpleConnection};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::catalog::{
    column_row, domain_row, procedure_row, RawColumnRow, RawDomainRow, RawProcedureRow,
    COLUMNS_QUERY, DOMAINS_QUERY, PROCEDURES_QUERY,
};
use crate::config::{BuildConfig, ConnectionConfig};
use crate::core::schema::{DomainRow, ProcedureRow};
use crate::core::traits::{
    CatalogReader, ColumnSink, DatabaseProvisioner, SchemaConnection, TransactionalConnection,
};
use crate::error::{MetaError, Result};

/// Column rows buffered between the fetching thread and the exporter.
const COLUMN_BUFFER: usize = 256;

/// An open connection to a Firebird database.
pub struct FirebirdConnection {
    conn: Option<SimpleConnection>,
    target: String,
}

impl FirebirdConnection {
    /// Connect to an existing database.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let target = describe(config);
        let config = config.clone();

        let conn = tokio::task::spawn_blocking(move || {
            rsfbclient::builder_pure_rust()
                .host(config.host.as_str())
                .port(config.port)
                .db_name(config.database.as_str())
                .user(config.user.as_str())
                .pass(config.password.as_str())
                .connect()
                .map(SimpleConnection::from)
        })
        .await
        .map_err(|e| MetaError::driver(e, "connecting to Firebird"))?
        .map_err(|e| MetaError::driver(e, format!("connecting to {}", target)))?;

        info!("Connected to Firebird: {}", target);
        Ok(Self {
            conn: Some(conn),
            target,
        })
    }

    /// Create a new database file and connect to it.
    pub async fn create(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let target = describe(config);
        let config = config.clone();

        let conn = tokio::task::spawn_blocking(move || {
            rsfbclient::builder_pure_rust()
                .host(config.host.as_str())
                .port(config.port)
                .db_name(config.database.as_str())
                .user(config.user.as_str())
                .pass(config.password.as_str())
                .create_database()
                .map(SimpleConnection::from)
        })
        .await
        .map_err(|e| MetaError::driver(e, "creating Firebird database"))?
        .map_err(|e| MetaError::driver(e, format!("creating database {}", target)))?;

        info!("Created Firebird database: {}", target);
        Ok(Self {
            conn: Some(conn),
            target,
        })
    }

    /// Run a blocking driver call with the connection.
    async fn with_conn<T, F>(&mut self, context: &str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SimpleConnection) -> std::result::Result<T, FbError> + Send + 'static,
    {
        let mut conn = self
            .conn
            .take()
            .ok_or_else(|| MetaError::driver("connection is closed", context))?;

        let (conn, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = f(&mut conn);
            (conn, outcome)
        })
        .await
        .map_err(|e| MetaError::driver(e, context))?;

        self.conn = Some(conn);
        outcome.map_err(|e| MetaError::driver(e, context))
    }

    async fn query_rows<R>(&mut self, sql: &'static str, context: &str) -> Result<Vec<R>>
    where
        R: FromRow + Send + 'static,
    {
        self.with_conn(context, move |conn| conn.query(sql, ()))
            .await
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            tokio::task::spawn_blocking(move || conn.close())
                .await
                .map_err(|e| MetaError::driver(e, "closing connection"))?
                .map_err(|e| MetaError::driver(e, "closing connection"))?;
            debug!("Closed connection to {}", self.target);
        }
        Ok(())
    }
}

fn describe(config: &ConnectionConfig) -> String {
    format!("{}:{}/{}", config.host, config.port, config.database)
}

#[async_trait]
impl CatalogReader for FirebirdConnection {
    async fn domains(&mut self) -> Result<Vec<DomainRow>> {
        let rows: Vec<RawDomainRow> = self.query_rows(DOMAINS_QUERY, "reading domains").await?;
        Ok(rows.into_iter().map(domain_row).collect())
    }

    async fn scan_table_columns(&mut self, sink: ColumnSink<'_>) -> Result<()> {
        let context = "reading table columns";
        let mut conn = self
            .conn
            .take()
            .ok_or_else(|| MetaError::driver("connection is closed", context))?;

        // Rows are fetched on the blocking pool and handed over one by one;
        // a dropped receiver ends the fetch early.
        let (tx, mut rx) = mpsc::channel::<RawColumnRow>(COLUMN_BUFFER);
        let fetch = tokio::task::spawn_blocking(move || {
            let outcome = (|| -> std::result::Result<(), FbError> {
                for row in conn.query_iter(COLUMNS_QUERY, ())? {
                    if tx.blocking_send(row?).is_err() {
                        break;
                    }
                }
                Ok(())
            })();
            (conn, outcome)
        });

        let mut delivered = Ok(());
        while let Some(raw) = rx.recv().await {
            if let Err(e) = sink(column_row(raw)) {
                delivered = Err(e);
                break;
            }
        }
        drop(rx);

        let (conn, outcome) = fetch.await.map_err(|e| MetaError::driver(e, context))?;
        self.conn = Some(conn);
        delivered?;
        outcome.map_err(|e| MetaError::driver(e, context))
    }

    async fn procedures(&mut self) -> Result<Vec<ProcedureRow>> {
        let rows: Vec<RawProcedureRow> = self
            .query_rows(PROCEDURES_QUERY, "reading procedures")
            .await?;
        Ok(rows.into_iter().map(procedure_row).collect())
    }

    async fn close(&mut self) -> Result<()> {
        self.disconnect().await
    }
}

#[async_trait]
impl SchemaConnection for FirebirdConnection {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        let sql = sql.to_string();
        self.with_conn("executing statement", move |conn| {
            conn.execute(&sql, ()).map(|_| ())
        })
        .await
    }

    async fn close(&mut self) -> Result<()> {
        self.disconnect().await
    }
}

#[async_trait]
impl TransactionalConnection for FirebirdConnection {
    async fn begin(&mut self) -> Result<()> {
        self.with_conn("starting transaction", |conn| conn.begin_transaction())
            .await
    }

    async fn commit(&mut self) -> Result<()> {
        self.with_conn("committing transaction", |conn| conn.commit())
            .await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.with_conn("rolling back transaction", |conn| conn.rollback())
            .await
    }
}

/// Creates databases with the administrative defaults from [`BuildConfig`].
pub struct FirebirdProvisioner {
    config: BuildConfig,
}

impl FirebirdProvisioner {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DatabaseProvisioner for FirebirdProvisioner {
    type Connection = FirebirdConnection;

    async fn create_database(&self, path: &Path) -> Result<FirebirdConnection> {
        let conn_config = self.config.connection_for(path.display().to_string());
        FirebirdConnection::create(&conn_config).await
    }
}
