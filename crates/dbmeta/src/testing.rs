//! In-memory doubles for the connection traits.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::schema::{ColumnRow, DomainRow, ProcedureRow};
use crate::core::traits::{
    CatalogReader, ColumnSink, DatabaseProvisioner, SchemaConnection, TransactionalConnection,
};
use crate::error::{MetaError, Result};

/// Objects a [`MemoryDatabase`] knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCatalog {
    pub domains: BTreeSet<String>,
    pub tables: BTreeSet<String>,
    pub procedures: BTreeSet<String>,
}

impl MemoryCatalog {
    /// Apply one statement. Understands just enough DDL to enforce
    /// domain-before-table dependencies.
    fn apply(&mut self, sql: &str) -> std::result::Result<(), String> {
        let upper = sql.trim().to_uppercase();
        let words: Vec<&str> = upper
            .split(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == ',' || c == ';')
            .filter(|w| !w.is_empty())
            .collect();

        if upper.contains("BROKEN") {
            return Err(format!("Dynamic SQL Error: Token unknown in {}", words.join(" ")));
        }

        match words.as_slice() {
            ["CREATE", "DOMAIN", name, ..] => {
                if !self.domains.insert(name.to_string()) {
                    return Err(format!("Domain {} already exists", name));
                }
                Ok(())
            }
            ["CREATE", "TABLE", name, rest @ ..] => {
                for word in rest.iter().filter(|w| w.starts_with("D_")) {
                    if !self.domains.contains(*word) {
                        return Err(format!("Domain {} is not defined", word));
                    }
                }
                if !self.tables.insert(name.to_string()) {
                    return Err(format!("Table {} already exists", name));
                }
                Ok(())
            }
            ["ALTER", "TABLE", name, ..] => {
                if !self.tables.contains(*name) {
                    return Err(format!("Table unknown {}", name));
                }
                Ok(())
            }
            ["CREATE", "OR", "ALTER", "PROCEDURE", name, ..]
            | ["CREATE", "PROCEDURE", name, ..]
            | ["ALTER", "PROCEDURE", name, ..] => {
                self.procedures.insert(name.to_string());
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Shared counters so tests can inspect a connection after handing it over.
#[derive(Debug, Default)]
pub struct MemoryLog {
    pub executed: Vec<String>,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub closed: bool,
}

/// A fake database with transactional semantics.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    pub committed: MemoryCatalog,
    pending: Option<MemoryCatalog>,
    pub log: Arc<Mutex<MemoryLog>>,
    fail_commit: bool,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }
}

#[async_trait]
impl SchemaConnection for MemoryDatabase {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.log.lock().unwrap().executed.push(sql.to_string());
        let target = match self.pending.as_mut() {
            Some(pending) => pending,
            None => &mut self.committed,
        };
        target
            .apply(sql)
            .map_err(|message| MetaError::driver(message, "executing statement"))
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

#[async_trait]
impl TransactionalConnection for MemoryDatabase {
    async fn begin(&mut self) -> Result<()> {
        self.log.lock().unwrap().begins += 1;
        self.pending = Some(self.committed.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.fail_commit {
            return Err(MetaError::driver("deadlock; update conflicts", "commit"));
        }
        self.log.lock().unwrap().commits += 1;
        let pending = self
            .pending
            .take()
            .ok_or_else(|| MetaError::driver("no transaction", "commit"))?;
        self.committed = pending;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.log.lock().unwrap().rollbacks += 1;
        self.pending = None;
        Ok(())
    }
}

/// Catalog reader over fixed rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogReader {
    pub domains: Vec<DomainRow>,
    pub columns: Vec<ColumnRow>,
    pub procedures: Vec<ProcedureRow>,
    /// Column rows handed to a sink so far.
    pub columns_delivered: usize,
    /// Shared so tests can check it after the reader is moved.
    pub closed: Arc<AtomicBool>,
}

#[async_trait]
impl CatalogReader for MemoryCatalogReader {
    async fn domains(&mut self) -> Result<Vec<DomainRow>> {
        Ok(self.domains.clone())
    }

    async fn scan_table_columns(&mut self, sink: ColumnSink<'_>) -> Result<()> {
        for row in self.columns.clone() {
            self.columns_delivered += 1;
            sink(row)?;
        }
        Ok(())
    }

    async fn procedures(&mut self) -> Result<Vec<ProcedureRow>> {
        Ok(self.procedures.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Provisioner that records the requested path and hands out a [`MemoryDatabase`].
#[derive(Debug, Default)]
pub struct MemoryProvisioner {
    pub created: Mutex<Vec<PathBuf>>,
    pub database: MemoryDatabase,
}

#[async_trait]
impl DatabaseProvisioner for MemoryProvisioner {
    type Connection = MemoryDatabase;

    async fn create_database(&self, path: &Path) -> Result<MemoryDatabase> {
        self.created.lock().unwrap().push(path.to_path_buf());
        std::fs::write(path, b"")?;
        Ok(self.database.clone())
    }
}
