//! Export of catalog metadata into one DDL script per object.
//!
//! Three passes run against a [`CatalogReader`]: domains, tables and
//! procedures. Tables are assembled by streaming over column rows that arrive
//! ordered by table and position; a table is written as soon as the next row
//! belongs to a different table.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::schema::{
    ColumnDefinition, ColumnRow, DomainDefinition, ProcedureDefinition, TableDefinition,
};
use crate::core::traits::CatalogReader;
use crate::error::{MetaError, Result};
use crate::scripts::SCRIPT_EXTENSION;
use crate::typemap::UNKNOWN_TYPE;

/// Summary of an export run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportReport {
    /// Directory the scripts were written to.
    pub output_dir: PathBuf,
    /// Domains written.
    pub domains: usize,
    /// Tables written.
    pub tables: usize,
    /// Procedures written.
    pub procedures: usize,
    /// Procedures skipped because the catalog holds no source for them.
    pub skipped_procedures: Vec<String>,
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
}

/// Streaming state of the table pass.
#[derive(Debug)]
enum TableFold {
    Idle,
    Accumulating(TableDefinition),
}

/// Groups ordered column rows into tables.
///
/// [`push`](TableAggregator::push) hands back the previous table once a row
/// for a new table arrives; [`finish`](TableAggregator::finish) hands back
/// the last one. Rows that would split or interleave tables are rejected.
#[derive(Debug)]
pub struct TableAggregator {
    state: TableFold,
    flushed: HashSet<String>,
}

impl Default for TableAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl TableAggregator {
    pub fn new() -> Self {
        Self {
            state: TableFold::Idle,
            flushed: HashSet::new(),
        }
    }

    /// Add one column row; returns the completed table when the table changes.
    pub fn push(&mut self, row: &ColumnRow) -> Result<Option<TableDefinition>> {
        let column = ColumnDefinition::from_row(row);

        if let TableFold::Accumulating(table) = &mut self.state {
            if table.name == row.table_name {
                let out_of_order = table
                    .columns
                    .last()
                    .map(|prev| prev.ordinal_position > column.ordinal_position)
                    .unwrap_or(false);
                if out_of_order {
                    return Err(MetaError::UnsortedCatalog {
                        table: row.table_name.clone(),
                    });
                }
                table.columns.push(column);
                return Ok(None);
            }
        }

        if self.flushed.contains(&row.table_name) {
            return Err(MetaError::UnsortedCatalog {
                table: row.table_name.clone(),
            });
        }
        let mut table = TableDefinition::new(row.table_name.clone());
        table.columns.push(column);
        let previous = std::mem::replace(&mut self.state, TableFold::Accumulating(table));
        Ok(self.close(previous))
    }

    /// End of input: return the table still being assembled, if any.
    pub fn finish(mut self) -> Option<TableDefinition> {
        let last = std::mem::replace(&mut self.state, TableFold::Idle);
        self.close(last)
    }

    fn close(&mut self, state: TableFold) -> Option<TableDefinition> {
        match state {
            TableFold::Idle => None,
            TableFold::Accumulating(table) => {
                self.flushed.insert(table.name.clone());
                Some(table)
            }
        }
    }
}

/// Writes domain, table and procedure DDL files into one directory.
pub struct MetadataExporter {
    output_dir: PathBuf,
}

impl MetadataExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run all three passes.
    pub async fn export<R>(&self, reader: &mut R) -> Result<ExportReport>
    where
        R: CatalogReader + ?Sized,
    {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut report = ExportReport {
            output_dir: self.output_dir.clone(),
            ..Default::default()
        };

        self.export_domains(reader, &mut report).await?;
        self.export_tables(reader, &mut report).await?;
        self.export_procedures(reader, &mut report).await?;

        info!(
            "Metadata export finished: {} domains, {} tables, {} procedures written to {:?}",
            report.domains, report.tables, report.procedures, self.output_dir
        );
        Ok(report)
    }

    async fn export_domains<R>(&self, reader: &mut R, report: &mut ExportReport) -> Result<()>
    where
        R: CatalogReader + ?Sized,
    {
        for row in reader.domains().await? {
            let domain = DomainDefinition::from_row(&row);
            if domain.type_declaration == UNKNOWN_TYPE {
                warn!(
                    "Domain {} has unsupported field type {}",
                    domain.name, row.field_type.type_code
                );
            }
            let path = self.write_script(&domain.name, &domain.to_ddl())?;
            report.domains += 1;
            report.files.push(path);
        }
        Ok(())
    }

    async fn export_tables<R>(&self, reader: &mut R, report: &mut ExportReport) -> Result<()>
    where
        R: CatalogReader + ?Sized,
    {
        let mut aggregator = TableAggregator::new();
        let mut sink = |row: ColumnRow| -> Result<()> {
            if let Some(table) = aggregator.push(&row)? {
                self.write_table(&table, report)?;
            }
            Ok(())
        };
        reader.scan_table_columns(&mut sink).await?;

        if let Some(table) = aggregator.finish() {
            self.write_table(&table, report)?;
        }
        Ok(())
    }

    async fn export_procedures<R>(&self, reader: &mut R, report: &mut ExportReport) -> Result<()>
    where
        R: CatalogReader + ?Sized,
    {
        for row in reader.procedures().await? {
            match ProcedureDefinition::from_row(&row) {
                Some(procedure) => {
                    let path = self.write_script(&procedure.name, &procedure.to_ddl())?;
                    report.procedures += 1;
                    report.files.push(path);
                }
                None => {
                    debug!("Procedure {} has no source, skipping", row.name);
                    report.skipped_procedures.push(row.name);
                }
            }
        }
        Ok(())
    }

    fn write_table(&self, table: &TableDefinition, report: &mut ExportReport) -> Result<()> {
        for col in table
            .columns
            .iter()
            .filter(|c| c.type_declaration == UNKNOWN_TYPE)
        {
            warn!("Column {}.{} has unsupported field type", table.name, col.name);
        }
        let path = self.write_script(&table.name, &table.to_ddl())?;
        report.tables += 1;
        report.files.push(path);
        Ok(())
    }

    /// Write `<name>.sql`, replacing any existing file of that name.
    fn write_script(&self, name: &str, ddl: &str) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(format!("{}.{}", name, SCRIPT_EXTENSION));
        std::fs::write(&path, ddl.as_bytes())?;
        debug!("Wrote {:?}", path);
        Ok(path)
    }
}
