//! Core abstractions shared by the exporter, builder and migration executor.
//!
//! - [`schema`]: Catalog rows and the domain/table/procedure definitions built from them
//! - [`traits`]: Connection traits implemented by database drivers

pub mod schema;
pub mod traits;

pub use schema::{
    ColumnDefinition, ColumnRow, DomainDefinition, DomainRow, ProcedureDefinition, ProcedureRow,
    TableDefinition,
};
pub use traits::{
    CatalogReader, ColumnSink, DatabaseProvisioner, SchemaConnection, TransactionalConnection,
};
