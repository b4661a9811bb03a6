//! # dbmeta
//!
//! Firebird schema lifecycle library.
//!
//! Three operations are provided:
//!
//! - **build**: create an empty database and run bootstrap scripts against it,
//!   reporting each script's outcome
//! - **export**: write every domain, table and procedure as its own `.sql` file
//! - **update**: apply domain, table and procedure scripts, in that order,
//!   inside one transaction that is rolled back on the first failure
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbmeta::{ops, ConnectionConfig, FirebirdConnection};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> dbmeta::Result<()> {
//!     let config = ConnectionConfig::parse("DataSource=localhost;Database=/db/app.fdb")?;
//!     let result = ops::update(FirebirdConnection::connect(&config), Path::new("scripts")).await?;
//!     println!("Applied {} scripts", result.applied.len());
//!     Ok(())
//! }
//! ```

pub mod build;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod export;
pub mod migrate;
pub mod ops;
pub mod scripts;
pub mod typemap;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use build::{BuildReport, SchemaBuilder};
pub use config::{BuildConfig, Config, ConnectionConfig};
pub use error::{MetaError, Result};
pub use export::{ExportReport, MetadataExporter};
pub use migrate::{MigrationExecutor, MigrationPlan, MigrationResult};
pub use scripts::{classify, ScriptCategory, ScriptFile};
pub use typemap::{map_type, FieldTypeDescriptor};

#[cfg(feature = "firebird")]
pub use drivers::{FirebirdConnection, FirebirdProvisioner};
