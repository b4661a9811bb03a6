//! Firebird driver.
//!
//! - [`FirebirdConnection`]: catalog reader and (transactional) schema connection
//! - [`FirebirdProvisioner`]: creates empty databases for `build`

mod catalog;
mod connection;

pub use catalog::{COLUMNS_QUERY, DOMAINS_QUERY, PROCEDURES_QUERY};
pub use connection::{FirebirdConnection, FirebirdProvisioner};
