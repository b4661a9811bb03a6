//! Database driver implementations of the core connection traits.
//!
//! - [`firebird`]: Firebird over the pure-Rust wire protocol (`firebird` feature)

#[cfg(feature = "firebird")]
pub mod firebird;

#[cfg(feature = "firebird")]
pub use firebird::{FirebirdConnection, FirebirdProvisioner};
