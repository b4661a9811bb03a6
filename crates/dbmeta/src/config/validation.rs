//! Configuration validation.

use super::{BuildConfig, Config, ConnectionConfig};
use crate::error::{MetaError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if let Some(conn) = &config.connection {
        validate_connection(conn, "connection")?;
    }
    validate_build(&config.build)
}

/// Validate a single connection section.
pub fn validate_connection(conn: &ConnectionConfig, section: &str) -> Result<()> {
    if conn.host.is_empty() {
        return Err(MetaError::Config(format!("{}.host is required", section)));
    }
    if conn.port == 0 {
        return Err(MetaError::Config(format!("{}.port must be non-zero", section)));
    }
    if conn.database.is_empty() {
        return Err(MetaError::Config(format!("{}.database is required", section)));
    }
    if conn.user.is_empty() {
        return Err(MetaError::Config(format!("{}.user is required", section)));
    }
    Ok(())
}

fn validate_build(build: &BuildConfig) -> Result<()> {
    if build.host.is_empty() {
        return Err(MetaError::Config("build.host is required".into()));
    }
    if build.port == 0 {
        return Err(MetaError::Config("build.port must be non-zero".into()));
    }
    if build.user.is_empty() {
        return Err(MetaError::Config("build.user is required".into()));
    }
    if build.database_file.is_empty()
        || build.database_file.contains('/')
        || build.database_file.contains('\\')
    {
        return Err(MetaError::Config(format!(
            "build.database_file must be a plain file name, got '{}'",
            build.database_file
        )));
    }
    Ok(())
}
