//! Parsing of `Key=Value;...` connection strings.
//!
//! Accepts the Firebird ADO.NET style, e.g.
//! `DataSource=localhost;Port=3050;Database=/db/app.fdb;User=SYSDBA;Password=masterkey`.

use tracing::debug;

use super::ConnectionConfig;
use crate::error::{MetaError, Result};

impl ConnectionConfig {
    /// Parse a connection string. Keys are case-insensitive and may contain spaces.
    pub fn parse(connection_string: &str) -> Result<Self> {
        let mut database = None;
        let mut config = ConnectionConfig::for_database("");

        for part in connection_string.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part.split_once('=').ok_or_else(|| {
                MetaError::Config(format!("connection string entry '{}' has no '='", part))
            })?;
            let key: String = key
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            let value = value.trim().to_string();

            match key.as_str() {
                "datasource" | "server" | "host" => config.host = value,
                "port" => {
                    config.port = value.parse().map_err(|_| {
                        MetaError::Config(format!("invalid port '{}' in connection string", value))
                    })?
                }
                "database" | "initialcatalog" => database = Some(value),
                "user" | "userid" | "username" => config.user = value,
                "password" | "pwd" => config.password = value,
                _ => debug!("Ignoring connection string option '{}'", key),
            }
        }

        config.database = database
            .filter(|d| !d.is_empty())
            .ok_or_else(|| MetaError::Config("connection string has no Database".into()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_string() {
        let config = ConnectionConfig::parse(
            "DataSource=db.internal;Port=3051;Database=/var/db/app.fdb;User=APP;Password=s3cr=t;Charset=WIN1250",
        )
        .unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 3051);
        assert_eq!(config.database, "/var/db/app.fdb");
        assert_eq!(config.user, "APP");
        assert_eq!(config.password, "s3cr=t");
    }

    #[test]
    fn test_parse_defaults_and_aliases() {
        let config =
            ConnectionConfig::parse("data source = localhost; initial catalog=C:\\db\\x.fdb; user id=sysdba; ServerType=0;")
                .unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3050);
        assert_eq!(config.database, "C:\\db\\x.fdb");
        assert_eq!(config.user, "sysdba");
        assert_eq!(config.password, "masterkey");
    }

    #[test]
    fn test_missing_database() {
        let err = ConnectionConfig::parse("DataSource=localhost;User=SYSDBA").unwrap_err();
        assert!(matches!(err, MetaError::Config(_)));
    }

    #[test]
    fn test_invalid_entries() {
        assert!(ConnectionConfig::parse("Database=/x.fdb;garbage").is_err());
        assert!(ConnectionConfig::parse("Database=/x.fdb;Port=abc").is_err());
    }
}
