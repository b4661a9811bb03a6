//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection used by `export` and `update` when no connection string is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionConfig>,

    /// Provisioning defaults for `build`.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Connection to an existing Firebird database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server host (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 3050).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database path or alias on the server.
    pub database: String,

    /// Username (default: "SYSDBA").
    #[serde(default = "default_user")]
    pub user: String,

    /// Password (default: "masterkey").
    #[serde(default = "default_password")]
    pub password: String,
}

impl ConnectionConfig {
    /// Connection to `database` with the default server and credentials.
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: database.into(),
            user: default_user(),
            password: default_password(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Defaults used when `build` provisions a new database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Server host (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 3050).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Administrative user (default: "SYSDBA").
    #[serde(default = "default_user")]
    pub user: String,

    /// Administrative password (default: "masterkey").
    #[serde(default = "default_password")]
    pub password: String,

    /// File name created inside the database directory (default: "database.fdb").
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: default_password(),
            database_file: default_database_file(),
        }
    }
}

impl BuildConfig {
    /// Connection settings for a database file created by `build`.
    pub fn connection_for(&self, database: impl Into<String>) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            database: database.into(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database_file", &self.database_file)
            .finish()
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3050
}

fn default_user() -> String {
    "SYSDBA".to_string()
}

fn default_password() -> String {
    "masterkey".to_string()
}

fn default_database_file() -> String {
    "database.fdb".to_string()
}
