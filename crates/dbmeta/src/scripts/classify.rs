//! Script classification by leading DDL statement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dependency category of a DDL script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScriptCategory {
    Domain,
    Table,
    Procedure,
    Unrecognized,
}

impl ScriptCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptCategory::Domain => "DOMAIN",
            ScriptCategory::Table => "TABLE",
            ScriptCategory::Procedure => "PROCEDURE",
            ScriptCategory::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for ScriptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statement prefixes checked in order; the first match decides the category.
pub const STATEMENT_PREFIXES: &[(&str, ScriptCategory)] = &[
    ("CREATE DOMAIN", ScriptCategory::Domain),
    ("CREATE TABLE", ScriptCategory::Table),
    ("ALTER TABLE", ScriptCategory::Table),
    ("CREATE OR ALTER TABLE", ScriptCategory::Table),
    ("CREATE PROCEDURE", ScriptCategory::Procedure),
    ("ALTER PROCEDURE", ScriptCategory::Procedure),
    ("CREATE OR ALTER PROCEDURE", ScriptCategory::Procedure),
];

/// Classify a script by the statement it starts with.
pub fn classify(script: &str) -> ScriptCategory {
    let normalized = script.trim_start().to_uppercase();
    STATEMENT_PREFIXES
        .iter()
        .find(|(prefix, _)| normalized.starts_with(prefix))
        .map(|(_, category)| *category)
        .unwrap_or(ScriptCategory::Unrecognized)
}
