//! Loading and classifying `.sql` script files.

mod classify;

pub use classify::{classify, ScriptCategory, STATEMENT_PREFIXES};

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Extension of script files picked up from a scripts directory.
pub const SCRIPT_EXTENSION: &str = "sql";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A script read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub path: PathBuf,
    pub raw_text: String,
}

impl ScriptFile {
    pub fn new(path: impl Into<PathBuf>, raw_text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            raw_text: raw_text.into(),
        }
    }

    /// File name used in logs and reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A script together with its dependency category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedScript {
    pub script: ScriptFile,
    pub category: ScriptCategory,
}

impl ClassifiedScript {
    pub fn new(script: ScriptFile) -> Self {
        let category = classify(&script.raw_text);
        Self { script, category }
    }
}

/// A script that failed to execute, with the driver's message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFailure {
    pub file: String,
    pub message: String,
}

/// Read every `.sql` file directly inside `dir`, sorted by file name.
pub fn load_scripts(dir: &Path) -> Result<Vec<ScriptFile>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        let is_script = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION))
            .unwrap_or(false);
        if is_script {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut scripts = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = std::fs::read(&path)?;
        let raw_text = decode_script(&path, &bytes);
        debug!("Loaded script {:?} ({} bytes)", path, bytes.len());
        scripts.push(ScriptFile { path, raw_text });
    }
    Ok(scripts)
}

/// Decode script bytes as UTF-8, dropping a leading byte-order mark.
///
/// Invalid sequences become U+FFFD so one badly encoded file cannot keep
/// the remaining scripts from running.
fn decode_script(path: &Path, bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!("Script {:?} is not valid UTF-8; invalid bytes replaced", path);
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_scripts_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_table.sql"), "CREATE TABLE B (x integer);").unwrap();
        std::fs::write(dir.path().join("a_domain.SQL"), "CREATE DOMAIN D integer;").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a script").unwrap();
        std::fs::create_dir(dir.path().join("nested.sql")).unwrap();

        let scripts = load_scripts(dir.path()).unwrap();
        let names: Vec<String> = scripts.iter().map(|s| s.file_name()).collect();
        assert_eq!(names, vec!["a_domain.SQL", "b_table.sql"]);
        assert_eq!(scripts[1].raw_text, "CREATE TABLE B (x integer);");
    }

    #[test]
    fn test_load_scripts_strips_byte_order_mark() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("a.sql"),
            "\u{FEFF}CREATE DOMAIN D_ID INTEGER;",
        )
        .unwrap();

        let scripts = load_scripts(dir.path()).unwrap();
        assert_eq!(scripts[0].raw_text, "CREATE DOMAIN D_ID INTEGER;");
        assert_eq!(classify(&scripts[0].raw_text), ScriptCategory::Domain);
    }

    #[test]
    fn test_load_scripts_decodes_invalid_utf8_lossily() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("1.sql"), "CREATE DOMAIN D_ID INTEGER;").unwrap();
        // Windows-1250 encoded comment
        std::fs::write(
            dir.path().join("2.sql"),
            b"CREATE TABLE T (ID D_ID); /* \xE8\xE1st */",
        )
        .unwrap();

        let scripts = load_scripts(dir.path()).unwrap();
        assert_eq!(scripts.len(), 2);
        assert!(scripts[1].raw_text.starts_with("CREATE TABLE T (ID D_ID);"));
        assert!(scripts[1].raw_text.contains('\u{FFFD}'));
        assert_eq!(classify(&scripts[1].raw_text), ScriptCategory::Table);
    }

    #[test]
    fn test_load_scripts_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_scripts(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, crate::error::MetaError::Io(_)));
    }

    #[test]
    fn test_classified_script() {
        let script = ScriptFile::new("/tmp/x/010_domain.sql", "create domain D_ID integer;");
        let classified = ClassifiedScript::new(script);
        assert_eq!(classified.category, ScriptCategory::Domain);
        assert_eq!(classified.script.file_name(), "010_domain.sql");
    }
}
