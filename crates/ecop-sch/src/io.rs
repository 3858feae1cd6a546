//! JSON document IO for the CLI and test harnesses.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonFileError {
    #[error("JSON file not found: {0}")]
    NotFound(PathBuf),

    #[error("Error reading file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot serialize data to JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Error writing to file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read and deserialize a JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, JsonFileError> {
    if !path.exists() {
        return Err(JsonFileError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| JsonFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| JsonFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` to `path`, creating parent directories.
///
/// The file is replaced atomically so a consumer never observes a half
/// written document.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), JsonFileError> {
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');

    let write_err = |source| JsonFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(contents.as_bytes())?;
            f.flush()
        })
        .map_err(|err| match err {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => write_err(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, CommandsDoc};

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/commands.json");
        let doc = CommandsDoc::new(vec![Command::create_net("GND")]);

        write_json(&path, &doc).unwrap();
        let loaded: CommandsDoc = load_json(&path).unwrap();
        assert_eq!(loaded, doc);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"commands\""));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_json::<CommandsDoc>(&missing),
            Err(JsonFileError::NotFound(_))
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{\"commands\": [").unwrap();
        let err = load_json::<CommandsDoc>(&broken).unwrap_err();
        assert!(matches!(err, JsonFileError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
