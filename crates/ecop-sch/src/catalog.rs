//! Part catalog index.
//!
//! The catalog is a hand-maintained JSON file of the shape
//! `{"parts": {part_id: {"pins": [...], "set_value": bool, "fusion_add": "..."}}}`.
//! Loading is tolerant where the file is merely sloppy (missing pins,
//! mismatched ids) and strict where a part could not be added downstream
//! (missing `fusion_add`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error types for catalog loading. All of them are fatal.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid catalog structure: {0}")]
    InvalidStructure(&'static str),

    #[error("Part '{0}' is missing required 'fusion_add' field")]
    MissingAddDirective(String),

    #[error("Part '{0}' fusion_add must be a string")]
    InvalidAddDirective(String),

    #[error("Part '{0}' pins must be a list of strings")]
    InvalidPins(String),
}

/// A placeable part definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub pins: Vec<String>,
    /// Whether `set_value` is permitted on instances of this part.
    #[serde(rename = "set_value")]
    pub allows_value: bool,
    /// Opaque add directive handed verbatim to the execution layer.
    #[serde(rename = "fusion_add")]
    pub add_directive: String,
    /// Component family (`resistor`, `ic`, ...), used for sizing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Part {
    pub fn has_pin(&self, pin: &str) -> bool {
        self.pins.iter().any(|p| p == pin)
    }
}

/// Part catalog keyed by part id. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    parts: BTreeMap<String, Part>,
    warnings: Vec<String>,
}

impl Catalog {
    /// Load and index a catalog file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let Value::Object(mut root) = value else {
            return Err(CatalogError::InvalidStructure("catalog root must be a JSON object"));
        };
        let parts = match root.remove("parts") {
            Some(Value::Object(parts)) => parts,
            Some(_) => {
                return Err(CatalogError::InvalidStructure(
                    "catalog 'parts' must be an object",
                ));
            }
            None => {
                return Err(CatalogError::InvalidStructure(
                    "catalog must contain a 'parts' key",
                ));
            }
        };

        let mut catalog = Catalog::default();
        for (part_id, entry) in parts {
            let Value::Object(entry) = entry else {
                catalog.warn(format!("Part '{part_id}' is not an object, skipping"));
                continue;
            };

            if let Some(declared) = entry.get("catalog_id") {
                if declared.as_str() != Some(part_id.as_str()) {
                    catalog.warn(format!(
                        "Part key '{part_id}' does not match catalog_id {declared}"
                    ));
                }
            }

            let add_directive = match entry.get("fusion_add") {
                Some(Value::String(directive)) => directive.clone(),
                Some(_) => return Err(CatalogError::InvalidAddDirective(part_id)),
                None => return Err(CatalogError::MissingAddDirective(part_id)),
            };

            let pins = match entry.get("pins") {
                None | Some(Value::Null) => {
                    catalog.warn(format!("Part '{part_id}' missing pins, defaulting to []"));
                    Vec::new()
                }
                Some(Value::Array(items)) => {
                    let mut pins = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(pin) => pins.push(pin.clone()),
                            _ => return Err(CatalogError::InvalidPins(part_id)),
                        }
                    }
                    pins
                }
                Some(_) => return Err(CatalogError::InvalidPins(part_id)),
            };

            let allows_value = entry
                .get("set_value")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let kind = entry.get("kind").and_then(Value::as_str).map(str::to_owned);

            catalog.parts.insert(
                part_id.clone(),
                Part {
                    id: part_id,
                    pins,
                    allows_value,
                    add_directive,
                    kind,
                },
            );
        }

        Ok(catalog)
    }

    /// Build a catalog from already validated parts.
    pub fn from_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        Self {
            parts: parts.into_iter().map(|p| (p.id.clone(), p)).collect(),
            warnings: Vec::new(),
        }
    }

    pub fn lookup(&self, part_id: &str) -> Option<&Part> {
        self.parts.get(part_id)
    }

    pub fn contains(&self, part_id: &str) -> bool {
        self.parts.contains_key(part_id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parts in part-id order.
    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Non-fatal issues found while loading.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}
