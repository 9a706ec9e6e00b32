//! llms.txt discovery manifest
//!
//! ```yaml
//! version: "1.0"
//! site: example.com
//! content:
//!   - url: /pricing
//!     machine_view: /pricing.llm.md
//! ```
//!
//! Parsed leniently: YAML scalars of any type are accepted for `version` and
//! `site`, and a document that is not a mapping simply has no fields.

use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Well-known path of the discovery manifest
pub const MANIFEST_PATH: &str = "/llms.txt";

/// Parsed discovery manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArwDiscovery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub site: String,
    #[serde(default)]
    pub content: Vec<ContentEntry>,
}

/// One declared page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Human-facing HTML path or absolute URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Machine-readable counterpart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_view: Option<String>,
}

/// A manifest that passed validation, plus non-fatal findings
#[derive(Debug, Clone)]
pub struct ParsedManifest {
    pub discovery: ArwDiscovery,
    pub warnings: Vec<String>,
}

pub fn parse_manifest(text: &str) -> Result<ParsedManifest, ManifestError> {
    if text.trim().is_empty() {
        return Err(ManifestError::MissingSite);
    }

    let root: Value = serde_yaml::from_str(text)?;
    let empty = Mapping::new();
    let map = root.as_mapping().unwrap_or(&empty);

    let mut warnings = Vec::new();

    let version = map.get("version").and_then(scalar_to_string);
    if version.is_none() {
        warnings.push("Missing version field in llms.txt".to_string());
    }

    let site = map
        .get("site")
        .and_then(scalar_to_string)
        .filter(|s| !s.is_empty())
        .ok_or(ManifestError::MissingSite)?;

    let content: Vec<ContentEntry> = map
        .get("content")
        .and_then(Value::as_sequence)
        .map(|entries| entries.iter().map(content_entry).collect())
        .unwrap_or_default();

    Ok(ParsedManifest {
        discovery: ArwDiscovery {
            version,
            site,
            content,
        },
        warnings,
    })
}

fn content_entry(value: &Value) -> ContentEntry {
    ContentEntry {
        url: value
            .get("url")
            .and_then(scalar_to_string)
            .filter(|s| !s.trim().is_empty()),
        machine_view: value
            .get("machine_view")
            .and_then(scalar_to_string)
            .filter(|s| !s.trim().is_empty()),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
