//! Specification document assembly and output.

use crate::collect::{self, Skipped};
use crate::config::Overrides;
use crate::doclet::{self, Doclet};
use crate::mapper::PackageInfo;
use crate::node::Children;
use crate::transform::{self, Tree};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Version of the document format itself.
pub const FORMAT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub spec: FormatInfo,
    pub info: Info,
    #[serde(default)]
    pub entries: Children,
    #[serde(default)]
    pub definitions: Children,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl Specification {
    /// Two-space indented JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize specification")
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid specification document")
    }
}

/// Wrap a finished tree and package metadata into a document. A set
/// override always wins, even when it is empty.
pub fn specification(tree: Tree, package: Option<&PackageInfo>, overrides: &Overrides) -> Specification {
    let package = package.cloned().unwrap_or_default();
    Specification {
        spec: FormatInfo {
            version: FORMAT_VERSION.to_string(),
        },
        info: Info {
            name: overrides.name.clone().or(package.name),
            description: overrides.description.clone().or(package.description),
            version: overrides.version.clone().or(package.version),
            license: overrides.license.clone().or(package.license),
        },
        entries: tree.entries,
        definitions: tree.definitions,
    }
}

/// Output of a full run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub spec: Specification,
    pub skipped: Vec<Skipped>,
}

/// Run the whole pipeline over raw doclets.
pub fn generate(doclets: Vec<Doclet>, overrides: &Overrides) -> Generated {
    let doclets = doclet::filter_doclets(doclets);
    let collected = collect::collect(&doclets);
    let tree = transform::transform(collected.table);
    Generated {
        spec: specification(tree, collected.package.as_ref(), overrides),
        skipped: collected.skipped,
    }
}

/// Write serialized output to `destination`.
pub fn write(text: &str, destination: &Path) -> Result<()> {
    fs::write(destination, text)
        .with_context(|| format!("failed to write {}", destination.display()))
}
