//! Project manifest (`sfdx-project.json`) model and alias merging.
//!
//! The manifest is loaded once per run, mutated in memory, and written
//! back once at the very end. Unrecognized keys — both at the top level
//! and inside package directory entries — are carried through a
//! load/save round trip untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// File name of the project manifest.
pub const MANIFEST_FILE_NAME: &str = "sfdx-project.json";

/// One entry of `packageDirectories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDirectory {
    /// Directory path holding the package contents.
    pub path: String,

    /// Package name this directory builds, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Everything else ("default", "versionNumber", …) passes through.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The project manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SfdxProject {
    /// Declared package directories.
    #[serde(default)]
    pub package_directories: Vec<PackageDirectory>,

    /// `"<name>"` or `"<name>@<version>"` → opaque id.
    #[serde(default)]
    pub package_aliases: BTreeMap<String, String>,

    /// Unrecognized top-level keys ("namespace", "sourceApiVersion", …).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An alias registration, rendered to its canonical string key by
/// [`AliasKey::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasKey {
    /// A package container, keyed by bare name.
    Container { name: String },

    /// One version of a package, keyed by `name@version`.
    Version { name: String, version: String },
}

impl AliasKey {
    /// Canonical alias string for this key.
    pub fn render(&self) -> String {
        match self {
            AliasKey::Container { name } => name.clone(),
            AliasKey::Version { name, version } => format!("{}@{}", name, version),
        }
    }
}

impl std::fmt::Display for AliasKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl SfdxProject {
    /// Record an alias, overwriting any existing entry under the same
    /// key and leaving every other entry alone. Idempotent.
    pub fn record_alias(&mut self, key: &AliasKey, id: &str) {
        self.package_aliases.insert(key.render(), id.to_string());
    }

    /// Path of the directory that builds `package_name`, by exact name
    /// match against the declared directories.
    pub fn package_path(&self, package_name: &str) -> Option<&str> {
        self.package_directories
            .iter()
            .find(|dir| dir.package.as_deref() == Some(package_name))
            .map(|dir| dir.path.as_str())
    }
}

/// Load the manifest from `dir`.
pub fn load(dir: &Path) -> Result<SfdxProject> {
    let contents = std::fs::read_to_string(dir.join(MANIFEST_FILE_NAME))?;
    let project = serde_json::from_str(&contents)?;
    Ok(project)
}

/// Write the manifest back to `dir`, pretty-printed.
pub fn save(dir: &Path, project: &SfdxProject) -> Result<()> {
    let contents = serde_json::to_string_pretty(project)?;
    std::fs::write(dir.join(MANIFEST_FILE_NAME), contents + "\n")?;
    Ok(())
}
