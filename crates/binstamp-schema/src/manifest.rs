use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Distribution tag stamped onto newly created package entries.
pub const DEFAULT_DISTRIBUTION: &str = "bookworm";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
    #[error("failed to serialize manifest: {0}")]
    Serialize(serde_yaml_ng::Error),
}

/// The root manifest document: two keyed sections, each absent until the
/// first entry of its kind is recorded.
///
/// Mapping keys keep their first-insertion order through parse and
/// serialize; the serializer never reorders entries.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<IndexMap<String, PackageEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications: Option<IndexMap<String, ApplicationEntry>>,
}

/// Build metadata for one binary package.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageEntry {
    pub version: String,
    pub checksum_sha256: String,
    /// Unvalidated upstream category; null when the producer sent none.
    #[serde(default)]
    pub category: Option<String>,
    pub build_date: String,
    /// Set once at creation time, never modified by later updates.
    pub distribution: Vec<String>,
}

/// Build metadata for one application, recomputed wholesale on every update.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ApplicationEntry {
    #[serde(default)]
    pub build_date: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub packages: IndexMap<String, serde_yaml_ng::Value>,
}

pub fn default_distribution() -> Vec<String> {
    vec![DEFAULT_DISTRIBUTION.to_owned()]
}

pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    Ok(serde_yaml_ng::from_str(input)?)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}

/// Persist `updated` to `path` only if it differs structurally from
/// `original`. Returns whether a write happened.
///
/// The write goes through a temp file in the destination directory and a
/// rename, so a crash mid-save never leaves a truncated manifest behind.
pub fn save_if_changed(
    original: &Manifest,
    updated: &Manifest,
    path: impl AsRef<Path>,
) -> Result<bool, ManifestError> {
    if original == updated {
        return Ok(false);
    }

    let path = path.as_ref();
    let content = serde_yaml_ng::to_string(updated).map_err(ManifestError::Serialize)?;
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ManifestError::Io(e.error))?;
    // Fsync parent directory to ensure rename durability on power loss.
    if let Ok(f) = fs::File::open(dir) {
        let _ = f.sync_all();
    }
    Ok(true)
}
