//! Manifest schema, YAML persistence, and update merging for binstamp.
//!
//! This crate defines the document layer: the typed `manifest.yaml` schema
//! (`Manifest`, `PackageEntry`, `ApplicationEntry`), change-gated
//! persistence (`save_if_changed`), and the update-request model with its
//! merge operations (`UpdateRequest`, `Manifest::apply_updates`).

pub mod manifest;
pub mod update;

pub use manifest::{
    default_distribution, parse_manifest_file, parse_manifest_str, save_if_changed,
    ApplicationEntry, Manifest, ManifestError, PackageEntry, DEFAULT_DISTRIBUTION,
};
pub use update::{
    parse_updates_str, ApplicationUpdate, PackageUpdate, UpdateError, UpdateRequest,
    ValidatedPackageUpdate,
};
