use crate::manifest::{default_distribution, ApplicationEntry, Manifest, PackageEntry};
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to parse updates JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("no {field} provided for package '{package_id}'")]
    MissingField {
        package_id: String,
        field: &'static str,
    },
}

/// One invocation's worth of requested changes, decoded from the JSON
/// argument. Unknown keys are ignored; producers attach extra metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub package_updates: IndexMap<String, PackageUpdate>,
    #[serde(default)]
    pub application_updates: IndexMap<String, ApplicationUpdate>,
}

/// Requested changes for one package. `checksum`, `version`, and
/// `build_date` are required and checked by [`PackageUpdate::validated`]
/// before any merge happens; `category` passes through as-is, null included.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageUpdate {
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub build_date: Option<String>,
}

/// Requested state for one application. Every field an omitted key would
/// have defaults here, since application entries are replaced wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationUpdate {
    #[serde(default)]
    pub build_date: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub packages: IndexMap<String, serde_yaml_ng::Value>,
}

/// A package update whose required fields are known present and non-empty.
#[derive(Debug)]
pub struct ValidatedPackageUpdate<'a> {
    pub checksum: &'a str,
    pub version: &'a str,
    pub build_date: &'a str,
    pub category: Option<&'a str>,
}

impl PackageUpdate {
    /// Check the required fields, treating an empty string the same as an
    /// absent key.
    pub fn validated(&self, package_id: &str) -> Result<ValidatedPackageUpdate<'_>, UpdateError> {
        Ok(ValidatedPackageUpdate {
            checksum: require(self.checksum.as_deref(), package_id, "checksum")?,
            version: require(self.version.as_deref(), package_id, "version")?,
            build_date: require(self.build_date.as_deref(), package_id, "build date")?,
            category: self.category.as_deref(),
        })
    }
}

fn require<'a>(
    value: Option<&'a str>,
    package_id: &str,
    field: &'static str,
) -> Result<&'a str, UpdateError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(UpdateError::MissingField {
            package_id: package_id.to_owned(),
            field,
        }),
    }
}

pub fn parse_updates_str(input: &str) -> Result<UpdateRequest, UpdateError> {
    Ok(serde_json::from_str(input)?)
}

impl Manifest {
    /// Create or overwrite the package entry for `package_id`.
    ///
    /// A new entry is stamped with the default distribution tag; an existing
    /// entry keeps its `distribution` untouched while the four metadata
    /// fields are overwritten in place.
    pub fn apply_package_update(&mut self, package_id: &str, update: &ValidatedPackageUpdate<'_>) {
        let packages = self.packages.get_or_insert_with(IndexMap::new);
        if let Some(entry) = packages.get_mut(package_id) {
            entry.version = update.version.to_owned();
            entry.checksum_sha256 = update.checksum.to_owned();
            entry.category = update.category.map(str::to_owned);
            entry.build_date = update.build_date.to_owned();
        } else {
            packages.insert(
                package_id.to_owned(),
                PackageEntry {
                    version: update.version.to_owned(),
                    checksum_sha256: update.checksum.to_owned(),
                    category: update.category.map(str::to_owned),
                    build_date: update.build_date.to_owned(),
                    distribution: default_distribution(),
                },
            );
        }
    }

    /// Replace the application entry for `application_id` wholesale.
    ///
    /// Fields omitted from the update are reset to their defaults, not
    /// merged with the prior entry.
    pub fn apply_application_update(&mut self, application_id: &str, update: &ApplicationUpdate) {
        let applications = self.applications.get_or_insert_with(IndexMap::new);
        applications.insert(
            application_id.to_owned(),
            ApplicationEntry {
                build_date: update.build_date.clone(),
                dependencies: update.dependencies.clone(),
                packages: update.packages.clone(),
            },
        );
    }

    /// Apply a full update request: package updates first (validated before
    /// merging), then application updates. The first validation failure
    /// aborts the run, so no partial state can reach the save step.
    pub fn apply_updates(&mut self, request: &UpdateRequest) -> Result<(), UpdateError> {
        for (package_id, update) in &request.package_updates {
            let validated = update.validated(package_id)?;
            self.apply_package_update(package_id, &validated);
        }
        for (application_id, update) in &request.application_updates {
            self.apply_application_update(application_id, update);
        }
        Ok(())
    }
}
