use super::{json_pretty, EXIT_SUCCESS};
use binstamp_schema::manifest::{parse_manifest_file, save_if_changed};
use binstamp_schema::update::parse_updates_str;
use std::path::Path;
use tracing::{debug, info};

pub fn run(repo_path: &Path, updates_json: &str, json: bool) -> Result<u8, String> {
    let request = parse_updates_str(updates_json).map_err(|e| e.to_string())?;

    let manifest_path = repo_path.join("manifest.yaml");
    if !manifest_path.is_file() {
        return Err(format!(
            "manifest file '{}' does not exist",
            manifest_path.display()
        ));
    }

    debug!("loading manifest from {}", manifest_path.display());
    let original = parse_manifest_file(&manifest_path).map_err(|e| e.to_string())?;

    debug!(
        "applying {} package update(s) and {} application update(s)",
        request.package_updates.len(),
        request.application_updates.len()
    );
    let mut updated = original.clone();
    updated.apply_updates(&request).map_err(|e| e.to_string())?;

    let changed =
        save_if_changed(&original, &updated, &manifest_path).map_err(|e| e.to_string())?;
    if changed {
        info!("changes detected, saved {}", manifest_path.display());
    } else {
        info!("no changes detected, skipping save");
    }

    if json {
        let payload = serde_json::json!({
            "changed": changed,
            "manifest": manifest_path,
            "packages_updated": request.package_updates.len(),
            "applications_updated": request.application_updates.len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else if changed {
        println!("updated manifest at {}", manifest_path.display());
    } else {
        println!("no changes for {}", manifest_path.display());
    }

    Ok(EXIT_SUCCESS)
}
