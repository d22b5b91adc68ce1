//! Manifest output
//!
//! Serializes an assembled [`ManifestSchema`] to JSON and writes it to disk.

use crate::errors::ManifestError;
use crate::types::ManifestSchema;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Serialize a manifest, pretty-printed or on a single line
pub fn to_json_string(manifest: &ManifestSchema, pretty: bool) -> Result<String, ManifestError> {
    let mut content = if pretty {
        serde_json::to_string_pretty(manifest)?
    } else {
        serde_json::to_string(manifest)?
    };
    content.push('\n');
    Ok(content)
}

/// Write a manifest to `output_path` with an atomic write
pub fn write_to_path(manifest: &ManifestSchema, output_path: &Path, pretty: bool) -> Result<(), ManifestError> {
    debug!("Writing manifest to: {:?}", output_path);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = to_json_string(manifest, pretty)?;

    let temp_path = output_path.with_extension("json.tmp");
    {
        let file = fs::File::create(&temp_path)?;
        let mut writer = std::io::BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
    }
    fs::rename(&temp_path, output_path)?;

    info!("Manifest written to: {:?}", output_path);
    Ok(())
}

/// Read a previously written manifest
pub fn read_from_path(manifest_path: &Path) -> Result<ManifestSchema, ManifestError> {
    debug!("Reading manifest from: {:?}", manifest_path);

    let content = fs::read_to_string(manifest_path)?;
    let manifest: ManifestSchema = serde_json::from_str(&content)?;

    info!(
        "Manifest loaded: '{}' ({} functions)",
        manifest.display_information.name,
        manifest.functions.as_ref().map_or(0, |f| f.len())
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use crate::definition::ManifestDefinition;
    use crate::function::SlackFunction;
    use crate::manifest_writer::*;
    use crate::registry::ManifestRegistry;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample() -> ManifestSchema {
        let definition = ManifestDefinition::new("Foo", "A test app", "icon.png")
            .with_bot_scopes(["chat:write"])
            .with_function(Arc::new(SlackFunction::new("greet", "functions/greet.ts")));
        match ManifestRegistry::new(definition).and_then(|registry| registry.export()) {
            Ok(manifest) => manifest,
            Err(e) => panic!("registry failed: {e}"),
        }
    }

    #[test]
    fn test_compact_output_is_single_line() {
        let manifest = sample();
        let compact = to_json_string(&manifest, false).unwrap_or_default();
        let pretty = to_json_string(&manifest, true).unwrap_or_default();

        assert_eq!(compact.lines().count(), 1);
        assert!(pretty.lines().count() > 1);
        assert!(compact.contains("\"function_runtime\":\"slack\""));
    }

    #[test]
    fn test_write_and_read_custom_path() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let manifest_path = temp_dir.path().join("out").join("manifest.json");

        assert!(
            write_to_path(&sample(), &manifest_path, true).is_ok(),
            "Failed to write manifest"
        );
        assert!(!manifest_path.with_extension("json.tmp").exists());

        let loaded = read_from_path(&manifest_path);
        assert!(loaded.is_ok(), "Failed to read manifest");
        let Ok(loaded) = loaded else {
            return;
        };
        assert_eq!(loaded.display_information.name, "Foo");
        assert_eq!(loaded.oauth_config.scopes.bot, vec!["chat:write"]);
        assert!(loaded.functions.is_some_and(|f| f.contains_key("greet")));
    }
}
