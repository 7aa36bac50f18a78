use std::path::{Path, PathBuf};
use serde::Deserialize;
use serde_json::Value;
use crate::error::{PmxError, Result};
use crate::spec::{FoundSpec, ToolchainSpec};

pub const MANIFEST_FILE: &str = "package.json";
pub const SPEC_FIELD: &str = "packageManager";

/// Only the field the finder cares about; everything else in the manifest is
/// ignored on the read path.
#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "packageManager")]
    package_manager: Option<String>,
}

/// Walks from `start` up to the filesystem root looking for the nearest
/// `package.json` that declares a `packageManager` spec.
///
/// Manifests without the field, and directories without a manifest, are
/// skipped silently. A manifest whose JSON or spec string is malformed stops
/// the search with an error naming the offending file. `Ok(None)` means no
/// ancestor declares a spec.
pub fn find_spec(start: &Path) -> Result<Option<FoundSpec>> {
    for dir in start.ancestors() {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            continue;
        }
        if let Some(spec) = load_spec(&manifest_path).map_err(|e| PmxError::ManifestParse {
            path: manifest_path.clone(),
            source: Box::new(e),
        })? {
            return Ok(Some(FoundSpec {
                manifest_path,
                spec,
            }));
        }
    }
    Ok(None)
}

fn load_spec(path: &Path) -> Result<Option<ToolchainSpec>> {
    let data = std::fs::read_to_string(path)?;
    let manifest: Manifest = serde_json::from_str(&data)?;
    match manifest.package_manager {
        Some(field) if !field.is_empty() => Ok(Some(ToolchainSpec::parse(&field)?)),
        _ => Ok(None),
    }
}

/// Rewrites only the `packageManager` field of the manifest at `path`.
///
/// The file is handled as a generic ordered JSON object rather than a typed
/// schema, so unknown fields survive, sibling key order is untouched, and
/// string values keep their exact characters. The original trailing-newline
/// convention is kept.
pub fn update_spec(path: &Path, spec: &ToolchainSpec) -> Result<()> {
    let data = std::fs::read_to_string(path)?;
    let mut manifest: Value = serde_json::from_str(&data)?;

    let Some(object) = manifest.as_object_mut() else {
        use serde::de::Error as _;
        return Err(PmxError::Json(serde_json::Error::custom(format!(
            "{} is not a JSON object",
            path.display()
        ))));
    };
    object.insert(SPEC_FIELD.to_string(), Value::String(spec.to_string()));

    let mut output = serde_json::to_string_pretty(&manifest)?;
    if data.ends_with('\n') {
        output.push('\n');
    }
    std::fs::write(path, output)?;
    Ok(())
}
