use std::path::PathBuf;
use crate::config::Config;
use crate::error::Result;
use crate::installer::VERSIONS_DIR;
use crate::registry;
use crate::spec::{Toolchain, ToolchainSpec};

/// Location of the persisted default version for a toolchain.
pub fn default_file_path(conf: &Config, name: Toolchain) -> PathBuf {
    conf.root
        .join(VERSIONS_DIR)
        .join(".defaults")
        .join(format!("{}-version", name))
}

/// Returns the fallback version used when no project pins one.
///
/// The first call for a toolchain resolves `latest` from the registry and
/// commits it as the durable default; later calls return the persisted value
/// without touching the network.
pub fn default_version(conf: &Config, name: Toolchain) -> Result<String> {
    let path = default_file_path(conf, name);
    if let Ok(data) = std::fs::read_to_string(&path) {
        let version = data.trim();
        if !version.is_empty() {
            return Ok(version.to_string());
        }
    }

    let latest = registry::get_latest_version(conf, name)?;
    set_default(conf, &latest)?;
    Ok(latest.version)
}

/// Persists `spec.version` as the default for its toolchain, creating parent
/// directories as needed. Overwrites unconditionally.
pub fn set_default(conf: &Config, spec: &ToolchainSpec) -> Result<()> {
    let path = default_file_path(conf, spec.name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &spec.version)?;
    Ok(())
}
