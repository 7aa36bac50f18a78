use std::collections::HashMap;
use std::io::Read;
use serde::Deserialize;
use crate::config::Config;
use crate::error::{PmxError, Result};
use crate::spec::{Toolchain, ToolchainSpec};

/// The slice of an npm packument this tool consumes: the dist-tag map.
#[derive(Debug, Deserialize)]
pub struct Packument {
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
}

/// Resolves the version currently tagged `latest` for a toolchain.
pub fn get_latest_version(conf: &Config, name: Toolchain) -> Result<ToolchainSpec> {
    let url = format!("{}/{}", conf.registry, name);
    let response = reqwest::blocking::get(&url)?;

    if !response.status().is_success() {
        return Err(PmxError::RegistryBadStatus {
            status: response.status(),
            url,
        });
    }

    let packument: Packument = response.json()?;
    let version = packument
        .dist_tags
        .get("latest")
        .ok_or_else(|| PmxError::MissingLatestTag(name.to_string()))?;

    Ok(ToolchainSpec::new(name, version.clone()))
}

/// Streams the registry tarball for an exact version.
///
/// The returned body is read incrementally by the extractor; nothing is
/// buffered here.
pub fn download_tarball(conf: &Config, spec: &ToolchainSpec) -> Result<impl Read> {
    fetch_stream(format!(
        "{}/{}/-/{}-{}.tgz",
        conf.registry, spec.name, spec.name, spec.version
    ))
}

/// Downloads bun's release zip for the host platform.
///
/// Bun is not distributed as a registry tarball; each version publishes one
/// native binary archive per OS/architecture pair.
pub fn download_release_binary(spec: &ToolchainSpec) -> Result<impl Read> {
    fetch_stream(release_binary_url(
        spec,
        std::env::consts::OS,
        std::env::consts::ARCH,
    ))
}

/// URL of a bun release archive for the given platform identifiers.
pub fn release_binary_url(spec: &ToolchainSpec, os: &str, arch: &str) -> String {
    let arch = match arch {
        "x86_64" => "x64",
        other => other,
    };
    format!(
        "https://github.com/oven-sh/bun/releases/download/bun-v{}/bun-{}-{}.zip",
        spec.version, os, arch
    )
}

fn fetch_stream(url: String) -> Result<impl Read> {
    let response = reqwest::blocking::get(&url)?;
    if !response.status().is_success() {
        return Err(PmxError::RegistryBadStatus {
            status: response.status(),
            url,
        });
    }
    Ok(response)
}
