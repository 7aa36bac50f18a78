use std::path::PathBuf;
use anyhow::{bail, Result};
use pmx::config::Config;
use pmx::spec::Toolchain;
use pmx::{defaults, inspector, installer, registry, shims};
use crate::cli::{CLI, PmxCommand};

pub fn execute(conf: &Config, cli: CLI) -> Result<()> {
    match cli.command {
        PmxCommand::UpdateLocal => execute_update_local(conf),
        PmxCommand::UpdateDefault { name } => execute_update_default(conf, name),
        PmxCommand::Pin { name, path } => execute_pin(conf, &name, &path),
        PmxCommand::Setup => Ok(shims::ensure_shims()?),
    }
}

pub fn execute_update_local(conf: &Config) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let Some(found) = inspector::find_spec(&cwd)? else {
        return Err(pmx::error::PmxError::ManifestNotFound.into());
    };

    let latest = registry::get_latest_version(conf, found.spec.name)?;
    if latest.version == found.spec.version {
        println!("Already on latest version {}", latest);
        return Ok(());
    }

    installer::install(conf, &latest)?;
    println!("Updating {} to {}", found.manifest_path.display(), latest);
    inspector::update_spec(&found.manifest_path, &latest)?;
    Ok(())
}

pub fn execute_update_default(conf: &Config, name: Option<String>) -> Result<()> {
    let to_update: Vec<Toolchain> = match name {
        Some(name) => vec![name.parse()?],
        None => Toolchain::ALL.to_vec(),
    };

    for toolchain in to_update {
        let latest = registry::get_latest_version(conf, toolchain)?;
        installer::install(conf, &latest)?;
        defaults::set_default(conf, &latest)?;
        println!("Default for {} is now {}", toolchain, latest.version);
    }
    Ok(())
}

pub fn execute_pin(conf: &Config, name: &str, path: &str) -> Result<()> {
    let toolchain: Toolchain = name.parse()?;

    let abs_path = std::path::absolute(PathBuf::from(path))?;
    let manifest_path = if abs_path.ends_with(inspector::MANIFEST_FILE) {
        abs_path
    } else {
        abs_path.join(inspector::MANIFEST_FILE)
    };
    if !manifest_path.exists() {
        bail!("package.json not found at {}", manifest_path.display());
    }

    let latest = registry::get_latest_version(conf, toolchain)?;
    println!("Pinning {} in {}", latest, manifest_path.display());
    inspector::update_spec(&manifest_path, &latest)?;
    Ok(())
}
