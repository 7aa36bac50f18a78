use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use flate2::read::GzDecoder;
use serde::Deserialize;
use crate::config::Config;
use crate::error::{PmxError, Result};
use crate::inspector::MANIFEST_FILE;
use crate::registry;
use crate::spec::{Distribution, ToolchainSpec};

pub const VERSIONS_DIR: &str = "installed-versions";

/// The slice of an installed toolchain's `package.json` the dispatcher needs:
/// the command-name to script-path map.
#[derive(Debug, Deserialize)]
struct InstalledManifest {
    #[serde(default)]
    bin: HashMap<String, String>,
}

/// Deterministic location of an installed version. Pure, no I/O.
pub fn install_path(conf: &Config, spec: &ToolchainSpec) -> PathBuf {
    conf.root
        .join(VERSIONS_DIR)
        .join(format!("{}-{}", spec.name, spec.version))
}

/// Existence of the marker file is the sole idempotence signal: the installed
/// `package.json` for interpreted toolchains, the binary itself for
/// single-binary ones.
pub fn is_installed(conf: &Config, spec: &ToolchainSpec) -> bool {
    let path = install_path(conf, spec);
    let marker = match spec.name.distribution() {
        Distribution::SingleBinary { binary } => path.join(binary),
        Distribution::Interpreted { .. } => path.join(MANIFEST_FILE),
    };
    marker.exists()
}

/// Materializes a toolchain version in the shared cache. No-op when the
/// marker file already exists, so a second install performs no network I/O.
///
/// The archive is extracted into a fresh temporary sibling directory and then
/// renamed into place, so an interrupted install never leaves a directory
/// that reads as installed.
pub fn install(conf: &Config, spec: &ToolchainSpec) -> Result<()> {
    if is_installed(conf, spec) {
        return Ok(());
    }

    println!("Installing {}...", spec);

    let versions_dir = conf.root.join(VERSIONS_DIR);
    std::fs::create_dir_all(&versions_dir)?;
    let staging = tempfile::Builder::new()
        .prefix(&format!(".{}-{}.", spec.name, spec.version))
        .tempdir_in(&versions_dir)?;

    match spec.name.distribution() {
        Distribution::Interpreted { .. } => {
            let body = registry::download_tarball(conf, spec)
                .map_err(|e| download_failed(spec, e))?;
            extract_tar_gz(body, staging.path()).map_err(|e| extract_failed(spec, e.into()))?;
        }
        Distribution::SingleBinary { binary } => {
            let mut body = registry::download_release_binary(spec)
                .map_err(|e| download_failed(spec, e))?;
            // Zip needs random access, so the whole archive is buffered.
            let mut bytes = Vec::new();
            body.read_to_end(&mut bytes)
                .map_err(|e| download_failed(spec, e.into()))?;
            extract_zip(&bytes, staging.path()).map_err(|e| extract_failed(spec, e.into()))?;
            // Some release channels ship the binary without its exec bit.
            force_executable(&staging.path().join(binary))?;
        }
    }

    let dest = install_path(conf, spec);
    if dest.exists() {
        std::fs::remove_dir_all(&dest)?;
    }
    std::fs::rename(staging.keep(), &dest)?;
    Ok(())
}

/// Resolves the concrete file to run for `command` inside an installed
/// version. Single-binary toolchains have one fixed binary regardless of the
/// invoked name; interpreted ones declare their commands in the installed
/// manifest's `bin` map.
pub fn executable_path(conf: &Config, spec: &ToolchainSpec, command: &str) -> Result<PathBuf> {
    let path = install_path(conf, spec);
    match spec.name.distribution() {
        Distribution::SingleBinary { binary } => Ok(path.join(binary)),
        Distribution::Interpreted { .. } => {
            let data = std::fs::read_to_string(path.join(MANIFEST_FILE))?;
            let manifest: InstalledManifest = serde_json::from_str(&data)?;
            let rel_path = manifest
                .bin
                .get(command)
                .ok_or_else(|| PmxError::ExecutableNotDeclared(command.to_string()))?;
            Ok(path.join(rel_path))
        }
    }
}

fn download_failed(spec: &ToolchainSpec, source: PmxError) -> PmxError {
    PmxError::ArchiveDownloadFailed {
        spec: spec.to_string(),
        source: Box::new(source),
    }
}

fn extract_failed(spec: &ToolchainSpec, source: Box<dyn std::error::Error + Send + Sync>) -> PmxError {
    PmxError::ArchiveExtractFailed {
        spec: spec.to_string(),
        source,
    }
}

/// Drops the leading path segment of an archive entry. Distribution archives
/// wrap everything in one top-level directory; entries with nothing left
/// after stripping (the top-level directory itself) yield `None`.
fn strip_first_segment(path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    components.next()?;
    let rest: PathBuf = components
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    if rest.as_os_str().is_empty() {
        None
    } else {
        Some(rest)
    }
}

fn extract_tar_gz(stream: impl Read, dest: &Path) -> std::io::Result<()> {
    let decoder = GzDecoder::new(stream);
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_permissions(true);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        let Some(rel_path) = strip_first_segment(&entry_path) else {
            continue;
        };
        let target = dest.join(rel_path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // `unpack` creates directories and restores the recorded file mode.
        entry.unpack(&target)?;
    }
    Ok(())
}

fn extract_zip(bytes: &[u8], dest: &Path) -> zip::result::ZipResult<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let Some(entry_path) = file.enclosed_name() else {
            continue;
        };
        let Some(rel_path) = strip_first_segment(&entry_path) else {
            continue;
        };
        let target = dest.join(rel_path);

        if file.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&target)?;
        std::io::copy(&mut file, &mut out)?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn force_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn force_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Toolchain;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    fn test_config(root: &Path) -> Config {
        Config {
            registry: "http://127.0.0.1:1".to_string(),
            root: root.to_path_buf(),
            ignore_spec_mismatch: false,
        }
    }

    /// Builds a gzipped tarball the way npm publishes them: everything under
    /// one `package/` directory.
    fn build_tarball(entries: &[(&str, &str, u32)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut dir = tar::Header::new_gnu();
        dir.set_entry_type(tar::EntryType::Directory);
        dir.set_size(0);
        dir.set_mode(0o755);
        dir.set_cksum();
        builder.append_data(&mut dir, "package/", std::io::empty()).unwrap();

        for (path, content, mode) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("package/{path}"), content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_install_path_is_deterministic() {
        let conf = test_config(Path::new("/tmp/.pmx"));
        let spec = ToolchainSpec::new(Toolchain::Pnpm, "8.0.0");
        assert_eq!(
            install_path(&conf, &spec),
            Path::new("/tmp/.pmx/installed-versions/pnpm-8.0.0")
        );
    }

    #[test]
    fn test_strip_first_segment() {
        assert_eq!(
            strip_first_segment(Path::new("pkg/bin/pnpm.js")),
            Some(PathBuf::from("bin/pnpm.js"))
        );
        assert_eq!(strip_first_segment(Path::new("pkg/")), None);
        assert_eq!(strip_first_segment(Path::new("pkg")), None);
    }

    #[test]
    fn test_extract_tar_gz_strips_top_level() {
        let tarball = build_tarball(&[
            ("package.json", r#"{"name": "pnpm"}"#, 0o644),
            ("bin/pnpm.js", "#!/usr/bin/env node\n", 0o755),
        ]);
        let dest = tempdir().unwrap();

        extract_tar_gz(Cursor::new(tarball), dest.path()).unwrap();

        assert!(dest.path().join("package.json").exists());
        assert!(dest.path().join("bin/pnpm.js").exists());
        assert!(!dest.path().join("package").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_tar_gz_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;
        let tarball = build_tarball(&[("bin/run.sh", "#!/bin/sh\n", 0o755)]);
        let dest = tempdir().unwrap();

        extract_tar_gz(Cursor::new(tarball), dest.path()).unwrap();

        let mode = std::fs::metadata(dest.path().join("bin/run.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_extract_zip_strips_top_level() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            writer.add_directory("bun-linux-x64/", options).unwrap();
            writer.start_file("bun-linux-x64/bun", options).unwrap();
            writer.write_all(b"\x7fELF-not-really").unwrap();
            writer.finish().unwrap();
        }
        let dest = tempdir().unwrap();

        extract_zip(cursor.get_ref(), dest.path()).unwrap();

        assert!(dest.path().join("bun").exists());
        assert!(!dest.path().join("bun-linux-x64").exists());
    }

    #[test]
    fn test_executable_path_reads_bin_map() {
        let dir = tempdir().unwrap();
        let conf = test_config(dir.path());
        let spec = ToolchainSpec::new(Toolchain::Pnpm, "8.0.0");
        let install = install_path(&conf, &spec);
        std::fs::create_dir_all(&install).unwrap();
        std::fs::write(
            install.join(MANIFEST_FILE),
            r#"{"name": "pnpm", "bin": {"pnpm": "bin/pnpm.cjs", "pnpx": "bin/pnpx.cjs"}}"#,
        )
        .unwrap();

        let path = executable_path(&conf, &spec, "pnpx").unwrap();
        assert_eq!(path, install.join("bin/pnpx.cjs"));

        let err = executable_path(&conf, &spec, "corepack").unwrap_err();
        assert!(matches!(err, PmxError::ExecutableNotDeclared(_)));
    }

    #[test]
    fn test_executable_path_single_binary_ignores_command() {
        let dir = tempdir().unwrap();
        let conf = test_config(dir.path());
        let spec = ToolchainSpec::new(Toolchain::Bun, "1.1.0");
        let expected = install_path(&conf, &spec).join("bun");
        assert_eq!(executable_path(&conf, &spec, "bunx").unwrap(), expected);
    }

    #[test]
    fn test_is_installed_marker_files() {
        let dir = tempdir().unwrap();
        let conf = test_config(dir.path());

        let pnpm = ToolchainSpec::new(Toolchain::Pnpm, "8.0.0");
        assert!(!is_installed(&conf, &pnpm));
        let install = install_path(&conf, &pnpm);
        std::fs::create_dir_all(&install).unwrap();
        assert!(!is_installed(&conf, &pnpm), "bare directory is not installed");
        std::fs::write(install.join(MANIFEST_FILE), "{}").unwrap();
        assert!(is_installed(&conf, &pnpm));

        let bun = ToolchainSpec::new(Toolchain::Bun, "1.1.0");
        let install = install_path(&conf, &bun);
        std::fs::create_dir_all(&install).unwrap();
        assert!(!is_installed(&conf, &bun));
        std::fs::write(install.join("bun"), "binary").unwrap();
        assert!(is_installed(&conf, &bun));
    }
}
