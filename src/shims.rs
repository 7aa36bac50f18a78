use std::path::Path;
use crate::error::Result;
use crate::spec::Toolchain;

/// Command names that dispatch through this tool when it is invoked under
/// them (via symlink or copy).
pub const SHIM_NAMES: [&str; 7] = ["npm", "npx", "pnpm", "pnpx", "yarn", "bun", "bunx"];

/// Maps an invoked command name to the toolchain that owns it. `npx`, `pnpx`
/// and `bunx` are secondary commands of their package manager, not toolchains
/// of their own.
pub fn shim_target(command: &str) -> Option<Toolchain> {
    match command {
        "npm" | "npx" => Some(Toolchain::Npm),
        "pnpm" | "pnpx" => Some(Toolchain::Pnpm),
        "yarn" => Some(Toolchain::Yarn),
        "bun" | "bunx" => Some(Toolchain::Bun),
        _ => None,
    }
}

/// Creates one shim for every command name next to the current executable.
/// Existing shims are replaced; individual failures are warnings so one bad
/// link does not abort the rest of setup.
pub fn ensure_shims() -> Result<()> {
    let exe_path = std::env::current_exe()?;
    let bin_dir = exe_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let exe_name = exe_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "pmx".to_string());

    for shim_name in SHIM_NAMES {
        let shim_path = bin_dir.join(shim_name);
        if shim_path.symlink_metadata().is_ok() {
            std::fs::remove_file(&shim_path)?;
        }
        println!("Creating shim: {} -> {}", shim_name, exe_name);
        if let Err(e) = create_shim(&exe_name, &shim_path) {
            eprintln!("Warning: failed to create shim {}: {}", shim_name, e);
        }
    }
    Ok(())
}

/// On Unix the shim is a relative symlink; on Windows a forwarding `.bat`
/// script, since symlinks need elevated rights there.
fn create_shim(target: &str, shim_path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, shim_path)?;
    }
    #[cfg(windows)]
    {
        let script = format!("@echo off\r\ncall \"%~dp0{}\" %*\r\n", target);
        std::fs::write(shim_path.with_extension("bat"), script)?;
    }
    Ok(())
}
