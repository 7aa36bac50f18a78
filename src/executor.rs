use std::path::Path;
use std::process::Command;
use crate::config::Config;
use crate::defaults;
use crate::error::{PmxError, Result};
use crate::inspector;
use crate::installer;
use crate::spec::{Distribution, Toolchain, ToolchainSpec};

/// Set in the child's environment so a toolchain that re-invokes one of our
/// shims skips the mismatch check instead of recursing into it.
pub const MISMATCH_GUARD_ENV: &str = "PMX_IGNORE_SPEC_MISMATCH";

/// Resolves the effective spec, ensures it is installed, and replaces the
/// current process with the target command.
///
/// On success this never returns: the dispatcher process ceases to exist at
/// the final exec, so nothing after it runs. An `Ok` return can only be
/// observed on platforms without process replacement.
pub fn run(conf: &Config, name: Toolchain, command: &str, args: &[String]) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let spec = resolve_spec(conf, name, &cwd)?;

    installer::install(conf, &spec)?;
    let exe_path = installer::executable_path(conf, &spec, command)?;

    dispatch(&spec, command, &exe_path, args)
}

/// Fixed precedence order: a matching project pin wins; a mismatched pin is
/// fatal unless bypassed by config or the toolchain's own exemption; with no
/// usable pin the persisted default (resolved lazily from the registry)
/// applies.
fn resolve_spec(conf: &Config, name: Toolchain, cwd: &Path) -> Result<ToolchainSpec> {
    if let Some(found) = inspector::find_spec(cwd)? {
        if found.spec.name == name {
            return Ok(found.spec);
        }
        if !conf.ignore_spec_mismatch && !name.mismatch_exempt() {
            return Err(PmxError::SpecMismatch {
                declared: found.spec.name.to_string(),
                manifest_path: found.manifest_path,
            });
        }
    }

    let version = defaults::default_version(conf, name)?;
    Ok(ToolchainSpec::new(name, version))
}

#[cfg(unix)]
fn dispatch(spec: &ToolchainSpec, command: &str, exe_path: &Path, args: &[String]) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let mut cmd = match spec.name.distribution() {
        // Scripts are run through the toolchain's runtime, looked up on PATH.
        Distribution::Interpreted { runtime } => {
            let mut cmd = Command::new(runtime);
            cmd.arg(exe_path);
            cmd
        }
        // The binary runs directly; argv[0] carries the invoked name so the
        // toolchain can tell e.g. `bunx` from `bun`.
        Distribution::SingleBinary { .. } => {
            let mut cmd = Command::new(exe_path);
            cmd.arg0(command);
            cmd
        }
    };

    let err = cmd.args(args).env(MISMATCH_GUARD_ENV, "1").exec();
    if err.kind() == std::io::ErrorKind::NotFound {
        if let Distribution::Interpreted { runtime } = spec.name.distribution() {
            return Err(PmxError::RuntimeNotFound(runtime.to_string()));
        }
    }
    Err(err.into())
}

/// Windows has no exec; the closest equivalent is to run the child and exit
/// with its status.
#[cfg(not(unix))]
fn dispatch(spec: &ToolchainSpec, _command: &str, exe_path: &Path, args: &[String]) -> Result<()> {
    let mut cmd = match spec.name.distribution() {
        Distribution::Interpreted { runtime } => {
            let mut cmd = Command::new(runtime);
            cmd.arg(exe_path);
            cmd
        }
        Distribution::SingleBinary { .. } => Command::new(exe_path),
    };

    let status = cmd
        .args(args)
        .env(MISMATCH_GUARD_ENV, "1")
        .status()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                if let Distribution::Interpreted { runtime } = spec.name.distribution() {
                    return PmxError::RuntimeNotFound(runtime.to_string());
                }
            }
            PmxError::Io(e)
        })?;
    std::process::exit(status.code().unwrap_or(1));
}
