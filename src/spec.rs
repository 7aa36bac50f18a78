use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use crate::error::{PmxError, Result};

/// A package manager this tool knows how to install and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toolchain {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

/// How a toolchain is distributed, decided once per [`Toolchain`].
///
/// npm, pnpm and yarn ship as registry tarballs of scripts run through node;
/// bun ships as a zipped native binary published per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Scripts extracted from a registry tarball, launched via a runtime.
    Interpreted { runtime: &'static str },
    /// One native executable extracted from a platform-specific archive.
    SingleBinary { binary: &'static str },
}

impl Toolchain {
    pub const ALL: [Toolchain; 4] = [
        Toolchain::Npm,
        Toolchain::Pnpm,
        Toolchain::Yarn,
        Toolchain::Bun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Toolchain::Npm => "npm",
            Toolchain::Pnpm => "pnpm",
            Toolchain::Yarn => "yarn",
            Toolchain::Bun => "bun",
        }
    }

    pub fn distribution(&self) -> Distribution {
        match self {
            Toolchain::Bun => Distribution::SingleBinary { binary: "bun" },
            _ => Distribution::Interpreted { runtime: "node" },
        }
    }

    /// Whether a project pinned to a *different* manager should still allow
    /// this one to run. Only bun is exempt: bun projects commonly coexist with
    /// a pinned node package manager.
    pub fn mismatch_exempt(&self) -> bool {
        matches!(self, Toolchain::Bun)
    }
}

impl FromStr for Toolchain {
    type Err = PmxError;

    fn from_str(s: &str) -> Result<Toolchain> {
        match s {
            "npm" => Ok(Toolchain::Npm),
            "pnpm" => Ok(Toolchain::Pnpm),
            "yarn" => Ok(Toolchain::Yarn),
            "bun" => Ok(Toolchain::Bun),
            other => Err(PmxError::UnsupportedToolchain(other.to_string())),
        }
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exact pinned toolchain version, e.g. `pnpm@8.0.0`.
///
/// The version string is opaque: `latest`, pre-release tags and build metadata
/// all pass through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainSpec {
    pub name: Toolchain,
    pub version: String,
}

impl ToolchainSpec {
    pub fn new(name: Toolchain, version: impl Into<String>) -> ToolchainSpec {
        ToolchainSpec {
            name,
            version: version.into(),
        }
    }

    /// Parses `<name>@<version>`: exactly one `@`, both sides non-empty.
    pub fn parse(spec_string: &str) -> Result<ToolchainSpec> {
        let mut parts = spec_string.split('@');
        let (name, version) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(version), None) if !name.is_empty() && !version.is_empty() => {
                (name, version)
            }
            _ => return Err(PmxError::InvalidSpecFormat(spec_string.to_string())),
        };
        Ok(ToolchainSpec {
            name: name.parse()?,
            version: version.to_string(),
        })
    }
}

impl fmt::Display for ToolchainSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A spec discovered by walking up the directory tree, together with the
/// manifest that declared it. Produced per invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundSpec {
    pub manifest_path: PathBuf,
    pub spec: ToolchainSpec,
}
