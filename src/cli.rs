use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    #[command(subcommand)]
    pub(crate) command: PmxCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum PmxCommand {
    /// Update the `packageManager` field of the nearest `package.json` to the latest version
    UpdateLocal,
    /// Update the default version used when no project pins one. Defaults to all toolchains
    UpdateDefault {
        /// Update one specific toolchain (npm, pnpm, yarn or bun)
        name: Option<String>,
    },
    /// Write a `packageManager` field pinning the latest version into a `package.json`
    Pin {
        /// Toolchain to pin (npm, pnpm, yarn or bun)
        name: String,
        /// Path to the package directory or its `package.json`
        path: String,
    },
    /// Create the command-name shims (npm, pnpm, yarn, ...) next to the pmx binary
    Setup,
}
