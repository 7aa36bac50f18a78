//! # Pmx Core Library
//!
//! This crate contains the core logic of the `pmx` tool – it lets a project pin an exact
//! JavaScript package manager version (`npm`, `pnpm`, `yarn`, `bun`) in its `package.json`
//! and transparently runs that exact version whenever the command is invoked.
//!
//! `pmx` installs each version exactly once into a shared per-user cache and hands off
//! execution to it by replacing its own process, so the pinned toolchain behaves as if it
//! were installed system-wide.
//!
//! This library is built for the `pmx` CLI, but you can also reuse it as a backend in other tools.
//!
//! ## Modules Overview
//! - [`spec`] – Toolchain identities and `name@version` spec parsing
//! - [`inspector`] – Locating and patching the `packageManager` field in `package.json`
//! - [`registry`] – Resolving `latest` tags and downloading distribution archives
//! - [`installer`] – The idempotent shared installation cache
//! - [`defaults`] – Persisted fallback versions for un-pinned invocations
//! - [`executor`] – Version resolution and process replacement
//! - [`shims`] – Command-name shims that forward into the dispatcher
//! - [`config`] – Process-wide configuration from the environment
//! - [`error`] – The crate's error taxonomy


pub mod config;
pub mod error;
pub mod spec;
pub mod inspector;
pub mod registry;
pub mod installer;
pub mod defaults;
pub mod executor;
pub mod shims;

pub use config::*;
pub use error::*;
pub use spec::*;
pub use inspector::{find_spec, update_spec};
pub use registry::*;
pub use installer::*;
pub use defaults::*;
pub use executor::*;
pub use shims::*;
