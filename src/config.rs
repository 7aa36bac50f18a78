use std::path::PathBuf;
use directories::BaseDirs;

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Process-wide configuration, read from the environment once at startup and
/// passed by reference to everything else.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the npm-compatible registry.
    pub registry: String,
    /// Root directory for installed versions and default-version records.
    pub root: PathBuf,
    /// Skip the project spec mismatch check entirely.
    pub ignore_spec_mismatch: bool,
}

impl Config {
    pub fn load() -> Config {
        Config::from_values(
            std::env::var("PMX_NPM_REGISTRY").ok(),
            std::env::var("PMX_DIR").ok().map(PathBuf::from),
            std::env::var("PMX_IGNORE_SPEC_MISMATCH").ok(),
        )
    }

    fn from_values(
        registry: Option<String>,
        root: Option<PathBuf>,
        ignore: Option<String>,
    ) -> Config {
        let registry = registry
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());

        let root = root.unwrap_or_else(default_root);

        let ignore_spec_mismatch = ignore
            .map(|v| {
                let v = v.to_ascii_lowercase();
                v == "1" || v == "true" || v == "yes"
            })
            .unwrap_or(false);

        Config {
            registry,
            root,
            ignore_spec_mismatch,
        }
    }
}

fn default_root() -> PathBuf {
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(".pmx"),
        None => PathBuf::from(".pmx"),
    }
}
