use std::path::PathBuf;

/// Errors produced while resolving, installing, or dispatching a toolchain.
///
/// Every variant is terminal for the current invocation; nothing in this crate
/// retries automatically.
#[derive(Debug, thiserror::Error)]
pub enum PmxError {
    #[error("unsupported package manager: {0}")]
    UnsupportedToolchain(String),

    /// The spec string was not of the exact form `<name>@<version>`.
    #[error("invalid spec format: {0}")]
    InvalidSpecFormat(String),

    #[error("unable to find a package.json with a \"packageManager\" field")]
    ManifestNotFound,

    #[error("failed to load spec from {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: Box<PmxError>,
    },

    /// The project pins a different package manager than the one invoked.
    #[error("this project is configured to use {declared} (see \"packageManager\" in {})", manifest_path.display())]
    SpecMismatch {
        declared: String,
        manifest_path: PathBuf,
    },

    #[error("registry unavailable: {0}")]
    RegistryUnavailable(#[from] reqwest::Error),

    #[error("registry returned {status} for {url}")]
    RegistryBadStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("latest dist-tag not found for {0}")]
    MissingLatestTag(String),

    #[error("failed to download {spec}: {source}")]
    ArchiveDownloadFailed {
        spec: String,
        #[source]
        source: Box<PmxError>,
    },

    #[error("failed to extract {spec}: {source}")]
    ArchiveExtractFailed {
        spec: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("executable {0} not declared in the installed package.json")]
    ExecutableNotDeclared(String),

    #[error("{0} not found in PATH")]
    RuntimeNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PmxError>;
