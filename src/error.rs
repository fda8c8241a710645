// Generator errors - everything that can abort a generate or install action

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("RAM must be at least {minimum} GB (got {requested} GB)")]
    InsufficientRam { requested: u32, minimum: u32 },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Please select an output directory")]
    MissingOutputDirectory,

    #[error("Server directory '{0}' does not exist")]
    ServerDirectoryNotFound(PathBuf),

    #[error("Select at least one plugin or URL to install")]
    NothingToInstall,

    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Unknown server fork: {0} (expected Purpur, Paper or Spigot)")]
    UnknownFork(String),

    #[error("Template for {file} left placeholder {{{{{name}}}}} unresolved")]
    UnresolvedPlaceholder { file: String, name: String },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API rate limit reached while fetching {0}. Try again later or provide a GitHub token")]
    RateLimited(String),

    #[error("Could not find asset matching '{pattern}' for {repo}")]
    AssetNotFound { repo: String, pattern: String },

    #[error("Unable to determine version for {0}")]
    MavenVersionNotFound(String),

    #[error("Invalid Maven metadata: {0}")]
    MavenMetadata(#[from] quick_xml::DeError),

    #[error("Failed to extract plugin archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl GeneratorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
