use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("@pnp/cli-microsoft365 npm package not found")]
    PackageNotFound,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse command metadata: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Documentation file for command {command} not found at {}", path.display())]
    DocsNotFound { command: String, path: PathBuf },
}
