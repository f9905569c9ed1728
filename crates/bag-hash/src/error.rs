use std::path::PathBuf;

/// Errors produced while selecting an algorithm or digesting content.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("unsupported checksum algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("SHA-1 collision detected")]
    Sha1Collision,

    #[error("unable to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
