use std::path::PathBuf;

use crate::ValidationReport;

/// Errors from bag operations.
///
/// Validation findings are not errors: they are collected into a
/// [`ValidationReport`]. `Invalid` only appears when a caller asks for a
/// failing report to be turned into an error.
#[derive(Debug, thiserror::Error)]
pub enum BagError {
    #[error("'{0}' does not exist")]
    PathNotFound(PathBuf),

    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("'{0}' is not a regular file")]
    NotAFile(PathBuf),

    #[error("could not create a bag, no files present in '{0}'")]
    EmptyPayload(PathBuf),

    #[error("'{0}' is not a bag: payload directory 'data' is missing")]
    NotABag(PathBuf),

    #[error("cannot create '{0}': it already exists")]
    AlreadyExists(PathBuf),

    #[error("'{0}' is reserved for bag manifests")]
    ReservedName(String),

    #[error("payload path '{0}' must stay inside 'data/'")]
    OutsidePayload(String),

    #[error("no checksum algorithm requested")]
    NoAlgorithm,

    #[error("invalid Payload-Oxum '{0}': expected '<bytes>.<files>'")]
    InvalidOxum(String),

    #[error("unable to {op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to checksum '{path}': {source}")]
    HashFile {
        path: String,
        #[source]
        source: bag_hash::HashError,
    },

    #[error(transparent)]
    Hash(#[from] bag_hash::HashError),

    #[error(transparent)]
    Manifest(#[from] bag_manifest::ManifestError),

    #[error(transparent)]
    Util(#[from] bag_utils::UtilError),

    #[error("{0}")]
    Invalid(Box<ValidationReport>),
}

impl BagError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BagError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
