use std::path::PathBuf;

/// Errors from reading, parsing or writing manifests.
///
/// The line-level variants (`MalformedLine`, `DuplicateEntry`, `UnsafePath`)
/// are collected by the parser rather than returned early.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("{file}: line {line}: malformed manifest line ({reason}): '{content}'")]
    MalformedLine {
        file: String,
        line: usize,
        content: String,
        reason: &'static str,
    },

    #[error("{file}: line {line}: duplicate entry for '{path}'")]
    DuplicateEntry {
        file: String,
        line: usize,
        path: String,
    },

    #[error("{file}: line {line}: path '{path}' escapes the bag")]
    UnsafePath {
        file: String,
        line: usize,
        path: String,
    },

    #[error("'{name}' names unsupported checksum algorithm '{algorithm}'")]
    UnsupportedAlgorithm { name: String, algorithm: String },

    #[error("unable to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write manifest '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: bag_utils::UtilError,
    },
}
