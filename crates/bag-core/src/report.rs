use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use bag_manifest::ManifestError;

use crate::{BagError, Oxum};

/// How much checking a validation run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Compare the stored Payload-Oxum against the payload only.
    Fast,
    /// Recompute every digest and reconcile manifests with the payload.
    #[default]
    Complete,
}

/// One finding of a validation run.
#[derive(Debug, thiserror::Error)]
pub enum Problem {
    #[error("Payload-Oxum validation failed. Expected {stored}, found {actual}")]
    OxumMismatch { stored: Oxum, actual: Oxum },

    #[error("fast validation requires a Payload-Oxum in bag-info.txt")]
    MissingOxum,

    #[error("invalid Payload-Oxum '{value}'")]
    InvalidOxum { value: String },

    #[error("bagit.txt is missing")]
    MissingDeclaration,

    #[error("no payload manifest found")]
    NoManifest,

    #[error(transparent)]
    Manifest(ManifestError),

    #[error("{manifest}: entry '{path}' is outside the payload directory")]
    OutsidePayload { manifest: String, path: String },

    #[error("{path} exists in {manifest} but was not found on filesystem")]
    MissingFile { manifest: String, path: String },

    #[error("{path} {algorithm} validation failed: expected=\"{expected}\" found=\"{actual}\"")]
    DigestMismatch {
        path: String,
        algorithm: String,
        expected: String,
        actual: String,
    },

    #[error("{path} listed in {manifest} could not be read: {reason}")]
    Unreadable {
        manifest: String,
        path: String,
        reason: String,
    },

    #[error("{path} exists on filesystem but is not in the manifest")]
    UnlistedFile { path: String },

    #[error("{path} exists on filesystem but is not in {manifest}")]
    NotInManifest { manifest: String, path: String },

    #[error("{path} has a name that is not valid UTF-8 and cannot be listed in a manifest")]
    NonUtf8Name { path: String },
}

/// Outcome of validating one bag.
///
/// Problems are kept in discovery order and deduplicated by message.
#[derive(Debug)]
pub struct ValidationReport {
    bag: PathBuf,
    mode: ValidationMode,
    problems: Vec<Problem>,
    seen: HashSet<String>,
}

impl ValidationReport {
    pub fn new(bag: &Path, mode: ValidationMode) -> Self {
        Self {
            bag: bag.to_path_buf(),
            mode,
            problems: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub(crate) fn push(&mut self, problem: Problem) {
        if self.seen.insert(problem.to_string()) {
            self.problems.push(problem);
        }
    }

    pub fn bag(&self) -> &Path {
        &self.bag
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// Every problem in one line, prefixed with the bag location.
    pub fn message(&self) -> String {
        if self.is_valid() {
            return format!("{} is valid", self.bag.display());
        }
        let joined = self
            .problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        format!(
            "{} is invalid: Bag validation failed: {}",
            self.bag.display(),
            joined
        )
    }

    /// `Ok(self)` when valid, otherwise [`BagError::Invalid`].
    pub fn into_result(self) -> Result<Self, BagError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(BagError::Invalid(Box::new(self)))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
