//! Manifest filename grammar.
//!
//! ```text
//! manifest-<algorithm>.txt       payload manifest
//! tagmanifest-<algorithm>.txt    tag-manifest
//! ```
//!
//! Both the kind and the algorithm are read here, in one place, so callers
//! never pattern-match filenames themselves.

use std::fmt;

use bag_hash::HashAlgorithm;

use crate::ManifestError;

const PAYLOAD_PREFIX: &str = "manifest-";
const TAG_PREFIX: &str = "tagmanifest-";
const SUFFIX: &str = ".txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ManifestKind {
    /// Covers the payload under `data/`.
    Payload,
    /// Covers tag files at the bag root.
    Tag,
}

impl ManifestKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Payload => PAYLOAD_PREFIX,
            Self::Tag => TAG_PREFIX,
        }
    }
}

/// A recognised manifest filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManifestName {
    pub kind: ManifestKind,
    pub algorithm: HashAlgorithm,
}

impl ManifestName {
    pub const fn payload(algorithm: HashAlgorithm) -> Self {
        Self {
            kind: ManifestKind::Payload,
            algorithm,
        }
    }

    pub const fn tag(algorithm: HashAlgorithm) -> Self {
        Self {
            kind: ManifestKind::Tag,
            algorithm,
        }
    }

    /// Classify a bag-root filename.
    ///
    /// Returns `Ok(None)` when the name is not manifest-shaped at all, and
    /// [`ManifestError::UnsupportedAlgorithm`] when it is but the algorithm
    /// is unknown.
    pub fn parse(file_name: &str) -> Result<Option<Self>, ManifestError> {
        // Check the longer prefix first: "tagmanifest-" also ends in "manifest-".
        let (kind, rest) = if let Some(rest) = file_name.strip_prefix(TAG_PREFIX) {
            (ManifestKind::Tag, rest)
        } else if let Some(rest) = file_name.strip_prefix(PAYLOAD_PREFIX) {
            (ManifestKind::Payload, rest)
        } else {
            return Ok(None);
        };
        let Some(algorithm_name) = rest.strip_suffix(SUFFIX) else {
            return Ok(None);
        };
        if algorithm_name.is_empty() {
            return Ok(None);
        }
        match HashAlgorithm::from_name(algorithm_name) {
            Some(algorithm) => Ok(Some(Self { kind, algorithm })),
            None => Err(ManifestError::UnsupportedAlgorithm {
                name: file_name.to_string(),
                algorithm: algorithm_name.to_string(),
            }),
        }
    }

    /// The canonical filename, e.g. `manifest-sha256.txt`.
    pub fn file_name(&self) -> String {
        format!("{}{}{}", self.kind.prefix(), self.algorithm.name(), SUFFIX)
    }
}

impl fmt::Display for ManifestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}
