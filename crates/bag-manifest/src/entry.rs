use bag_hash::HashAlgorithm;
use bag_utils::BagPath;

/// One `<digest>  <path>` line of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Normalized comparison key.
    pub path: BagPath,
    /// The path exactly as written (after percent-decoding), for messages.
    pub raw_path: String,
    /// Lowercase hex digest.
    pub digest: String,
    pub algorithm: HashAlgorithm,
}

impl ManifestEntry {
    pub fn new(raw_path: impl Into<String>, digest: &str, algorithm: HashAlgorithm) -> Self {
        let raw_path = raw_path.into();
        Self {
            path: BagPath::new(&raw_path),
            raw_path,
            digest: digest.to_ascii_lowercase(),
            algorithm,
        }
    }

    /// Compare against a freshly computed digest, ignoring hex case.
    pub fn matches(&self, digest: &str) -> bool {
        self.digest.eq_ignore_ascii_case(digest)
    }
}
