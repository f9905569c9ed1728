use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::UtilError;
use crate::Result;

/// Name of the payload directory at the bag root.
pub const PAYLOAD_DIR: &str = "data";

/// A bag-root-relative path in normalized form.
///
/// Manifests always use forward slashes regardless of platform, and tools
/// disagree about leading `./` and doubled separators. A `BagPath` is the
/// comparison key: backslashes become `/`, empty and `.` segments are
/// dropped, and there is never a leading or trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BagPath(String);

/// Check if a character is a directory separator (handles both Unix and Windows).
#[inline]
fn is_dir_sep(c: char) -> bool {
    c == '/' || c == '\\'
}

impl BagPath {
    /// Normalize a manifest-style path string.
    pub fn new(path: &str) -> Self {
        let joined = path
            .split(is_dir_sep)
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .collect::<Vec<_>>()
            .join("/");
        BagPath(joined)
    }

    /// Build from a filesystem path below `base`.
    ///
    /// Fails for paths outside `base` and for names that are not valid
    /// UTF-8, since manifests are UTF-8 text.
    pub fn from_fs(base: &Path, path: &Path) -> Result<Self> {
        let rel = path
            .strip_prefix(base)
            .map_err(|_| UtilError::NotRelative {
                path: path.to_path_buf(),
                base: base.to_path_buf(),
            })?;
        let mut segments = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| UtilError::NonUtf8Path {
                        path: path.to_path_buf(),
                    })?;
                    segments.push(name);
                }
                Component::CurDir => {}
                _ => {
                    return Err(UtilError::NotRelative {
                        path: path.to_path_buf(),
                        base: base.to_path_buf(),
                    })
                }
            }
        }
        Ok(BagPath(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Final segment (the file name).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Join a further relative path onto this one.
    pub fn join(&self, other: &str) -> BagPath {
        if self.is_empty() {
            return BagPath::new(other);
        }
        BagPath::new(&format!("{}/{}", self.0, other))
    }

    /// True when the raw manifest path stays inside the bag: non-empty, no
    /// `..` segment, and no absolute or drive-letter prefix.
    pub fn is_contained(raw: &str) -> bool {
        if raw.starts_with(is_dir_sep) {
            return false;
        }
        let normalized = BagPath::new(raw);
        if normalized.is_empty() {
            return false;
        }
        let first = normalized.segments().next().unwrap_or("");
        if first.len() >= 2 && first.as_bytes()[1] == b':' {
            return false;
        }
        let escapes = normalized.segments().any(|seg| seg == "..");
        !escapes
    }

    /// True when the path names something below `data/`.
    pub fn is_payload(&self) -> bool {
        let mut segs = self.segments();
        segs.next() == Some(PAYLOAD_DIR) && segs.next().is_some()
    }

    /// Resolve against a bag root on the local filesystem.
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        let mut out = root.to_path_buf();
        for seg in self.segments() {
            out.push(seg);
        }
        out
    }
}

impl fmt::Display for BagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BagPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BagPath {
    fn from(s: &str) -> Self {
        BagPath::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators() {
        assert_eq!(BagPath::new("data\\sub\\file.txt").as_str(), "data/sub/file.txt");
        assert_eq!(BagPath::new("./data//a.txt").as_str(), "data/a.txt");
        assert_eq!(BagPath::new("data/dir/").as_str(), "data/dir");
    }

    #[test]
    fn equal_after_normalization() {
        assert_eq!(BagPath::new("data/x y.txt"), BagPath::new("./data\\x y.txt"));
    }

    #[test]
    fn file_name_and_join() {
        let p = BagPath::new("data/a/b.bin");
        assert_eq!(p.file_name(), "b.bin");
        assert_eq!(BagPath::new("data").join("c.txt").as_str(), "data/c.txt");
        assert_eq!(BagPath::new("").join("bagit.txt").as_str(), "bagit.txt");
    }

    #[test]
    fn safety_checks() {
        assert!(BagPath::is_contained("data/a.txt"));
        assert!(BagPath::is_contained("./data/a.txt"));
        assert!(!BagPath::is_contained("/etc/passwd"));
        assert!(!BagPath::is_contained("data/../../x"));
        assert!(!BagPath::is_contained("C:\\x"));
        assert!(!BagPath::is_contained(""));
        assert!(!BagPath::is_contained("./"));
        assert!(!BagPath::is_contained(".."));
        assert!(!BagPath::is_contained("data/a/.."));
        assert!(!BagPath::is_contained("data\\..\\..\\x"));
        assert!(BagPath::is_contained("data/..a/b.."));
    }

    #[test]
    fn payload_membership() {
        assert!(BagPath::new("data/a.txt").is_payload());
        assert!(BagPath::new("data/sub/a.txt").is_payload());
        assert!(!BagPath::new("data").is_payload());
        assert!(!BagPath::new("bagit.txt").is_payload());
        assert!(!BagPath::new("database/a.txt").is_payload());
    }

    #[test]
    fn from_fs_relative() {
        let base = Path::new("/bags/one");
        let p = BagPath::from_fs(base, Path::new("/bags/one/data/sub/f.txt")).unwrap();
        assert_eq!(p.as_str(), "data/sub/f.txt");
        assert_eq!(p.to_fs_path(base), PathBuf::from("/bags/one/data/sub/f.txt"));
    }

    #[test]
    fn from_fs_outside_base() {
        let err = BagPath::from_fs(Path::new("/bags/one"), Path::new("/tmp/x")).unwrap_err();
        assert!(matches!(err, UtilError::NotRelative { .. }));
    }
}
