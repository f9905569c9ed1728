use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::walk::files_under;
use crate::BagError;

/// Octet-stream sum: total payload bytes and payload file count.
///
/// Serialized as `<bytes>.<files>` in the `Payload-Oxum` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Oxum {
    pub bytes: u64,
    pub files: u64,
}

impl Oxum {
    pub const fn new(bytes: u64, files: u64) -> Self {
        Self { bytes, files }
    }

    /// Sum every regular file below `dir`.
    ///
    /// Symlinks are not counted and directories are traversed but not
    /// counted. Files are counted whatever their names. An empty directory
    /// yields `0.0`.
    pub fn calculate(dir: &Path) -> Result<Self, BagError> {
        let listing = files_under(dir, dir)?;
        Ok(Oxum::new(listing.total_bytes(), listing.count()))
    }
}

impl fmt::Display for Oxum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.bytes, self.files)
    }
}

impl FromStr for Oxum {
    type Err = BagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BagError::InvalidOxum(s.to_string());
        let (bytes, files) = s.trim().split_once('.').ok_or_else(invalid)?;
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(bytes) || !digits(files) {
            return Err(invalid());
        }
        Ok(Oxum {
            bytes: bytes.parse().map_err(|_| invalid())?,
            files: files.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn counts_bytes_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), b"12345").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b"), b"678").unwrap();
        fs::write(dir.path().join("sub/empty"), b"").unwrap();

        let oxum = Oxum::calculate(dir.path()).unwrap();
        assert_eq!(oxum, Oxum::new(8, 3));
        assert_eq!(oxum.to_string(), "8.3");
    }

    #[cfg(unix)]
    #[test]
    fn counts_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xffname")), b"12345").unwrap();

        assert_eq!(Oxum::calculate(dir.path()).unwrap(), Oxum::new(5, 1));
    }

    #[test]
    fn empty_directory_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nothing")).unwrap();
        assert_eq!(Oxum::calculate(dir.path()).unwrap().to_string(), "0.0");
    }

    #[test]
    fn rejects_files_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(Oxum::calculate(&file), Err(BagError::NotADirectory(_))));
        assert!(matches!(
            Oxum::calculate(&dir.path().join("missing")),
            Err(BagError::PathNotFound(_))
        ));
    }

    #[test]
    fn parse() {
        assert_eq!("1024.7".parse::<Oxum>().unwrap(), Oxum::new(1024, 7));
        assert_eq!(" 0.0\n".parse::<Oxum>().unwrap(), Oxum::new(0, 0));
        for bad in ["", "12", "1.2.3", "a.b", "-1.2", ".5", "5."] {
            assert!(bad.parse::<Oxum>().is_err(), "{bad}");
        }
    }
}
