use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::BagError;

/// Moves and copies files into a bag.
///
/// Each call either completes or leaves the destination absent.
pub trait FileMover {
    /// Move `src` to `dst` (file or directory).
    fn relocate(&self, src: &Path, dst: &Path) -> Result<(), BagError>;
    /// Copy the file `src` to `dst`, which must not exist yet.
    fn copy(&self, src: &Path, dst: &Path) -> Result<(), BagError>;
}

/// [`FileMover`] for the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileMover for LocalFs {
    fn relocate(&self, src: &Path, dst: &Path) -> Result<(), BagError> {
        fs::rename(src, dst).map_err(|e| BagError::io("move", src, e))
    }

    fn copy(&self, src: &Path, dst: &Path) -> Result<(), BagError> {
        let parent = match dst.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut reader = File::open(src).map_err(|e| BagError::io("open", src, e))?;
        let mut staged =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| BagError::io("create", parent, e))?;
        io::copy(&mut reader, staged.as_file_mut()).map_err(|e| BagError::io("copy", src, e))?;
        let permissions = reader
            .metadata()
            .map_err(|e| BagError::io("stat", src, e))?
            .permissions();
        staged
            .as_file()
            .set_permissions(permissions)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| BagError::io("sync", staged.path(), e))?;
        staged.persist_noclobber(dst).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                BagError::AlreadyExists(dst.to_path_buf())
            } else {
                BagError::io("write", dst, e.error)
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_and_refuse_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, b"payload").unwrap();

        LocalFs.copy(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
        assert!(src.exists());

        fs::write(&src, b"changed").unwrap();
        assert!(matches!(
            LocalFs.copy(&src, &dst),
            Err(BagError::AlreadyExists(_))
        ));
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn relocate_moves_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/f"), b"x").unwrap();

        LocalFs.relocate(&dir.path().join("a"), &dir.path().join("b")).unwrap();
        assert!(dir.path().join("b/f").is_file());
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn copy_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFs
            .copy(&dir.path().join("none"), &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, BagError::Io { op: "open", .. }));
    }
}
