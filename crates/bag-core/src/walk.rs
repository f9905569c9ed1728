//! Directory listings used for manifests, oxum and reconciliation.
//!
//! Only regular files count. Symlinks are never followed and never listed;
//! directories are traversed but not listed. Entries come back sorted by
//! name at every level so manifests are written in a stable order.
//!
//! Files whose names are not valid UTF-8 still count towards sizes, but
//! are kept apart in [`Listing::unnamed`] because no manifest can name them.

use std::fs;
use std::path::{Path, PathBuf};

use bag_manifest::{ManifestKind, ManifestName};
use bag_utils::path::PAYLOAD_DIR;
use bag_utils::{BagPath, UtilError};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::tagfile::{BAGIT_TXT, BAG_INFO_TXT};
use crate::BagError;

const LOCK_SUFFIX: &str = ".lock";

/// A regular file found by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Path relative to the walk's base.
    pub path: BagPath,
    /// Size in bytes.
    pub len: u64,
}

/// A regular file whose name is not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnnamedFile {
    pub path: PathBuf,
    pub len: u64,
}

/// Regular files found by a walk.
#[derive(Debug, Default)]
pub struct Listing {
    pub files: Vec<WalkedFile>,
    pub unnamed: Vec<UnnamedFile>,
}

impl Listing {
    pub fn total_bytes(&self) -> u64 {
        let named: u64 = self.files.iter().map(|f| f.len).sum();
        named + self.unnamed.iter().map(|f| f.len).sum::<u64>()
    }

    pub fn count(&self) -> u64 {
        (self.files.len() + self.unnamed.len()) as u64
    }

    /// The named files, or `NonUtf8Path` for the first unnamed one.
    pub fn into_named(self) -> Result<Vec<WalkedFile>, BagError> {
        match self.unnamed.into_iter().next() {
            Some(file) => Err(UtilError::NonUtf8Path { path: file.path }.into()),
            None => Ok(self.files),
        }
    }
}

/// Fail with `PathNotFound` or `NotADirectory` unless `dir` is a directory.
pub fn ensure_directory(dir: &Path) -> Result<(), BagError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BagError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(BagError::PathNotFound(dir.to_path_buf()))
        }
        Err(e) => Err(BagError::io("inspect", dir, e)),
    }
}

/// Every regular file below `dir`, with paths relative to `base`.
pub fn files_under(base: &Path, dir: &Path) -> Result<Listing, BagError> {
    ensure_directory(dir)?;
    collect(base, WalkDir::new(dir).follow_links(false).sort_by_file_name())
}

/// Every regular file in the payload directory, as `data/...` paths.
pub fn payload_files(root: &Path) -> Result<Listing, BagError> {
    files_under(root, &root.join(PAYLOAD_DIR))
}

/// Every tag file of the bag: regular files outside `data/`, excluding the
/// tag-manifests themselves and lock files left behind by interrupted
/// writes of bag files.
pub fn tag_files(root: &Path) -> Result<Listing, BagError> {
    ensure_directory(root)?;
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_name() == PAYLOAD_DIR));
    let mut listing = collect(root, walker)?;
    listing
        .files
        .retain(|f| !is_tag_manifest(&f.path) && !is_stale_lock(&f.path));
    Ok(listing)
}

/// Names the bag itself writes at its root.
fn is_bag_file_name(name: &str) -> bool {
    name == BAGIT_TXT || name == BAG_INFO_TXT || !matches!(ManifestName::parse(name), Ok(None))
}

/// `<bag file>.lock`, as created while a bag file is being replaced.
pub(crate) fn is_bag_lock_name(name: &str) -> bool {
    name.strip_suffix(LOCK_SUFFIX).is_some_and(is_bag_file_name)
}

fn is_stale_lock(path: &BagPath) -> bool {
    path.segments().count() == 1 && is_bag_lock_name(path.as_str())
}

fn is_tag_manifest(path: &BagPath) -> bool {
    path.segments().count() == 1
        && matches!(
            ManifestName::parse(path.as_str()),
            Ok(Some(ManifestName {
                kind: ManifestKind::Tag,
                ..
            })) | Err(_)
        )
}

fn collect<I>(base: &Path, walker: I) -> Result<Listing, BagError>
where
    I: IntoIterator<Item = walkdir::Result<walkdir::DirEntry>>,
{
    let mut listing = Listing::default();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| base.to_path_buf());
            BagError::io("walk", path, e.into())
        })?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if file_type.is_symlink() {
            warn!(path = %entry.path().display(), "skipping symbolic link");
            continue;
        }
        if !file_type.is_file() {
            debug!(path = %entry.path().display(), "skipping special file");
            continue;
        }
        let len = entry
            .metadata()
            .map_err(|e| BagError::io("stat", entry.path(), e.into()))?
            .len();
        match BagPath::from_fs(base, entry.path()) {
            Ok(path) => listing.files.push(WalkedFile { path, len }),
            Err(UtilError::NonUtf8Path { path }) => {
                warn!(path = %path.display(), "file name is not valid UTF-8");
                listing.unnamed.push(UnnamedFile { path, len });
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(listing)
}

/// Regular files directly in `dir` (not recursive), sorted by name.
pub(crate) fn root_file_names(dir: &Path) -> Result<Vec<String>, BagError> {
    let mut names = Vec::new();
    let read = fs::read_dir(dir).map_err(|e| BagError::io("list", dir, e))?;
    for entry in read {
        let entry = entry.map_err(|e| BagError::io("list", dir, e))?;
        let file_type = entry.file_type().map_err(|e| BagError::io("stat", entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(name = ?raw, "skipping non UTF-8 file name"),
        }
    }
    names.sort();
    Ok(names)
}

/// Entries directly in `dir`, any type, sorted by name.
pub(crate) fn child_paths(dir: &Path) -> Result<Vec<PathBuf>, BagError> {
    let read = fs::read_dir(dir).map_err(|e| BagError::io("list", dir, e))?;
    let mut children = Vec::new();
    for entry in read {
        children.push(entry.map_err(|e| BagError::io("list", dir, e))?.path());
    }
    children.sort();
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, data: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    #[test]
    fn lists_nested_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("data/b.txt"), b"bb");
        write(&root.join("data/a/z.txt"), b"z");
        write(&root.join("data/a/c.txt"), b"ccc");

        let files = payload_files(root).unwrap().into_named().unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["data/a/c.txt", "data/a/z.txt", "data/b.txt"]);
        assert_eq!(files[0].len, 3);
    }

    #[test]
    fn empty_directories_are_not_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data/empty/deeper")).unwrap();
        assert_eq!(payload_files(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("data/real.txt"), b"x");
        std::os::unix::fs::symlink(root.join("data/real.txt"), root.join("data/link.txt")).unwrap();

        let files = payload_files(root).unwrap().into_named().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path.as_str(), "data/real.txt");
    }

    #[test]
    fn tag_files_exclude_payload_and_tag_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("bagit.txt"), b"");
        write(&root.join("manifest-md5.txt"), b"");
        write(&root.join("tagmanifest-md5.txt"), b"");
        write(&root.join("meta/extra.xml"), b"");
        write(&root.join("data/payload.txt"), b"");

        let files = tag_files(root).unwrap().into_named().unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["bagit.txt", "manifest-md5.txt", "meta/extra.xml"]);
    }

    #[test]
    fn only_bag_file_locks_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("bagit.txt"), b"");
        write(&root.join("bagit.txt.lock"), b"");
        write(&root.join("manifest-sha256.txt.lock"), b"");
        write(&root.join("deps.lock"), b"");
        write(&root.join("meta/bagit.txt.lock"), b"");

        let files = tag_files(root).unwrap().into_named().unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["bagit.txt", "deps.lock", "meta/bagit.txt.lock"]);
    }

    #[test]
    fn lock_names() {
        assert!(is_bag_lock_name("bag-info.txt.lock"));
        assert!(is_bag_lock_name("tagmanifest-md5.txt.lock"));
        assert!(!is_bag_lock_name("Cargo.lock"));
        assert!(!is_bag_lock_name("bag-info.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_kept_apart() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("data/ok.txt"), b"ok");
        write(&root.join("data").join(OsStr::from_bytes(b"bad\xffname")), b"12345");

        let listing = payload_files(root).unwrap();
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.unnamed.len(), 1);
        assert_eq!(listing.unnamed[0].len, 5);
        assert_eq!(listing.total_bytes(), 7);
        assert_eq!(listing.count(), 2);
        assert!(matches!(
            listing.into_named(),
            Err(BagError::Util(UtilError::NonUtf8Path { .. }))
        ));
    }

    #[test]
    fn missing_and_non_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(ensure_directory(&missing), Err(BagError::PathNotFound(_))));

        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(ensure_directory(&file), Err(BagError::NotADirectory(_))));
    }
}
