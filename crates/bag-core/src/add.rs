use std::fs;
use std::path::Path;

use bag_hash::digest_file;
use bag_manifest::{Manifest, ManifestEntry, ManifestName};
use bag_utils::path::PAYLOAD_DIR;
use bag_utils::BagPath;
use tracing::info;

use crate::create::write_tag_manifest;
use crate::tagfile::{BAG_INFO_TXT, PAYLOAD_OXUM};
use crate::walk;
use crate::{Bag, BagError, TagFile, ValidateOptions, ValidationReport};

/// File name of `src`, which must be an existing regular file.
fn source_name(src: &Path) -> Result<String, BagError> {
    let meta = fs::metadata(src).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BagError::PathNotFound(src.to_path_buf()),
        _ => BagError::io("inspect", src, e),
    })?;
    if !meta.is_file() {
        return Err(BagError::NotAFile(src.to_path_buf()));
    }
    src.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| BagError::NotAFile(src.to_path_buf()))
}

fn refuse_existing(target: &Path) -> Result<(), BagError> {
    if fs::symlink_metadata(target).is_ok() {
        return Err(BagError::AlreadyExists(target.to_path_buf()));
    }
    Ok(())
}

/// Digest `target` with each manifest's algorithm and append it as `path`.
fn record(bag: &Bag, names: &[ManifestName], path: &BagPath, target: &Path) -> Result<(), BagError> {
    for name in names {
        let digest = digest_file(name.algorithm, target).map_err(|source| BagError::HashFile {
            path: path.to_string(),
            source,
        })?;
        let entry = ManifestEntry::new(path.as_str(), &digest, name.algorithm);
        Manifest::append_to(&bag.manifest_path(name), &[entry])?;
    }
    Ok(())
}

fn revalidate(bag: &Bag, processes: usize) -> Result<ValidationReport, BagError> {
    bag.validate(&ValidateOptions::complete(processes))?
        .into_result()
}

pub(crate) fn add_tag_file(
    bag: &Bag,
    src: &Path,
    processes: usize,
) -> Result<ValidationReport, BagError> {
    let name = source_name(src)?;
    let manifest_name = !matches!(ManifestName::parse(&name), Ok(None));
    if name == PAYLOAD_DIR || manifest_name || walk::is_bag_lock_name(&name) {
        return Err(BagError::ReservedName(name));
    }
    let target = bag.root().join(&name);
    refuse_existing(&target)?;

    info!(file = %name, "adding tag file");
    bag.mover.copy(src, &target)?;

    let manifests = bag.manifests()?;
    record(bag, &manifests.tag, &BagPath::new(&name), &target)?;
    revalidate(bag, processes)
}

pub(crate) fn add_payload_file(
    bag: &Bag,
    src: &Path,
    dest: Option<&str>,
    processes: usize,
) -> Result<ValidationReport, BagError> {
    let file_name = source_name(src)?;
    let rel = dest.unwrap_or(&file_name);
    if !BagPath::is_contained(rel) {
        return Err(BagError::OutsidePayload(rel.to_string()));
    }
    let path = BagPath::new(PAYLOAD_DIR).join(rel);
    let target = path.to_fs_path(bag.root());
    refuse_existing(&target)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| BagError::io("create directory", parent, e))?;
    }

    info!(file = %path, "adding payload file");
    bag.mover.copy(src, &target)?;

    let manifests = bag.manifests()?;
    record(bag, &manifests.payload, &path, &target)?;

    let info_path = bag.root().join(BAG_INFO_TXT);
    let mut info = if info_path.is_file() {
        bag.store.read(&info_path)?
    } else {
        TagFile::new()
    };
    info.set(PAYLOAD_OXUM, bag.oxum()?.to_string());
    bag.store.write(&info, &info_path)?;

    for name in &manifests.tag {
        write_tag_manifest(bag, name.algorithm, processes)?;
    }
    revalidate(bag, processes)
}
