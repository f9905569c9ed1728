use std::fs;
use std::path::PathBuf;

use bag_hash::HashAlgorithm;
use bag_manifest::{Manifest, ManifestEntry, ManifestName};
use bag_utils::BagPath;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::tagfile::{
    BAGGING_DATE, BAGIT_TXT, BAG_INFO_TXT, BAG_SOFTWARE_AGENT, PAYLOAD_OXUM,
};
use crate::walk::{self, WalkedFile};
use crate::{hash_files, Bag, BagError, TagFile};

/// Agent string recorded in `bag-info.txt` unless the caller overrides it.
pub fn default_software_agent() -> String {
    format!(
        "bagr {} <{}>",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_REPOSITORY")
    )
}

/// Settings for [`Bag::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    /// One payload manifest and one tag-manifest is written per algorithm.
    pub algorithms: Vec<HashAlgorithm>,
    pub processes: usize,
    /// Recorded as `Bagging-Date`. Passed in so creation is reproducible.
    pub bagging_date: NaiveDate,
    pub software_agent: String,
    /// Additional `bag-info.txt` records, written after the standard ones.
    pub extra_tags: Vec<(String, String)>,
}

impl CreateOptions {
    pub fn new(bagging_date: NaiveDate) -> Self {
        Self {
            algorithms: vec![HashAlgorithm::default()],
            processes: 1,
            bagging_date,
            software_agent: default_software_agent(),
            extra_tags: Vec::new(),
        }
    }

    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = HashAlgorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        self
    }

    pub fn with_processes(mut self, processes: usize) -> Self {
        self.processes = processes;
        self
    }

    pub fn with_tag(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_tags.push((label.into(), value.into()));
        self
    }
}

pub(crate) fn run(bag: &Bag, options: &CreateOptions) -> Result<(), BagError> {
    let root = bag.root();
    walk::ensure_directory(root)?;
    if options.algorithms.is_empty() {
        return Err(BagError::NoAlgorithm);
    }
    let mut algorithms = options.algorithms.clone();
    algorithms.sort();
    algorithms.dedup();

    let children = walk::child_paths(root)?;
    if children.is_empty() {
        return Err(BagError::EmptyPayload(root.to_path_buf()));
    }

    info!(bag = %root.display(), "creating bag for directory");
    relocate_payload(bag, &children)?;

    for &algorithm in &algorithms {
        write_payload_manifest(bag, algorithm, options.processes)?;
    }

    info!("creating {BAGIT_TXT}");
    bag.store.write(&TagFile::declaration(), &root.join(BAGIT_TXT))?;

    let oxum = bag.oxum()?;
    let mut info = TagFile::new();
    info.push(BAG_SOFTWARE_AGENT, options.software_agent.as_str());
    info.push(BAGGING_DATE, options.bagging_date.format("%Y-%m-%d").to_string());
    info.push(PAYLOAD_OXUM, oxum.to_string());
    for (label, value) in &options.extra_tags {
        info.push(label.as_str(), value.as_str());
    }
    info!("creating {BAG_INFO_TXT}");
    bag.store.write(&info, &root.join(BAG_INFO_TXT))?;

    for &algorithm in &algorithms {
        write_tag_manifest(bag, algorithm, options.processes)?;
    }

    info!(bag = %root.display(), %oxum, "bag created");
    Ok(())
}

/// Move every top-level entry of the directory under `data/`.
///
/// Entries go into a staging directory first so that a pre-existing
/// `data` entry can itself be moved into the payload.
fn relocate_payload(bag: &Bag, children: &[PathBuf]) -> Result<(), BagError> {
    let staging = bag
        .root()
        .join(format!(".bagr-staging-{}", std::process::id()));
    fs::create_dir(&staging).map_err(|e| BagError::io("create directory", &staging, e))?;
    for child in children {
        let Some(name) = child.file_name() else {
            continue;
        };
        debug!(from = %child.display(), "moving into payload");
        bag.mover.relocate(child, &staging.join(name))?;
    }
    bag.mover.relocate(&staging, &bag.payload_dir())
}

/// Hash every payload file and write `manifest-<alg>.txt`.
pub(crate) fn write_payload_manifest(
    bag: &Bag,
    algorithm: HashAlgorithm,
    processes: usize,
) -> Result<Manifest, BagError> {
    let files = walk::payload_files(bag.root())?.into_named()?;
    build_manifest(bag, &ManifestName::payload(algorithm), files, processes)
}

/// Hash every tag file and write `tagmanifest-<alg>.txt`.
pub(crate) fn write_tag_manifest(
    bag: &Bag,
    algorithm: HashAlgorithm,
    processes: usize,
) -> Result<Manifest, BagError> {
    let files = walk::tag_files(bag.root())?.into_named()?;
    build_manifest(bag, &ManifestName::tag(algorithm), files, processes)
}

fn build_manifest(
    bag: &Bag,
    name: &ManifestName,
    files: Vec<WalkedFile>,
    processes: usize,
) -> Result<Manifest, BagError> {
    info!(manifest = %name, files = files.len(), "generating manifest");
    let paths: Vec<BagPath> = files.into_iter().map(|f| f.path).collect();
    let mut outcome = hash_files(bag.root(), &paths, name.algorithm, processes);
    if let Some(failure) = outcome.failures.drain(..).next() {
        return Err(BagError::HashFile {
            path: failure.path.to_string(),
            source: failure.error,
        });
    }

    let mut manifest = Manifest::new(name.algorithm);
    for path in paths {
        let Some(digest) = outcome.digests.remove(&path) else {
            continue;
        };
        if let Err(dup) = manifest.insert(ManifestEntry::new(path.as_str(), &digest, name.algorithm)) {
            warn!(path = %dup.path, "skipping duplicate manifest entry");
        }
    }
    manifest.write(&bag.manifest_path(name))?;
    Ok(manifest)
}
