//! Bag creation, fixity checking and validation.
//!
//! A bag is a directory holding a `data/` payload, one
//! `manifest-<alg>.txt` per checksum algorithm, optional
//! `tagmanifest-<alg>.txt` files covering the metadata, and the `bagit.txt`
//! and `bag-info.txt` tag files. [`Bag`] ties the pieces together:
//!
//! - [`Bag::create`] turns a directory into a bag in place.
//! - [`Bag::validate`] checks a bag, either fast (Payload-Oxum only) or
//!   complete (every digest recomputed, payload reconciled with manifests).
//! - [`Bag::add_tag_file`] and [`Bag::add_payload_file`] extend a bag and
//!   revalidate it.

mod add;
mod create;
mod error;
pub mod fs;
mod oxum;
pub mod parallel;
mod report;
pub mod tagfile;
mod validate;
pub mod walk;

pub use create::{default_software_agent, CreateOptions};
pub use error::BagError;
pub use fs::{FileMover, LocalFs};
pub use oxum::Oxum;
pub use parallel::{hash_files, HashOutcome, MAX_WORKERS};
pub use report::{Problem, ValidationMode, ValidationReport};
pub use tagfile::{MetadataStore, TagFile, TagFileStore};
pub use validate::ValidateOptions;

use std::path::{Path, PathBuf};

use bag_manifest::{ManifestError, ManifestKind, ManifestName};
use bag_utils::path::PAYLOAD_DIR;

/// Manifest files found at a bag root.
#[derive(Debug, Default)]
pub struct ManifestSet {
    pub payload: Vec<ManifestName>,
    pub tag: Vec<ManifestName>,
    /// Manifest-shaped names with an algorithm this crate does not know.
    pub unsupported: Vec<ManifestError>,
}

/// A bag on the local filesystem.
pub struct Bag {
    root: PathBuf,
    mover: Box<dyn FileMover>,
    store: Box<dyn MetadataStore>,
}

impl std::fmt::Debug for Bag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bag")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Bag {
    fn at(root: &Path, mover: Box<dyn FileMover>, store: Box<dyn MetadataStore>) -> Self {
        Self {
            root: root.to_path_buf(),
            mover,
            store,
        }
    }

    /// Open an existing bag. The directory must contain `data/`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BagError> {
        let path = path.as_ref();
        walk::ensure_directory(path)?;
        if !path.join(PAYLOAD_DIR).is_dir() {
            return Err(BagError::NotABag(path.to_path_buf()));
        }
        Ok(Self::at(path, Box::new(LocalFs), Box::new(TagFileStore)))
    }

    /// Turn the directory `dir` into a bag, moving its contents into `data/`.
    ///
    /// Not atomic: if a step fails the directory is left partly bagged and
    /// the error names the step and path.
    pub fn create(dir: impl AsRef<Path>, options: &CreateOptions) -> Result<Self, BagError> {
        Self::create_with(dir, options, Box::new(LocalFs), Box::new(TagFileStore))
    }

    /// [`Bag::create`] with caller-supplied collaborators.
    pub fn create_with(
        dir: impl AsRef<Path>,
        options: &CreateOptions,
        mover: Box<dyn FileMover>,
        store: Box<dyn MetadataStore>,
    ) -> Result<Self, BagError> {
        let bag = Self::at(dir.as_ref(), mover, store);
        create::run(&bag, options)?;
        Ok(bag)
    }

    /// Replace the file mover and metadata store.
    pub fn with_collaborators(
        mut self,
        mover: Box<dyn FileMover>,
        store: Box<dyn MetadataStore>,
    ) -> Self {
        self.mover = mover;
        self.store = store;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn payload_dir(&self) -> PathBuf {
        self.root.join(PAYLOAD_DIR)
    }

    pub fn manifest_path(&self, name: &ManifestName) -> PathBuf {
        self.root.join(name.file_name())
    }

    /// Classify the files at the bag root by the manifest filename grammar.
    pub fn manifests(&self) -> Result<ManifestSet, BagError> {
        let mut set = ManifestSet::default();
        for file in walk::root_file_names(&self.root)? {
            match ManifestName::parse(&file) {
                Ok(Some(name)) => match name.kind {
                    ManifestKind::Payload => set.payload.push(name),
                    ManifestKind::Tag => set.tag.push(name),
                },
                Ok(None) => {}
                Err(e) => set.unsupported.push(e),
            }
        }
        Ok(set)
    }

    /// Compute the current Payload-Oxum of `data/`.
    pub fn oxum(&self) -> Result<Oxum, BagError> {
        Oxum::calculate(&self.payload_dir())
    }

    /// Validate the bag. Findings go into the report; only failures to
    /// inspect the bag at all are returned as errors.
    pub fn validate(&self, options: &ValidateOptions) -> Result<ValidationReport, BagError> {
        validate::run(self, options)
    }

    /// Copy `src` into the bag root as a tag file, record it in every
    /// tag-manifest, then validate the bag completely.
    pub fn add_tag_file(
        &self,
        src: impl AsRef<Path>,
        processes: usize,
    ) -> Result<ValidationReport, BagError> {
        add::add_tag_file(self, src.as_ref(), processes)
    }

    /// Copy `src` into the payload at `data/<dest>` (default: its file
    /// name), record it in every manifest, refresh Payload-Oxum and the
    /// tag-manifests, then validate the bag completely.
    pub fn add_payload_file(
        &self,
        src: impl AsRef<Path>,
        dest: Option<&str>,
        processes: usize,
    ) -> Result<ValidationReport, BagError> {
        add::add_payload_file(self, src.as_ref(), dest, processes)
    }
}
