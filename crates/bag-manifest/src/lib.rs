//! Manifest files for bags.
//!
//! A manifest maps bag-relative paths to content digests, one
//! `<digest>  <path>` line per file. Payload manifests
//! (`manifest-<alg>.txt`) cover everything under `data/`; tag-manifests
//! (`tagmanifest-<alg>.txt`) cover the metadata files at the bag root.
//!
//! Parsing never stops at a bad line: well-formed entries are collected and
//! each problem line is returned alongside them as a [`ManifestError`].

mod entry;
mod error;
pub mod codec;
pub mod name;

pub use codec::{Manifest, ParsedManifest};
pub use entry::ManifestEntry;
pub use error::ManifestError;
pub use name::{ManifestKind, ManifestName};
