//! Content digests for bag manifests.
//!
//! This crate provides the `HashAlgorithm` selector, a streaming `Hasher`
//! producing lowercase hex digests, and helpers for digesting readers and
//! files in bounded chunks.

mod error;
pub mod hex;
mod algorithm;
pub mod hasher;

pub use algorithm::HashAlgorithm;
pub use error::HashError;
pub use hasher::{digest_file, digest_reader, Hasher};
