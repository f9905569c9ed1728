//! Digesting many files on a fixed pool of worker threads.
//!
//! Paths go into a shared queue; each worker pulls paths, opens and reads
//! its own files, and keeps its own partial result. Once the queue is
//! drained, the partials are merged on the calling thread. No state is
//! shared between workers apart from the queue.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use bag_hash::{digest_file, HashAlgorithm, HashError};
use bag_utils::BagPath;
use crossbeam::channel;
use tracing::debug;

/// Upper bound on worker threads, and so on concurrently open files.
pub const MAX_WORKERS: usize = 64;

/// Why a single file could not be digested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Missing,
    PermissionDenied,
    Read,
}

/// A file that could not be digested.
#[derive(Debug)]
pub struct HashFailure {
    pub path: BagPath,
    pub kind: FailureKind,
    pub error: HashError,
}

impl HashFailure {
    fn new(path: BagPath, error: HashError) -> Self {
        let kind = match &error {
            HashError::Read { source, .. } | HashError::Io(source) => match source.kind() {
                io::ErrorKind::NotFound => FailureKind::Missing,
                io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
                _ => FailureKind::Read,
            },
            _ => FailureKind::Read,
        };
        Self { path, kind, error }
    }
}

/// Digests computed by [`hash_files`], plus every per-file failure.
#[derive(Debug, Default)]
pub struct HashOutcome {
    pub digests: HashMap<BagPath, String>,
    /// Sorted by path.
    pub failures: Vec<HashFailure>,
}

impl HashOutcome {
    fn merge(&mut self, other: HashOutcome) {
        self.digests.extend(other.digests);
        self.failures.extend(other.failures);
    }
}

/// Clamp a requested worker count to `1..=MAX_WORKERS`, and to the number
/// of jobs so idle threads are never spawned.
pub fn effective_workers(requested: usize, jobs: usize) -> usize {
    requested.clamp(1, MAX_WORKERS).min(jobs.max(1))
}

/// Digest every file in `paths` (relative to `root`) with `workers` threads.
///
/// A failing file is recorded and the rest are still processed. A worker
/// count of 0 is treated as 1, and 1 runs on the calling thread.
pub fn hash_files(
    root: &Path,
    paths: &[BagPath],
    algorithm: HashAlgorithm,
    workers: usize,
) -> HashOutcome {
    let workers = effective_workers(workers, paths.len());
    debug!(files = paths.len(), workers, %algorithm, "hashing files");

    let mut outcome = if workers == 1 {
        hash_partition(root, paths.iter(), algorithm)
    } else {
        let (tx, rx) = channel::unbounded::<&BagPath>();
        for path in paths {
            if tx.send(path).is_err() {
                break;
            }
        }
        drop(tx);

        let partials: Vec<HashOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let rx = rx.clone();
                    scope.spawn(move || hash_partition(root, rx.iter(), algorithm))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut merged = HashOutcome::default();
        for partial in partials {
            merged.merge(partial);
        }
        merged
    };

    outcome.failures.sort_by(|a, b| a.path.cmp(&b.path));
    outcome
}

fn hash_partition<'a>(
    root: &Path,
    paths: impl Iterator<Item = &'a BagPath>,
    algorithm: HashAlgorithm,
) -> HashOutcome {
    let mut partial = HashOutcome::default();
    for path in paths {
        match digest_file(algorithm, &path.to_fs_path(root)) {
            Ok(digest) => {
                debug!(path = %path, %digest, "digested");
                partial.digests.insert(path.clone(), digest);
            }
            Err(error) => {
                debug!(path = %path, %error, "digest failed");
                partial.failures.push(HashFailure::new(path.clone(), error));
            }
        }
    }
    partial
}
