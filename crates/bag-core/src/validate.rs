use std::collections::{HashMap, HashSet};

use bag_manifest::{Manifest, ManifestKind, ManifestName};
use bag_utils::BagPath;
use tracing::{info, warn};

use crate::parallel::{hash_files, FailureKind, HashFailure};
use crate::tagfile::{BAGIT_TXT, BAG_INFO_TXT, PAYLOAD_OXUM};
use crate::walk::{self, WalkedFile};
use crate::{Bag, BagError, Oxum, Problem, ValidationMode, ValidationReport};

/// Settings for one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    pub mode: ValidationMode,
    /// Worker threads used to recompute digests.
    pub processes: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Complete,
            processes: 1,
        }
    }
}

impl ValidateOptions {
    pub fn fast() -> Self {
        Self {
            mode: ValidationMode::Fast,
            ..Self::default()
        }
    }

    pub fn complete(processes: usize) -> Self {
        Self {
            mode: ValidationMode::Complete,
            processes,
        }
    }
}

enum StoredOxum {
    Absent,
    Invalid(String),
    Value(Oxum),
}

fn stored_oxum(bag: &Bag) -> Result<StoredOxum, BagError> {
    let path = bag.root().join(BAG_INFO_TXT);
    if !path.is_file() {
        return Ok(StoredOxum::Absent);
    }
    let tags = bag.store.read(&path)?;
    Ok(match tags.get(PAYLOAD_OXUM) {
        None => StoredOxum::Absent,
        Some(value) => match value.parse::<Oxum>() {
            Ok(oxum) => StoredOxum::Value(oxum),
            Err(_) => StoredOxum::Invalid(value.to_string()),
        },
    })
}

/// Run one validation pass.
///
/// Fast mode stops after the oxum comparison. Complete mode checks every
/// tag-manifest and payload manifest without stopping at the first bad
/// one, then reports payload files missing from any payload manifest and
/// files whose names no manifest could hold. In complete mode an
/// oxum mismatch is only reported when nothing more specific was found.
pub(crate) fn run(bag: &Bag, options: &ValidateOptions) -> Result<ValidationReport, BagError> {
    let root = bag.root();
    info!(bag = %root.display(), mode = ?options.mode, "validating bag");
    let mut report = ValidationReport::new(root, options.mode);

    let actual = bag.oxum()?;
    let mut deferred = None;
    match stored_oxum(bag)? {
        StoredOxum::Value(stored) if stored != actual => {
            deferred = Some(Problem::OxumMismatch { stored, actual });
        }
        StoredOxum::Value(_) => {}
        StoredOxum::Invalid(value) => report.push(Problem::InvalidOxum { value }),
        StoredOxum::Absent if options.mode == ValidationMode::Fast => {
            report.push(Problem::MissingOxum)
        }
        StoredOxum::Absent => warn!(bag = %root.display(), "bag-info.txt has no Payload-Oxum"),
    }

    if options.mode == ValidationMode::Fast {
        if let Some(problem) = deferred {
            report.push(problem);
        }
        if report.is_valid() {
            info!(bag = %root.display(), "valid according to Payload-Oxum");
        }
        return Ok(report);
    }

    if !root.join(BAGIT_TXT).is_file() {
        report.push(Problem::MissingDeclaration);
    }

    let manifests = bag.manifests()?;
    for error in manifests.unsupported {
        report.push(Problem::Manifest(error));
    }

    for name in &manifests.tag {
        check_manifest(bag, name, options.processes, &mut report);
    }

    let mut listed: Vec<(String, HashSet<BagPath>)> = Vec::new();
    for name in &manifests.payload {
        if let Some(manifest) = check_manifest(bag, name, options.processes, &mut report) {
            let paths = manifest.iter().map(|e| e.path.clone()).collect();
            listed.push((name.file_name(), paths));
        }
    }

    let payload = walk::payload_files(root)?;
    for file in &payload.unnamed {
        let shown = file.path.strip_prefix(root).unwrap_or(&file.path);
        report.push(Problem::NonUtf8Name {
            path: shown.display().to_string(),
        });
    }
    if manifests.payload.is_empty() {
        report.push(Problem::NoManifest);
    } else if !listed.is_empty() {
        reconcile(&payload.files, &listed, &mut report);
    }

    if let Some(problem) = deferred {
        if report.is_valid() {
            report.push(problem);
        }
    }

    if report.is_valid() {
        info!(bag = %root.display(), "bag is valid");
    } else {
        warn!(problems = report.problems().len(), "{}", report.message());
    }
    Ok(report)
}

/// Every payload file must appear in every readable payload manifest.
fn reconcile(
    files: &[WalkedFile],
    listed: &[(String, HashSet<BagPath>)],
    report: &mut ValidationReport,
) {
    for file in files {
        let absent: Vec<&str> = listed
            .iter()
            .filter(|(_, paths)| !paths.contains(&file.path))
            .map(|(manifest, _)| manifest.as_str())
            .collect();
        if absent.len() == listed.len() {
            report.push(Problem::UnlistedFile {
                path: file.path.to_string(),
            });
            continue;
        }
        for manifest in absent {
            report.push(Problem::NotInManifest {
                manifest: manifest.to_string(),
                path: file.path.to_string(),
            });
        }
    }
}

/// Recompute and compare every entry of one manifest.
///
/// Returns the parsed manifest unless the file could not be read at all.
fn check_manifest(
    bag: &Bag,
    name: &ManifestName,
    processes: usize,
    report: &mut ValidationReport,
) -> Option<Manifest> {
    let file = name.file_name();
    let parsed = match Manifest::read(&bag.manifest_path(name), name.algorithm) {
        Ok(parsed) => parsed,
        Err(e) => {
            report.push(Problem::Manifest(e));
            return None;
        }
    };
    for error in parsed.errors {
        report.push(Problem::Manifest(error));
    }
    let manifest = parsed.manifest;

    let mut to_hash = Vec::with_capacity(manifest.len());
    for entry in manifest.iter() {
        if name.kind == ManifestKind::Payload && !entry.path.is_payload() {
            report.push(Problem::OutsidePayload {
                manifest: file.clone(),
                path: entry.raw_path.clone(),
            });
            continue;
        }
        to_hash.push(entry.path.clone());
    }

    let outcome = hash_files(bag.root(), &to_hash, manifest.algorithm(), processes);
    let failures: HashMap<&BagPath, &HashFailure> =
        outcome.failures.iter().map(|f| (&f.path, f)).collect();

    for entry in manifest.iter() {
        if let Some(actual) = outcome.digests.get(&entry.path) {
            if !entry.matches(actual) {
                report.push(Problem::DigestMismatch {
                    path: entry.raw_path.clone(),
                    algorithm: manifest.algorithm().to_string(),
                    expected: entry.digest.clone(),
                    actual: actual.clone(),
                });
            }
        } else if let Some(failure) = failures.get(&entry.path) {
            let problem = match failure.kind {
                FailureKind::Missing => Problem::MissingFile {
                    manifest: file.clone(),
                    path: entry.raw_path.clone(),
                },
                FailureKind::PermissionDenied | FailureKind::Read => Problem::Unreadable {
                    manifest: file.clone(),
                    path: entry.raw_path.clone(),
                    reason: failure.error.to_string(),
                },
            };
            report.push(problem);
        }
    }

    info!(manifest = %file, entries = manifest.len(), "checked manifest");
    Some(manifest)
}
