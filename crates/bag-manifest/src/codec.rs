//! Reading and writing `<digest>  <path>` manifest text.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bag_hash::hex::is_hex_digest;
use bag_hash::HashAlgorithm;
use bag_utils::{write_atomic, BagPath};

use crate::{ManifestEntry, ManifestError};

/// Separator written between digest and path.
pub const SEPARATOR: &str = "  ";

/// An ordered set of manifest entries for a single algorithm.
///
/// Entries keep insertion order (the order of the walk that produced them);
/// lookups go through the normalized [`BagPath`].
#[derive(Debug, Clone)]
pub struct Manifest {
    algorithm: HashAlgorithm,
    entries: Vec<ManifestEntry>,
    index: HashMap<BagPath, usize>,
}

/// Result of parsing manifest text: every good entry plus every bad line.
#[derive(Debug)]
pub struct ParsedManifest {
    pub manifest: Manifest,
    pub errors: Vec<ManifestError>,
}

impl Manifest {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    pub fn get(&self, path: &BagPath) -> Option<&ManifestEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, path: &BagPath) -> bool {
        self.index.contains_key(path)
    }

    /// Add an entry. Returns the rejected entry if its path is already
    /// present; the first entry for a path always wins.
    pub fn insert(&mut self, entry: ManifestEntry) -> Result<(), ManifestEntry> {
        if self.index.contains_key(&entry.path) {
            return Err(entry);
        }
        self.index.insert(entry.path.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Parse manifest text. `file` is only used to label errors.
    pub fn parse(text: &str, algorithm: HashAlgorithm, file: &str) -> ParsedManifest {
        let mut manifest = Manifest::new(algorithm);
        let mut errors = Vec::new();

        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        for (idx, line) in text.split('\n').enumerate() {
            let line_no = idx + 1;
            let line = line.strip_suffix('\r').unwrap_or(line);
            let trimmed = line.trim_start();
            if trimmed.trim_end().is_empty() {
                continue;
            }

            let malformed = |reason: &'static str| ManifestError::MalformedLine {
                file: file.to_string(),
                line: line_no,
                content: line.to_string(),
                reason,
            };

            let Some(split) = trimmed.find(char::is_whitespace) else {
                errors.push(malformed("no path after digest"));
                continue;
            };
            let digest = &trimmed[..split];
            // Trailing whitespace is dropped from paths.
            let raw_path = trimmed[split..].trim();
            if raw_path.is_empty() {
                errors.push(malformed("no path after digest"));
                continue;
            }
            if !is_hex_digest(digest, algorithm.hex_len()) {
                errors.push(malformed("digest is not a valid hex value for the algorithm"));
                continue;
            }

            let raw_path = decode_path(raw_path);
            if !BagPath::is_contained(&raw_path) {
                errors.push(ManifestError::UnsafePath {
                    file: file.to_string(),
                    line: line_no,
                    path: raw_path,
                });
                continue;
            }

            if let Err(dup) = manifest.insert(ManifestEntry::new(raw_path, digest, algorithm)) {
                errors.push(ManifestError::DuplicateEntry {
                    file: file.to_string(),
                    line: line_no,
                    path: dup.raw_path,
                });
            }
        }

        ParsedManifest { manifest, errors }
    }

    /// Read and parse a manifest file.
    pub fn read(path: &Path, algorithm: HashAlgorithm) -> Result<ParsedManifest, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::parse(&text, algorithm, &label))
    }

    /// Render as manifest text, one line per entry, in insertion order.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            push_line(&mut out, entry);
        }
        out
    }

    /// Replace the file at `path` with this manifest.
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        write_atomic(path, self.serialize().as_bytes()).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Append entries to the manifest file at `path`, keeping what is there.
    ///
    /// The file is rewritten as a whole so a reader never sees a partial
    /// line.
    pub fn append_to(path: &Path, entries: &[ManifestEntry]) -> Result<(), ManifestError> {
        let mut text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(ManifestError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        for entry in entries {
            push_line(&mut text, entry);
        }
        write_atomic(path, text.as_bytes()).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn push_line(out: &mut String, entry: &ManifestEntry) {
    out.push_str(&entry.digest);
    out.push_str(SEPARATOR);
    out.push_str(&encode_path(&entry.raw_path));
    out.push('\n');
}

/// Percent-encode the characters that cannot appear raw in a manifest line.
pub fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '%' => out.push_str("%25"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`encode_path`]. Other `%` sequences are left as they are.
pub fn decode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = match tail.get(..3) {
            Some(seq) if seq.eq_ignore_ascii_case("%25") => Some('%'),
            Some(seq) if seq.eq_ignore_ascii_case("%0D") => Some('\r'),
            Some(seq) if seq.eq_ignore_ascii_case("%0A") => Some('\n'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
