//! `bagit.txt` / `bag-info.txt` style tag files.
//!
//! A tag file is a list of `Label: Value` records. A line starting with
//! whitespace continues the previous value. Labels are matched without
//! regard to ASCII case and may repeat.

use std::fs;
use std::path::Path;

use bag_utils::write_atomic;
use tracing::warn;

use crate::BagError;

pub const BAGIT_TXT: &str = "bagit.txt";
pub const BAG_INFO_TXT: &str = "bag-info.txt";

pub const BAGIT_VERSION: &str = "BagIt-Version";
pub const TAG_FILE_ENCODING: &str = "Tag-File-Character-Encoding";
pub const PAYLOAD_OXUM: &str = "Payload-Oxum";
pub const BAGGING_DATE: &str = "Bagging-Date";
pub const BAG_SOFTWARE_AGENT: &str = "Bag-Software-Agent";

/// Version written into new bags.
pub const SUPPORTED_VERSION: &str = "0.97";

/// Ordered tag records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFile {
    tags: Vec<(String, String)>,
}

impl TagFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed `bagit.txt` declaration.
    pub fn declaration() -> Self {
        let mut tags = Self::new();
        tags.push(BAGIT_VERSION, SUPPORTED_VERSION);
        tags.push(TAG_FILE_ENCODING, "UTF-8");
        tags
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.tags.push((label.into(), value.into()));
    }

    /// Replace the first record with `label`, or append one.
    pub fn set(&mut self, label: &str, value: impl Into<String>) {
        match self.tags.iter_mut().find(|(l, _)| l.eq_ignore_ascii_case(label)) {
            Some((_, v)) => *v = value.into(),
            None => self.push(label, value),
        }
    }

    /// First value recorded under `label`.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn parse(text: &str) -> Self {
        let mut tags = TagFile::new();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with([' ', '\t']) {
                match tags.tags.last_mut() {
                    Some((_, value)) => {
                        value.push(' ');
                        value.push_str(line.trim());
                    }
                    None => warn!(line = idx + 1, "continuation line before any tag"),
                }
                continue;
            }
            match line.split_once(':') {
                Some((label, value)) => tags.push(label.trim(), value.trim()),
                None => warn!(line = idx + 1, content = line, "ignoring tag line without ':'"),
            }
        }
        tags
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (label, value) in &self.tags {
            out.push_str(label);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

/// Reads and writes bag metadata files.
pub trait MetadataStore {
    fn read(&self, path: &Path) -> Result<TagFile, BagError>;
    fn write(&self, tags: &TagFile, path: &Path) -> Result<(), BagError>;
}

/// [`MetadataStore`] backed by UTF-8 tag files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagFileStore;

impl MetadataStore for TagFileStore {
    fn read(&self, path: &Path) -> Result<TagFile, BagError> {
        let text = fs::read_to_string(path).map_err(|e| BagError::io("read", path, e))?;
        Ok(TagFile::parse(&text))
    }

    fn write(&self, tags: &TagFile, path: &Path) -> Result<(), BagError> {
        write_atomic(path, tags.serialize().as_bytes())?;
        Ok(())
    }
}
