//! In-memory archive backend

use super::{ArchiveBackend, EntryInfo, normalize_path};
use crate::Result;
use bytes::Bytes;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct MemoryEntry {
    data: Bytes,
    declared_size: u64,
}

/// Archive backend holding its entries in memory.
///
/// Lookups are case-insensitive and accept either separator, like MPQ
/// name hashing. An entry can declare a size that differs from its data to
/// model damaged directory entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: BTreeMap<String, MemoryEntry>,
}

impl MemoryArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    fn key(path: &str) -> String {
        normalize_path(path).to_ascii_uppercase()
    }

    /// Add or replace an entry whose declared size matches its data.
    pub fn insert(&mut self, path: &str, data: impl Into<Bytes>) {
        let data = data.into();
        let declared_size = data.len() as u64;
        self.insert_declared(path, data, declared_size);
    }

    /// Add or replace an entry with an explicit declared size.
    pub fn insert_declared(&mut self, path: &str, data: impl Into<Bytes>, declared_size: u64) {
        self.entries.insert(
            Self::key(path),
            MemoryEntry {
                data: data.into(),
                declared_size,
            },
        );
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with_file(mut self, path: &str, data: impl Into<Bytes>) -> Self {
        self.insert(path, data);
        self
    }

    /// Builder form of [`insert_declared`](Self::insert_declared)
    #[must_use]
    pub fn with_file_declared(
        mut self,
        path: &str,
        data: impl Into<Bytes>,
        declared_size: u64,
    ) -> Self {
        self.insert_declared(path, data, declared_size);
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArchiveBackend for MemoryArchive {
    fn find_entry(&mut self, path: &str) -> Result<Option<EntryInfo>> {
        Ok(self.entries.get(&Self::key(path)).map(|entry| EntryInfo {
            unpacked_size: entry.declared_size,
        }))
    }

    fn read_entry(&mut self, path: &str, _entry: &EntryInfo, out: &mut Vec<u8>) -> Result<()> {
        if let Some(entry) = self.entries.get(&Self::key(path)) {
            out.extend_from_slice(&entry.data);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_separator_insensitive() {
        let mut archive = MemoryArchive::new().with_file("World/Maps/Test.wdt", b"wdt".to_vec());

        let entry = archive
            .find_entry("WORLD\\MAPS\\test.WDT")
            .unwrap()
            .expect("entry present");
        assert_eq!(entry.unpacked_size, 3);

        let mut out = Vec::new();
        archive.read_entry("world\\maps\\test.wdt", &entry, &mut out).unwrap();
        assert_eq!(out, b"wdt");
    }

    #[test]
    fn test_insert_replaces() {
        let mut archive = MemoryArchive::new();
        archive.insert("a.txt", b"v1".to_vec());
        archive.insert("A.TXT", b"v2!".to_vec());

        assert_eq!(archive.len(), 1);
        let entry = archive.find_entry("a.txt").unwrap().unwrap();
        assert_eq!(entry.unpacked_size, 3);
    }

    #[test]
    fn test_declared_size() {
        let mut archive = MemoryArchive::new().with_file_declared("b.txt", b"payload".to_vec(), 1);
        let entry = archive.find_entry("b.txt").unwrap().unwrap();
        assert_eq!(entry.unpacked_size, 1);
        assert!(MemoryArchive::new().is_empty());
    }
}
