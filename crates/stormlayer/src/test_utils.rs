//! Test utilities for building client data trees on disk
//!
//! Archives are written as small JSON fixtures and opened through
//! [`FixtureOpener`], which turns them into [`MemoryArchive`]s. This keeps
//! manager tests on the real filesystem probing path without real MPQ files.

use crate::archive::{ArchiveBackend, ArchiveOpener, MemoryArchive};
use crate::record_table::RecordTableHeader;
use crate::{ArchiveError, Locale, Result};
use binrw::BinWrite;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

/// JSON fixture describing one archive
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Fixture {
    /// Logical path to content
    pub files: BTreeMap<String, String>,
    /// Logical path to declared size, for entries whose size lies
    #[serde(default)]
    pub declared: BTreeMap<String, u64>,
}

/// Write an archive fixture holding `files`.
pub fn write_archive(path: &Path, files: &[(&str, &str)]) {
    let fixture = Fixture {
        files: files
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
        declared: BTreeMap::new(),
    };
    write_fixture(path, &fixture);
}

/// Write an arbitrary fixture.
#[allow(clippy::expect_used)]
pub fn write_fixture(path: &Path, fixture: &Fixture) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    let json = serde_json::to_vec(fixture).expect("serialize fixture");
    std::fs::write(path, json).expect("write fixture");
}

/// Write one archive per base name into `data_dir`, each holding `files`.
pub fn write_base_archives(data_dir: &Path, names: &[&str], files: &[(&str, &str)]) {
    for name in names {
        write_archive(&data_dir.join(name), files);
    }
}

/// Write a locale base pack.
pub fn write_locale_pack(data_dir: &Path, locale: Locale, files: &[(&str, &str)]) {
    write_archive(&locale.base_pack(data_dir), files);
}

/// WDBC table text with `(id, name)` records, ids starting at 1.
///
/// Short names keep every byte ASCII so the table fits in a fixture.
#[allow(clippy::expect_used)]
pub fn record_table_text(names: &[&str]) -> String {
    let mut strings = vec![0u8];
    let mut offsets = Vec::new();
    for name in names {
        offsets.push(strings.len() as u32);
        strings.extend_from_slice(name.as_bytes());
        strings.push(0);
    }

    let mut out = Cursor::new(Vec::new());
    RecordTableHeader::new(names.len() as u32, 2, 8, strings.len() as u32)
        .write(&mut out)
        .expect("header write");
    let mut data = out.into_inner();

    for (id, offset) in (1u32..).zip(offsets) {
        data.extend_from_slice(&id.to_le_bytes());
        data.extend_from_slice(&offset.to_le_bytes());
    }
    data.extend_from_slice(&strings);
    String::from_utf8(data).expect("ascii record table")
}

/// Opens JSON fixtures as in-memory archives.
#[derive(Debug, Default)]
pub struct FixtureOpener;

impl ArchiveOpener for FixtureOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveBackend>> {
        let text = std::fs::read(path)?;
        let fixture: Fixture =
            serde_json::from_slice(&text).map_err(|e| ArchiveError::CorruptArchive {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut archive = MemoryArchive::new();
        for (name, content) in fixture.files {
            match fixture.declared.get(&name) {
                Some(&size) => archive.insert_declared(&name, content.into_bytes(), size),
                None => archive.insert(&name, content.into_bytes()),
            }
        }
        Ok(Box::new(archive))
    }
}
