//! Shared helpers for stormlayer integration tests
//!
//! Client data trees are written to a temporary directory. Each archive is a
//! JSON object mapping logical paths to contents, opened as a
//! [`MemoryArchive`] by [`JsonOpener`].

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use binrw::BinWrite;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use stormlayer::record_table::RecordTableHeader;
use stormlayer::{
    ArchiveBackend, ArchiveConfig, ArchiveError, ArchiveManager, ArchiveOpener, Locale,
    MemoryArchive,
};
use tempfile::TempDir;

/// Base archives used by the test layouts, lowest precedence first
pub const BASE_ARCHIVES: [&str; 3] = ["common.MPQ", "expansion.MPQ", "patch.MPQ"];

/// Build a WDBC table with one `(id, name)` record per name.
///
/// With fewer than 128 bytes of names every byte is ASCII, so the table also
/// fits in a JSON fixture.
pub fn record_table(names: &[&str]) -> Vec<u8> {
    let mut strings = vec![0u8];
    let mut offsets = Vec::new();
    for name in names {
        offsets.push(strings.len() as u32);
        strings.extend_from_slice(name.as_bytes());
        strings.push(0);
    }

    let header = RecordTableHeader::new(names.len() as u32, 2, 8, strings.len() as u32);
    let mut out = Cursor::new(Vec::new());
    header.write(&mut out).expect("header write");
    let mut data = out.into_inner();

    for (id, offset) in offsets.into_iter().enumerate() {
        data.extend_from_slice(&(id as u32 + 1).to_le_bytes());
        data.extend_from_slice(&offset.to_le_bytes());
    }
    data.extend_from_slice(&strings);
    data
}

/// [`record_table`] as fixture text
pub fn record_table_text(names: &[&str]) -> String {
    String::from_utf8(record_table(names)).expect("ascii record table")
}

/// Opens JSON archive fixtures
pub struct JsonOpener;

impl ArchiveOpener for JsonOpener {
    fn open(&self, path: &Path) -> stormlayer::Result<Box<dyn ArchiveBackend>> {
        let text = std::fs::read(path)?;
        let files: BTreeMap<String, String> =
            serde_json::from_slice(&text).map_err(|e| ArchiveError::CorruptArchive {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut archive = MemoryArchive::new();
        for (name, content) in files {
            archive.insert(&name, content.into_bytes());
        }
        Ok(Box::new(archive))
    }
}

/// A temporary client `Data/` directory
pub struct ClientData {
    dir: TempDir,
}

impl ClientData {
    /// Empty data directory
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Data directory with every base archive present and empty
    pub fn with_empty_bases() -> Self {
        let data = Self::new();
        for name in BASE_ARCHIVES {
            data.archive(name, &[]);
        }
        data
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an archive at `relative` below the data directory
    pub fn archive(&self, relative: impl AsRef<Path>, files: &[(&str, &str)]) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create archive dir");
        }
        let map: BTreeMap<&str, &str> = files.iter().copied().collect();
        std::fs::write(&path, serde_json::to_vec(&map).expect("serialize")).expect("write");
        path
    }

    /// Write a locale base pack
    pub fn locale_pack(&self, locale: Locale, files: &[(&str, &str)]) -> PathBuf {
        let path = locale.base_pack(self.path());
        self.archive(path, files)
    }

    /// Write a locale patch with the given suffix (`""`, `"-2"`, `"-3"`)
    pub fn locale_patch(&self, locale: Locale, suffix: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = locale.patch_pack(self.path(), suffix);
        self.archive(path, files)
    }

    pub fn config(&self) -> ArchiveConfig {
        ArchiveConfig::new(self.path()).with_base_archives(BASE_ARCHIVES)
    }

    pub fn initialize(&self) -> stormlayer::Result<ArchiveManager> {
        ArchiveManager::initialize_with(self.config(), &JsonOpener)
    }
}
