//! MPQ backend built on `wow-mpq`

use super::{ArchiveBackend, ArchiveOpener, EntryInfo};
use crate::{ArchiveError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An opened MPQ archive
pub struct MpqArchive {
    path: PathBuf,
    archive: wow_mpq::Archive,
}

impl MpqArchive {
    /// Open and validate an MPQ file.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::CorruptArchive`] if the header or tables
    /// cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        let archive = wow_mpq::Archive::open(path).map_err(|e| ArchiveError::CorruptArchive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Loaded MPQ tables from {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Path of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveBackend for MpqArchive {
    fn find_entry(&mut self, path: &str) -> Result<Option<EntryInfo>> {
        let info = self
            .archive
            .find_file(path)
            .map_err(|e| ArchiveError::Extraction {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        Ok(info.map(|info| EntryInfo {
            unpacked_size: info.file_size,
        }))
    }

    fn read_entry(&mut self, path: &str, _entry: &EntryInfo, out: &mut Vec<u8>) -> Result<()> {
        let data = self
            .archive
            .read_file(path)
            .map_err(|e| ArchiveError::Extraction {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        out.extend_from_slice(&data);
        Ok(())
    }
}

/// Opens archives as MPQ files.
#[derive(Debug, Clone, Copy, Default)]
pub struct MpqOpener;

impl ArchiveOpener for MpqOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveBackend>> {
        Ok(Box::new(MpqArchive::open(path)?))
    }
}
