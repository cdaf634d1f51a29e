//! Archive handles over read-only container files.
//!
//! An [`ArchiveHandle`] wraps one opened container. The container format
//! itself is decoded by an [`ArchiveBackend`]:
//!
//! - [`MpqArchive`]: MPQ files, decoded by `wow-mpq`
//! - [`MemoryArchive`]: in-memory entries, for embedding and tests
//!
//! Handles never cache extracted content. Every [`ArchiveHandle::extract`]
//! decodes the entry again into a fresh buffer owned by the caller.

mod memory;
mod mpq;

pub use memory::MemoryArchive;
pub use mpq::{MpqArchive, MpqOpener};

use crate::{ArchiveError, DEGENERATE_ENTRY_SIZE, Locale, Result};
use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory entry reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    /// Declared decompressed size in bytes
    pub unpacked_size: u64,
}

/// Container decoder for one opened archive.
///
/// Implementations do not need to be thread safe; the archive stack
/// serializes every call behind a single lock.
pub trait ArchiveBackend: Send {
    /// Look up an entry by normalized logical path.
    fn find_entry(&mut self, path: &str) -> Result<Option<EntryInfo>>;

    /// Decode the full content of an entry, appending it to `out`.
    ///
    /// `out` arrives empty with capacity for `entry.unpacked_size` bytes.
    fn read_entry(&mut self, path: &str, entry: &EntryInfo, out: &mut Vec<u8>) -> Result<()>;
}

/// Opens container files during initialization.
pub trait ArchiveOpener {
    /// Open the container at `path`.
    ///
    /// The file is known to exist; implementations report format problems
    /// as [`ArchiveError::CorruptArchive`].
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveBackend>>;
}

/// Result of a successful path lookup inside one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndex {
    path: String,
    entry: EntryInfo,
}

impl FileIndex {
    /// Normalized logical path that was looked up
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory entry as reported by the backend
    pub const fn entry(&self) -> &EntryInfo {
        &self.entry
    }
}

/// Whether an unpacked size is too small to be real content.
pub const fn is_degenerate_size(size: u64) -> bool {
    size <= DEGENERATE_ENTRY_SIZE
}

/// Convert a logical path to the archive-native form.
///
/// MPQ directories use `\` as separator. Forward slashes are accepted and
/// converted, and leading separators are dropped.
pub fn normalize_path(path: &str) -> String {
    path.replace('/', "\\").trim_start_matches('\\').to_string()
}

/// One opened container archive
pub struct ArchiveHandle {
    path: PathBuf,
    locale: Option<Locale>,
    backend: Box<dyn ArchiveBackend>,
}

impl ArchiveHandle {
    /// Open the container at `path` with the given opener.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::ArchiveNotFound`] if the file does not exist,
    /// or the opener's error if the file fails validation.
    pub fn open(path: &Path, opener: &dyn ArchiveOpener) -> Result<Self> {
        if !path.is_file() {
            return Err(ArchiveError::ArchiveNotFound(path.to_path_buf()));
        }

        let backend = opener.open(path)?;
        debug!("Opened archive {}", path.display());
        Ok(Self::from_backend(path, backend))
    }

    /// Wrap an already opened backend.
    pub fn from_backend<P: AsRef<Path>>(path: P, backend: Box<dyn ArchiveBackend>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            locale: None,
            backend,
        }
    }

    /// Tag this archive as belonging to a locale pack.
    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Source file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locale of the pack this archive belongs to, `None` for base archives
    pub const fn locale(&self) -> Option<Locale> {
        self.locale
    }

    /// Look up a logical path.
    ///
    /// Decoder errors during lookup are logged and treated as absence.
    pub fn resolve(&mut self, logical_path: &str) -> Option<FileIndex> {
        let path = normalize_path(logical_path);
        match self.backend.find_entry(&path) {
            Ok(entry) => entry.map(|entry| FileIndex { path, entry }),
            Err(e) => {
                warn!(
                    "Lookup of {path} failed in {}: {e}",
                    self.path.display()
                );
                None
            }
        }
    }

    /// Declared decompressed size of a resolved entry.
    pub const fn unpacked_size(&self, index: &FileIndex) -> u64 {
        index.entry.unpacked_size
    }

    /// Decode a resolved entry into a new buffer of exactly `size` bytes.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::ResourceExhausted`] if the buffer cannot be allocated
    /// - [`ArchiveError::TruncatedEntry`] if the decoder produced a different
    ///   number of bytes
    /// - the backend's error if decoding fails
    pub fn extract(&mut self, index: &FileIndex, size: u64) -> Result<Bytes> {
        let exhausted = || ArchiveError::ResourceExhausted {
            path: index.path.clone(),
            size,
        };

        let capacity = usize::try_from(size).map_err(|_| exhausted())?;
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(capacity).map_err(|_| exhausted())?;

        self.backend.read_entry(&index.path, &index.entry, &mut buffer)?;

        if buffer.len() as u64 != size {
            return Err(ArchiveError::TruncatedEntry {
                path: index.path.clone(),
                expected: size,
                actual: buffer.len() as u64,
            });
        }

        Ok(Bytes::from(buffer))
    }

    /// Full lookup in this archive: resolve, reject degenerate sizes, extract.
    ///
    /// Returns `Ok(None)` when the path is absent or degenerate here.
    pub fn read(&mut self, logical_path: &str) -> Result<Option<Bytes>> {
        let Some(index) = self.resolve(logical_path) else {
            return Ok(None);
        };

        let size = self.unpacked_size(&index);
        if is_degenerate_size(size) {
            debug!(
                "Skipping degenerate entry {} ({size} bytes) in {}",
                index.path,
                self.path.display()
            );
            return Ok(None);
        }

        self.extract(&index, size).map(Some)
    }
}

impl fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("path", &self.path)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}
