//! Patch-aware file lookup over stacked MPQ archives.
//!
//! World of Warcraft clients up to Wrath of the Lich King ship their data as
//! a set of read-only MPQ archives under `Data/`. Later archives patch earlier
//! ones, and every installed locale adds its own pack plus locale patches
//! under `Data/<locale>/`. This crate opens that set once and answers "what
//! are the current bytes of this logical path" with correct patch precedence.
//!
//! - **Archive handles** ([`archive`]): one opened container, behind the
//!   [`ArchiveBackend`] seam. MPQ decoding is delegated to `wow-mpq`.
//! - **Archive stack** ([`stack`]): every opened handle in registration
//!   order, plus non-owning per-locale sets.
//! - **Archive manager** ([`manager`]): initialization and the resolution API.
//!
//! # Example
//!
//! ```rust,no_run
//! use stormlayer::{ArchiveConfig, ArchiveManager, Locale};
//!
//! # fn example() -> stormlayer::Result<()> {
//! let manager = ArchiveManager::initialize(ArchiveConfig::new("/path/to/wow/Data"))?;
//!
//! if let Some(bytes) = manager.resolve("World\\Maps\\Azeroth\\Azeroth.wdt")? {
//!     println!("{} bytes", bytes.len());
//! }
//!
//! let map = manager.resolve_record_table("Map")?;
//! println!("{} maps", map.record_count());
//!
//! let strings = manager.resolve_for_locale("DBFilesClient\\Spell.dbc", Locale::DeDe)?;
//! # let _ = strings;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use std::path::PathBuf;
use thiserror::Error;

// Archive handles and decoder backends
pub mod archive;

// Supported client locales
pub mod locale;

// Registration-ordered archive stack
pub mod stack;

// Initialization and resolution API
pub mod manager;

// Process-wide shared manager
pub mod global;

// Configuration
pub mod config;

// DBC record tables
pub mod record_table;

#[cfg(test)]
pub(crate) mod test_utils;

pub use archive::{
    ArchiveBackend, ArchiveHandle, ArchiveOpener, EntryInfo, FileIndex, MemoryArchive, MpqArchive,
    MpqOpener, is_degenerate_size, normalize_path,
};
pub use config::ArchiveConfig;
pub use locale::Locale;
pub use manager::{ArchiveInfo, ArchiveManager};
pub use record_table::RecordTable;
pub use stack::{ArchiveId, ArchiveStack, LocaleArchiveSet};

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while opening archives or resolving files.
///
/// Initialization errors (`ArchiveNotFound`, `CorruptArchive`,
/// `NoLocaleAvailable`) and `ResourceExhausted` are fatal for the embedding
/// application. A path that exists nowhere is reported as an absent result,
/// not as an error, except by [`ArchiveManager::resolve_record_table`].
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A mandatory archive file is missing.
    #[error("Archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// The archive exists but failed format validation.
    #[error("Corrupt archive {}: {reason}", path.display())]
    CorruptArchive {
        /// Archive file path
        path: PathBuf,
        /// Decoder error message
        reason: String,
    },

    /// No locale base pack was found below the data directory.
    #[error("No locale data detected in {}", data_dir.display())]
    NoLocaleAvailable {
        /// Data directory that was probed
        data_dir: PathBuf,
    },

    /// The logical path exists in no searched archive.
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// The destination buffer for an entry could not be allocated.
    #[error("Cannot allocate {size} bytes for {path}")]
    ResourceExhausted {
        /// Logical path being extracted
        path: String,
        /// Requested buffer size
        size: u64,
    },

    /// The decoder produced a different number of bytes than declared.
    #[error("Truncated entry {path}: expected {expected} bytes, got {actual}")]
    TruncatedEntry {
        /// Logical path being extracted
        path: String,
        /// Declared unpacked size
        expected: u64,
        /// Bytes actually produced
        actual: u64,
    },

    /// The decoder failed to extract an entry.
    #[error("Failed to extract {path}: {reason}")]
    Extraction {
        /// Logical path being extracted
        path: String,
        /// Decoder error message
        reason: String,
    },

    /// Locale code is not one of the supported locales.
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    /// Archive id does not refer to an opened archive.
    #[error("Unknown archive id: {0}")]
    UnknownArchive(usize),

    /// Record table bytes are malformed.
    #[error("Invalid record table: {0}")]
    InvalidRecordTable(String),

    /// The shared manager was used before it was installed.
    #[error("Archive manager is not initialized")]
    NotInitialized,

    /// The shared manager was installed twice.
    #[error("Archive manager is already initialized")]
    AlreadyInitialized,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default data directory name below the client installation.
pub const DEFAULT_DATA_DIR: &str = "Data";

/// Directory inside the archives holding client database tables.
pub const RECORD_TABLE_DIR: &str = "DBFilesClient";

/// Largest unpacked size still considered degenerate.
///
/// Some patch archives report 0 or 1 bytes for entries that do not open.
/// Such entries are treated as absent.
pub const DEGENERATE_ENTRY_SIZE: u64 = 1;
