//! Process-wide shared archive manager.
//!
//! Applications that cannot thread an [`ArchiveManager`] reference through
//! their call graph can install one instance here at startup, before any
//! worker thread runs. Lookups through [`get`] before [`install`] fail with
//! [`ArchiveError::NotInitialized`] instead of returning empty results.

use crate::{ArchiveConfig, ArchiveError, ArchiveManager, Result};
use std::sync::OnceLock;

static MANAGER: OnceLock<ArchiveManager> = OnceLock::new();

/// Install an initialized manager as the shared instance.
///
/// # Errors
///
/// Returns [`ArchiveError::AlreadyInitialized`] if a manager was installed
/// before.
pub fn install(manager: ArchiveManager) -> Result<&'static ArchiveManager> {
    MANAGER
        .set(manager)
        .map_err(|_| ArchiveError::AlreadyInitialized)?;
    get()
}

/// Initialize a manager from `config` and install it.
pub fn initialize(config: ArchiveConfig) -> Result<&'static ArchiveManager> {
    if is_initialized() {
        return Err(ArchiveError::AlreadyInitialized);
    }
    install(ArchiveManager::initialize(config)?)
}

/// The shared manager.
///
/// # Errors
///
/// Returns [`ArchiveError::NotInitialized`] if no manager was installed.
pub fn get() -> Result<&'static ArchiveManager> {
    MANAGER.get().ok_or(ArchiveError::NotInitialized)
}

/// Whether a shared manager was installed
pub fn is_initialized() -> bool {
    MANAGER.get().is_some()
}
