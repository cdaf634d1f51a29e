//! Registration-ordered archive stack and per-locale archive sets.
//!
//! The [`ArchiveStack`] owns every opened archive in the order it was
//! registered. Lookups walk it in reverse, so an archive registered later
//! shadows identical paths in every archive registered before it. That is
//! how patch precedence falls out: base archives are registered first and
//! each patch after the archives it patches.
//!
//! A [`LocaleArchiveSet`] does not own archives. It records the
//! [`ArchiveId`]s of one locale's base pack and patches so that a lookup can
//! be restricted to them.

use crate::archive::ArchiveHandle;
use crate::{ArchiveError, Locale, Result};
use bytes::Bytes;
use std::fmt;
use tracing::{debug, warn};

/// Position of an archive in the stack's registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveId(usize);

impl ArchiveId {
    /// Create an id from a registration index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Registration index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// All opened archives in registration order
#[derive(Debug, Default)]
pub struct ArchiveStack {
    archives: Vec<ArchiveHandle>,
}

impl ArchiveStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an archive above every archive registered so far.
    pub fn push(&mut self, archive: ArchiveHandle) -> ArchiveId {
        let id = ArchiveId(self.archives.len());
        self.archives.push(archive);
        id
    }

    /// Number of registered archives
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether no archive is registered
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Archive registered under `id`
    pub fn get(&self, id: ArchiveId) -> Option<&ArchiveHandle> {
        self.archives.get(id.0)
    }

    /// Archives in registration order (lowest precedence first)
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (ArchiveId, &ArchiveHandle)> {
        self.archives
            .iter()
            .enumerate()
            .map(|(i, archive)| (ArchiveId(i), archive))
    }

    /// Ids in search order (highest precedence first)
    pub fn search_order(&self) -> impl Iterator<Item = ArchiveId> {
        (0..self.archives.len()).rev().map(ArchiveId)
    }

    /// Resolve a path against the whole stack.
    ///
    /// Returns the winning archive together with its content, or `Ok(None)`
    /// if no archive holds a non-degenerate entry for the path.
    pub fn resolve(&mut self, path: &str) -> Result<Option<(ArchiveId, Bytes)>> {
        let ids: Vec<ArchiveId> = self.iter().map(|(id, _)| id).collect();
        self.resolve_in(&ids, path)
    }

    /// Resolve a path against a subset of the stack.
    ///
    /// `ids` are given in registration order and searched last to first.
    /// Entries with a degenerate size are skipped. Per-archive decode
    /// failures are logged and the search continues; only
    /// [`ArchiveError::ResourceExhausted`] aborts the search.
    pub fn resolve_in(
        &mut self,
        ids: &[ArchiveId],
        path: &str,
    ) -> Result<Option<(ArchiveId, Bytes)>> {
        for &id in ids.iter().rev() {
            let Some(archive) = self.archives.get_mut(id.0) else {
                return Err(ArchiveError::UnknownArchive(id.0));
            };

            match archive.read(path) {
                Ok(Some(bytes)) => {
                    debug!(
                        "Resolved {path} from {} ({} bytes)",
                        archive.path().display(),
                        bytes.len()
                    );
                    return Ok(Some((id, bytes)));
                }
                Ok(None) => {}
                Err(e @ ArchiveError::ResourceExhausted { .. }) => return Err(e),
                Err(e) => {
                    warn!(
                        "Skipping {path} in {}: {e}",
                        archive.path().display()
                    );
                }
            }
        }

        Ok(None)
    }

    /// Resolve a path in exactly one archive.
    pub fn resolve_from(&mut self, id: ArchiveId, path: &str) -> Result<Option<Bytes>> {
        Ok(self.resolve_in(&[id], path)?.map(|(_, bytes)| bytes))
    }

    /// Whether any of `ids` holds a non-degenerate entry for `path`.
    ///
    /// Does not extract.
    pub fn contains_in(&mut self, ids: &[ArchiveId], path: &str) -> bool {
        ids.iter().rev().any(|id| {
            self.archives.get_mut(id.0).is_some_and(|archive| {
                archive
                    .resolve(path)
                    .is_some_and(|index| !crate::is_degenerate_size(archive.unpacked_size(&index)))
            })
        })
    }
}

/// Archives of one locale, base pack first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleArchiveSet {
    locale: Locale,
    archives: Vec<ArchiveId>,
}

impl LocaleArchiveSet {
    /// Start a set with the locale's base pack.
    pub fn new(locale: Locale, base: ArchiveId) -> Self {
        Self {
            locale,
            archives: vec![base],
        }
    }

    /// Append a patch above the archives already in the set.
    pub fn push_patch(&mut self, id: ArchiveId) {
        self.archives.push(id);
    }

    /// Locale of this set
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// The locale's base pack
    pub fn base(&self) -> ArchiveId {
        self.archives[0]
    }

    /// Archive ids in registration order (base pack first)
    pub fn archives(&self) -> &[ArchiveId] {
        &self.archives
    }

    /// Number of archives, base pack included
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether the set holds no archives
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}
