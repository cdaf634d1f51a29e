//! Archive manager: initialization and path resolution.
//!
//! Initialization opens the configured base archives in declared order and
//! then probes every configured locale for its base pack and patches. The
//! resulting stack is immutable. An [`ArchiveManager`] only exists once
//! initialization succeeded, so no lookup can run against a partial stack.
//!
//! All lookups against the stack run under one lock for the whole
//! search-and-extract sequence. The MPQ decoder shares state between
//! handles and is not used concurrently.

use crate::archive::{ArchiveHandle, ArchiveOpener, MpqOpener};
use crate::stack::{ArchiveId, ArchiveStack, LocaleArchiveSet};
use crate::{ArchiveConfig, ArchiveError, Locale, RECORD_TABLE_DIR, RecordTable, Result};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Description of one registered archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    /// Position in registration order
    pub id: ArchiveId,
    /// Archive file path
    pub path: PathBuf,
    /// Owning locale, `None` for base game archives
    pub locale: Option<Locale>,
}

/// Resolves logical paths across the opened archive stack
#[derive(Debug)]
pub struct ArchiveManager {
    config: ArchiveConfig,
    stack: Mutex<ArchiveStack>,
    archives: Vec<ArchiveInfo>,
    locale_sets: BTreeMap<Locale, LocaleArchiveSet>,
    available_locales: Vec<Locale>,
    default_locale: Locale,
}

impl ArchiveManager {
    /// Open all archives described by `config` as MPQ files.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::ArchiveNotFound`] if a base archive is missing
    /// - [`ArchiveError::CorruptArchive`] if an archive fails validation
    /// - [`ArchiveError::NoLocaleAvailable`] if no locale pack is installed
    pub fn initialize(config: ArchiveConfig) -> Result<Self> {
        Self::initialize_with(config, &MpqOpener)
    }

    /// Open all archives described by `config` with a custom opener.
    pub fn initialize_with(config: ArchiveConfig, opener: &dyn ArchiveOpener) -> Result<Self> {
        config.validate()?;
        info!("Opening client archives in {}", config.data_dir.display());

        let mut stack = ArchiveStack::new();

        for path in config.base_archive_paths() {
            let archive = ArchiveHandle::open(&path, opener)?;
            stack.push(archive);
            info!("Opened {}", path.display());
        }

        let locale_sets = Self::probe_locales(&config, opener, &mut stack)?;

        // First available locale in configured order wins.
        let available_locales: Vec<Locale> = config
            .locales
            .iter()
            .copied()
            .filter(|locale| locale_sets.contains_key(locale))
            .collect();

        let Some(&default_locale) = available_locales.first() else {
            return Err(ArchiveError::NoLocaleAvailable {
                data_dir: config.data_dir.clone(),
            });
        };
        info!("Using default locale: {default_locale}");

        let archives = stack
            .iter()
            .map(|(id, archive)| ArchiveInfo {
                id,
                path: archive.path().to_path_buf(),
                locale: archive.locale(),
            })
            .collect();

        Ok(Self {
            config,
            stack: Mutex::new(stack),
            archives,
            locale_sets,
            available_locales,
            default_locale,
        })
    }

    /// Register every installed locale pack and its patches.
    ///
    /// A locale without its base pack is skipped entirely; its patches are
    /// never opened.
    fn probe_locales(
        config: &ArchiveConfig,
        opener: &dyn ArchiveOpener,
        stack: &mut ArchiveStack,
    ) -> Result<BTreeMap<Locale, LocaleArchiveSet>> {
        let data_dir = config.data_dir.as_path();
        let mut sets = BTreeMap::new();

        for &locale in &config.locales {
            let base_path = locale.base_pack(data_dir);
            if !base_path.is_file() {
                debug!("Locale {locale} not installed");
                continue;
            }

            let base = stack.push(ArchiveHandle::open(&base_path, opener)?.with_locale(locale));
            info!("Opened {}", base_path.display());
            let mut set = LocaleArchiveSet::new(locale, base);

            for suffix in &config.locale_patch_suffixes {
                let patch_path = locale.patch_pack(data_dir, suffix);
                if !patch_path.is_file() {
                    continue;
                }

                let id = stack.push(ArchiveHandle::open(&patch_path, opener)?.with_locale(locale));
                set.push_patch(id);
                info!("Opened {}", patch_path.display());
            }

            info!("Detected locale: {locale} ({} archives)", set.len());
            sets.insert(locale, set);
        }

        Ok(sets)
    }

    /// Resolve a logical path to the content of its highest-precedence
    /// archive.
    ///
    /// Archives are searched in reverse registration order. Entries with a
    /// degenerate size are skipped. Returns `Ok(None)` if no archive holds
    /// the path.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::ResourceExhausted`] if the destination buffer
    /// cannot be allocated.
    pub fn resolve(&self, path: &str) -> Result<Option<Bytes>> {
        Ok(self.resolve_with_source(path)?.map(|(_, bytes)| bytes))
    }

    /// Like [`resolve`](Self::resolve), also reporting the winning archive.
    pub fn resolve_with_source(&self, path: &str) -> Result<Option<(&ArchiveInfo, Bytes)>> {
        let hit = self.stack.lock().resolve(path)?;
        Ok(hit.map(|(id, bytes)| (&self.archives[id.index()], bytes)))
    }

    /// Resolve a logical path within one locale's archives only.
    ///
    /// The locale's latest patch is searched first and its base pack last.
    /// Base game archives and other locales are never consulted. An
    /// unavailable locale always yields `Ok(None)`.
    pub fn resolve_for_locale(&self, path: &str, locale: Locale) -> Result<Option<Bytes>> {
        let Some(set) = self.locale_sets.get(&locale) else {
            debug!("Locale {locale} not available, {path} is absent");
            return Ok(None);
        };

        let hit = self.stack.lock().resolve_in(set.archives(), path)?;
        Ok(hit.map(|(_, bytes)| bytes))
    }

    /// Resolve a logical path within the default locale's archives.
    pub fn resolve_default_locale(&self, path: &str) -> Result<Option<Bytes>> {
        self.resolve_for_locale(path, self.default_locale)
    }

    /// Resolve a logical path in exactly one archive.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnknownArchive`] if `id` was never registered.
    pub fn resolve_from(&self, path: &str, id: ArchiveId) -> Result<Option<Bytes>> {
        self.stack.lock().resolve_from(id, path)
    }

    /// Load a client database table by bare name, e.g. `"Map"`.
    ///
    /// Resolves `DBFilesClient\<name>.dbc` across the whole stack.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::PathNotFound`] if no archive holds the table,
    /// or [`ArchiveError::InvalidRecordTable`] if it fails to parse.
    pub fn resolve_record_table(&self, name: &str) -> Result<RecordTable> {
        let path = record_table_path(name);
        let bytes = self
            .resolve(&path)?
            .ok_or(ArchiveError::PathNotFound(path))?;
        RecordTable::parse(bytes)
    }

    /// Whether any archive holds a usable entry for `path`, without
    /// extracting it.
    pub fn contains(&self, path: &str) -> bool {
        let ids: Vec<ArchiveId> = self.archives.iter().map(|info| info.id).collect();
        self.stack.lock().contains_in(&ids, path)
    }

    /// Installed locales in configured order
    pub fn available_locales(&self) -> &[Locale] {
        &self.available_locales
    }

    /// Whether a locale pack was found during initialization
    pub fn is_locale_available(&self, locale: Locale) -> bool {
        self.locale_sets.contains_key(&locale)
    }

    /// First installed locale in configured order
    pub const fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// Archive set of an installed locale
    pub fn locale_archives(&self, locale: Locale) -> Option<&LocaleArchiveSet> {
        self.locale_sets.get(&locale)
    }

    /// All archives in registration order (lowest precedence first)
    pub fn archives(&self) -> &[ArchiveInfo] {
        &self.archives
    }

    /// Description of one archive
    pub fn archive(&self, id: ArchiveId) -> Option<&ArchiveInfo> {
        self.archives.get(id.index())
    }

    /// Configuration used at initialization
    pub const fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Client data directory
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }
}

/// Archive path of a client database table.
pub fn record_table_path(name: &str) -> String {
    format!("{RECORD_TABLE_DIR}\\{name}.dbc")
}
