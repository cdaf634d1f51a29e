//! Configuration for archive discovery

use crate::{ArchiveError, Locale, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base game archives of a Wrath of the Lich King client, lowest precedence first.
pub const DEFAULT_BASE_ARCHIVES: [&str; 7] = [
    "common.MPQ",
    "common-2.MPQ",
    "expansion.MPQ",
    "lichking.MPQ",
    "patch.MPQ",
    "patch-2.MPQ",
    "patch-3.MPQ",
];

/// Locale patch suffixes, lowest precedence first.
pub const DEFAULT_LOCALE_PATCH_SUFFIXES: [&str; 3] = ["", "-2", "-3"];

/// Configuration for archive discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Client data directory (the `Data/` folder of an installation)
    pub data_dir: PathBuf,

    /// Base archive file names below `data_dir`, lowest precedence first
    pub base_archives: Vec<String>,

    /// Locales to probe, in default-locale priority order
    pub locales: Vec<Locale>,

    /// Locale patch suffixes, lowest precedence first
    pub locale_patch_suffixes: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(crate::DEFAULT_DATA_DIR),
            base_archives: DEFAULT_BASE_ARCHIVES.iter().map(ToString::to_string).collect(),
            locales: Locale::ALL.to_vec(),
            locale_patch_suffixes: DEFAULT_LOCALE_PATCH_SUFFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ArchiveConfig {
    /// Create a new configuration with the specified data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| ArchiveError::Config(format!("{}: {e}", path.display())))
    }

    /// Set the data directory
    #[must_use]
    pub fn with_data_dir<P: AsRef<Path>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    /// Replace the base archive list
    #[must_use]
    pub fn with_base_archives<I, S>(mut self, archives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_archives = archives.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the probed locales
    #[must_use]
    pub fn with_locales<I: IntoIterator<Item = Locale>>(mut self, locales: I) -> Self {
        self.locales = locales.into_iter().collect();
        self
    }

    /// Replace the locale patch suffixes
    #[must_use]
    pub fn with_locale_patch_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locale_patch_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Full paths of the base archives in declared order
    pub fn base_archive_paths(&self) -> Vec<PathBuf> {
        self.base_archives
            .iter()
            .map(|name| self.data_dir.join(name))
            .collect()
    }

    /// Check that the configuration can be used for initialization.
    pub fn validate(&self) -> Result<()> {
        if self.locales.is_empty() {
            return Err(ArchiveError::Config("no locales configured".to_string()));
        }

        for (i, locale) in self.locales.iter().enumerate() {
            if self.locales[..i].contains(locale) {
                return Err(ArchiveError::Config(format!(
                    "locale {locale} listed more than once"
                )));
            }
        }

        if let Some(name) = self
            .base_archives
            .iter()
            .find(|name| name.is_empty() || Path::new(name.as_str()).is_absolute())
        {
            return Err(ArchiveError::Config(format!(
                "base archive name must be relative to the data directory: {name:?}"
            )));
        }

        Ok(())
    }
}
