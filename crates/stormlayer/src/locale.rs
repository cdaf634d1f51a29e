//! Supported client locales and their on-disk archive names.

use crate::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Client locale code.
///
/// Declaration order is significant: during initialization the first
/// available locale in this order becomes the default locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// English (Great Britain)
    #[serde(rename = "enGB")]
    EnGb,
    /// English (United States)
    #[serde(rename = "enUS")]
    EnUs,
    /// German
    #[serde(rename = "deDE")]
    DeDe,
    /// Spanish (Spain)
    #[serde(rename = "esES")]
    EsEs,
    /// French
    #[serde(rename = "frFR")]
    FrFr,
    /// Korean
    #[serde(rename = "koKR")]
    KoKr,
    /// Chinese (simplified)
    #[serde(rename = "zhCN")]
    ZhCn,
    /// Chinese (traditional)
    #[serde(rename = "zhTW")]
    ZhTw,
    /// English (China)
    #[serde(rename = "enCN")]
    EnCn,
    /// English (Taiwan)
    #[serde(rename = "enTW")]
    EnTw,
    /// Spanish (Mexico)
    #[serde(rename = "esMX")]
    EsMx,
    /// Russian
    #[serde(rename = "ruRU")]
    RuRu,
}

impl Locale {
    /// All supported locales in declaration order.
    pub const ALL: [Self; 12] = [
        Self::EnGb,
        Self::EnUs,
        Self::DeDe,
        Self::EsEs,
        Self::FrFr,
        Self::KoKr,
        Self::ZhCn,
        Self::ZhTw,
        Self::EnCn,
        Self::EnTw,
        Self::EsMx,
        Self::RuRu,
    ];

    /// Four-letter locale code as used in directory and archive names.
    pub const fn code(self) -> &'static str {
        match self {
            Self::EnGb => "enGB",
            Self::EnUs => "enUS",
            Self::DeDe => "deDE",
            Self::EsEs => "esES",
            Self::FrFr => "frFR",
            Self::KoKr => "koKR",
            Self::ZhCn => "zhCN",
            Self::ZhTw => "zhTW",
            Self::EnCn => "enCN",
            Self::EnTw => "enTW",
            Self::EsMx => "esMX",
            Self::RuRu => "ruRU",
        }
    }

    /// Locale directory below the data directory: `<data>/<code>`.
    pub fn directory(self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.code())
    }

    /// Base pack path: `<data>/<code>/locale-<code>.MPQ`.
    pub fn base_pack(self, data_dir: &Path) -> PathBuf {
        self.directory(data_dir)
            .join(format!("locale-{}.MPQ", self.code()))
    }

    /// Patch path for one patch suffix: `<data>/<code>/patch-<code><suffix>.MPQ`.
    ///
    /// The suffixes `""`, `"-2"` and `"-3"` give the stock patch names.
    pub fn patch_pack(self, data_dir: &Path, suffix: &str) -> PathBuf {
        self.directory(data_dir)
            .join(format!("patch-{}{suffix}.MPQ", self.code()))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| ArchiveError::UnknownLocale(s.to_string()))
    }
}
