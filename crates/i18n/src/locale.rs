use std::fmt;

use serde::{Deserialize, Serialize};

/// A display language supported by the bot.
///
/// Stored in user profiles as the lowercase two-letter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
    Uk,
}

impl Locale {
    /// Every supported locale, in menu order.
    pub const ALL: [Self; 3] = [Self::En, Self::Ru, Self::Uk];

    /// The two-letter code used in storage and callback data.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
            Self::Uk => "uk",
        }
    }

    /// The language name shown on menu buttons.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ru => "Русский",
            Self::Uk => "Українська",
        }
    }

    /// Parse an exact two-letter code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|locale| locale.code() == code)
    }

    /// Resolve a platform language hint (e.g. Telegram's `language_code`)
    /// to a supported locale.
    ///
    /// The hint is trimmed, lowercased, and cut at the first region
    /// separator (`ru-RU` resolves as `ru`); an unsupported or absent
    /// primary subtag falls back to the default locale.
    #[must_use]
    pub fn resolve(hint: Option<&str>) -> Self {
        let Some(hint) = hint else {
            return Self::default();
        };
        let normalized = hint.trim().to_lowercase();
        let primary = normalized.split(['-', '_']).next().unwrap_or_default();
        Self::from_code(primary).unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
