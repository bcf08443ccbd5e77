use std::collections::HashMap;

use {thiserror::Error, tracing::debug};

use crate::locale::Locale;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {locale} translation catalog")]
    Parse {
        locale: Locale,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

const CATALOGS: [(Locale, &str); 3] = [
    (Locale::En, include_str!("../locales/en.toml")),
    (Locale::Ru, include_str!("../locales/ru.toml")),
    (Locale::Uk, include_str!("../locales/uk.toml")),
];

/// Per-locale message catalogs with `{param}` substitution.
///
/// Keys are dotted paths into the catalog tables (`inline.no_results_title`).
/// A key missing from a locale falls back to the default locale, then to the
/// key itself, so lookups always produce something displayable.
pub struct Translations {
    catalogs: HashMap<Locale, HashMap<String, String>>,
}

impl Translations {
    /// Parse every embedded catalog.
    pub fn load() -> Result<Self> {
        let mut catalogs = HashMap::new();
        for (locale, raw) in CATALOGS {
            let table: toml::Table =
                toml::from_str(raw).map_err(|source| Error::Parse { locale, source })?;
            let mut messages = HashMap::new();
            flatten_into(&mut messages, String::new(), &table);
            catalogs.insert(locale, messages);
        }
        Ok(Self { catalogs })
    }

    /// Look up `key` for `locale`.
    #[must_use]
    pub fn get<'a>(&'a self, locale: Locale, key: &'a str) -> &'a str {
        if let Some(message) = self.message(locale, key) {
            return message;
        }
        if let Some(message) = self.message(Locale::default(), key) {
            debug!(%locale, key, "translation missing, using default locale");
            return message;
        }
        debug!(%locale, key, "unknown translation key");
        key
    }

    /// Look up `key` for `locale`, substituting `{name}` placeholders from
    /// `params`.
    #[must_use]
    pub fn format(&self, locale: Locale, key: &str, params: &[(&str, &str)]) -> String {
        let mut message = self.get(locale, key).to_string();
        for (name, value) in params {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        message
    }

    fn message(&self, locale: Locale, key: &str) -> Option<&str> {
        self.catalogs.get(&locale)?.get(key).map(String::as_str)
    }
}

fn flatten_into(out: &mut HashMap<String, String>, prefix: String, table: &toml::Table) {
    for (name, value) in table {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::String(message) => {
                out.insert(path, message.clone());
            },
            toml::Value::Table(nested) => flatten_into(out, path, nested),
            // Only strings are messages; anything else in a catalog is a
            // mistake and is skipped rather than stringified.
            _ => {},
        }
    }
}
