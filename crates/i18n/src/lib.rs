//! Display locales and translated message catalogs.
//!
//! Catalogs live in `locales/*.toml` and are embedded at compile time;
//! lookups never touch the filesystem.

pub mod locale;
pub mod translations;

pub use {
    locale::Locale,
    translations::{Error, Result, Translations},
};
