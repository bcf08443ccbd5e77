//! Configuration loading and env substitution.
//!
//! Config file: `kinogram.toml`, searched in `./` then `~/.config/kinogram/`.
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{Error, Result, config_dir, discover_and_load, load_config},
    schema::{CatalogConfig, DatabaseConfig, KinogramConfig, TelegramConfig},
};
