//! Telegram front end: polling loop, update handlers, result rendering.
//!
//! Inbound updates are serialized per conversation before they touch the
//! profile store or the catalog, so replies for one chat can never arrive
//! out of order.

pub mod bot;
pub mod error;
pub mod handlers;
pub mod render;
pub mod state;

pub use {
    bot::start_polling,
    error::{Error, Result},
    state::BotState,
};
