//! Kinorium catalog search client.
//!
//! Talks to the public search endpoint and classifies every response into a
//! [`SearchOutcome`]. Transport faults never escape as errors; callers only
//! ever see one of the three outcome shapes.

pub mod movie;
pub mod search;

pub use {
    movie::{CatalogMovie, SearchOutcome},
    search::CatalogClient,
};
