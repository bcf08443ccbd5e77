//! Domain types produced by the search client.

/// Placeholder token in poster template URLs, swapped for a size id.
const POSTER_SIZE_PLACEHOLDER: &str = "{$image_size_id}";

/// Base URL for canonical movie pages (not the search API host).
const MOVIE_PAGE_BASE: &str = "https://kinorium.com";

/// One movie from the catalog, normalized for display.
///
/// Built fresh from each search response and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMovie {
    pub id: i64,
    /// Preferred title for display: the original-language title when the
    /// catalog has one, the local title otherwise.
    pub display_title: String,
    /// The catalog's local title, shown on its own line in result bodies.
    pub original_title: String,
    /// Free-form category label from the catalog ("Film", "Cartoon", ...).
    pub category: String,
    pub release_year: Option<i32>,
    pub series_year_start: Option<i32>,
    pub series_year_end: Option<i32>,
    pub is_series: bool,
    /// Poster URL template containing [`POSTER_SIZE_PLACEHOLDER`].
    pub poster_template_url: Option<String>,
}

impl CatalogMovie {
    /// Canonical movie page URL, derived from the catalog id.
    pub fn page_url(&self) -> String {
        format!("{MOVIE_PAGE_BASE}/{}/", self.id)
    }

    /// Poster URL with the size placeholder resolved, when a poster exists.
    pub fn poster_url(&self, size_id: &str) -> Option<String> {
        self.poster_template_url
            .as_ref()
            .map(|template| template.replace(POSTER_SIZE_PLACEHOLDER, size_id))
    }
}

/// Classified result of one search call.
///
/// The only channel through which search results reach rendering; nothing
/// downstream ever sees the raw upstream payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The API answered normally. The list may be empty, which is distinct
    /// from [`SearchOutcome::NoResults`]: here the API succeeded and simply
    /// returned nothing.
    Found(Vec<CatalogMovie>),
    /// The API reported that nothing matched the query.
    NoResults,
    /// The API was unreachable, timed out, or reported an unrecognized fault.
    Error,
}
