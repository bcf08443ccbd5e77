//! Turns a search outcome into the display items sent back to the platform.

use {
    kinogram_catalog::{CatalogMovie, SearchOutcome},
    kinogram_i18n::{Locale, Translations},
};

/// Longest result list the platform accepts per answer.
const MAX_RESULTS: usize = 10;

/// Cache lifetime for answers carrying movies.
const MOVIE_CACHE_SECS: u32 = 600;

/// Short cache for synthetic answers, so transient states refresh quickly
/// instead of pinning an error card for ten minutes.
const FALLBACK_CACHE_SECS: u32 = 30;

/// Size id substituted into poster templates; 200px suits thumbnails.
const THUMBNAIL_SIZE_ID: &str = "200";

/// One display item ready for the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResult {
    pub id: String,
    pub title: String,
    pub description: String,
    pub body_text: String,
    pub thumbnail_url: Option<String>,
}

/// A complete answer: ordered items plus one cache lifetime for the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBatch {
    pub results: Vec<RenderedResult>,
    pub cache_seconds: u32,
}

/// Render a classified outcome into at least one and at most ten items.
///
/// Every branch yields something selectable: faults and empty matches come
/// back as a single synthetic card rather than an empty answer.
pub fn render_outcome(
    outcome: &SearchOutcome,
    query: &str,
    locale: Locale,
    translations: &Translations,
) -> RenderedBatch {
    match outcome {
        SearchOutcome::Error => RenderedBatch {
            results: vec![error_item(locale, translations)],
            cache_seconds: FALLBACK_CACHE_SECS,
        },
        SearchOutcome::NoResults => RenderedBatch {
            results: vec![no_results_item(query, locale, translations)],
            cache_seconds: FALLBACK_CACHE_SECS,
        },
        SearchOutcome::Found(movies) => {
            let results: Vec<RenderedResult> = movies
                .iter()
                .take(MAX_RESULTS)
                .map(|movie| movie_item(movie, locale, translations))
                .collect();
            if results.is_empty() {
                return RenderedBatch {
                    results: vec![no_results_item(query, locale, translations)],
                    cache_seconds: FALLBACK_CACHE_SECS,
                };
            }
            RenderedBatch {
                results,
                cache_seconds: MOVIE_CACHE_SECS,
            }
        },
    }
}

fn movie_item(movie: &CatalogMovie, locale: Locale, translations: &Translations) -> RenderedResult {
    let type_label = if movie.is_series {
        translations.get(locale, "movie.series").to_string()
    } else {
        movie.category.clone()
    };

    // A year range needs a series with both endpoints; otherwise fall back
    // to whichever single year the record carries.
    let series_range = match (movie.is_series, movie.series_year_start, movie.series_year_end) {
        (true, Some(start), Some(end)) => Some(format!("{start}—{end}")),
        _ => None,
    };
    let year_text = series_range.clone().or_else(|| {
        movie
            .release_year
            .or(movie.series_year_start)
            .map(|year| year.to_string())
    });

    let description = match &year_text {
        Some(year_text) => format!("{type_label} ({year_text})"),
        None => type_label.clone(),
    };

    let mut body = format!(
        "{}: {}\n{}: {}\n{}: {}",
        translations.get(locale, "movie.title"),
        movie.display_title,
        translations.get(locale, "movie.original"),
        movie.original_title,
        translations.get(locale, "movie.type"),
        type_label,
    );
    if let Some(year_text) = &year_text {
        let year_label = if series_range.is_some() {
            "movie.years"
        } else {
            "movie.year"
        };
        body.push_str(&format!(
            "\n{}: {}",
            translations.get(locale, year_label),
            year_text
        ));
    }
    body.push_str(&format!(
        "\n{}: {}",
        translations.get(locale, "movie.link"),
        movie.page_url()
    ));

    RenderedResult {
        id: format!("movie-{}", movie.id),
        title: movie.display_title.clone(),
        description,
        body_text: body,
        thumbnail_url: movie.poster_url(THUMBNAIL_SIZE_ID),
    }
}

fn no_results_item(query: &str, locale: Locale, translations: &Translations) -> RenderedResult {
    RenderedResult {
        id: "no-results".to_string(),
        title: translations
            .get(locale, "inline.no_results_title")
            .to_string(),
        description: translations.format(
            locale,
            "inline.no_results_description",
            &[("query", query)],
        ),
        body_text: translations.format(locale, "inline.no_results_message", &[("query", query)]),
        thumbnail_url: None,
    }
}

fn error_item(locale: Locale, translations: &Translations) -> RenderedResult {
    RenderedResult {
        id: "api-error".to_string(),
        title: translations.get(locale, "inline.api_error_title").to_string(),
        description: translations
            .get(locale, "inline.api_error_description")
            .to_string(),
        body_text: translations
            .get(locale, "inline.api_error_message")
            .to_string(),
        thumbnail_url: None,
    }
}
