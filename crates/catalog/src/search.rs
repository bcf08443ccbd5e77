//! HTTP search client with response classification.

use std::time::Duration;

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::{debug, warn},
};

use kinogram_config::CatalogConfig;

use crate::movie::{CatalogMovie, SearchOutcome};

/// Error code the API uses for empty result sets.
const NO_RESULTS_CODE: i64 = 404;

/// Client for the catalog search endpoint.
///
/// [`CatalogClient::search`] is infallible: transport faults, bad statuses
/// and unparseable bodies all classify as [`SearchOutcome::Error`].
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    timeout: Duration,
    no_results_phrases: Vec<String>,
}

/// Search response envelope (subset).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    movie_list: Vec<serde_json::Value>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// One row of the movie list, tolerant of partially filled records.
#[derive(Debug, Deserialize)]
struct WireMovie {
    id: i64,
    #[serde(default)]
    mixtype: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    name_orig: String,
    #[serde(default, deserialize_with = "year_field")]
    year: Option<i32>,
    #[serde(default, deserialize_with = "year_field")]
    year_serial_b: Option<i32>,
    #[serde(default, deserialize_with = "year_field")]
    year_serial_e: Option<i32>,
    #[serde(default, rename = "isSerial")]
    is_serial: Option<bool>,
    #[serde(default)]
    poster: Option<String>,
}

impl WireMovie {
    fn into_movie(self) -> CatalogMovie {
        let Self {
            id,
            mixtype,
            name,
            name_orig,
            year,
            year_serial_b,
            year_serial_e,
            is_serial,
            poster,
        } = self;
        let display_title = if name_orig.is_empty() {
            name.clone()
        } else {
            name_orig
        };
        CatalogMovie {
            id,
            display_title,
            original_title: name,
            category: mixtype,
            release_year: year,
            series_year_start: year_serial_b,
            series_year_end: year_serial_e,
            is_series: is_serial.unwrap_or(false),
            poster_template_url: poster,
        }
    }
}

/// Year fields arrive as numbers, numeric strings, or garbage depending on
/// the record. Anything that isn't a year becomes `None` instead of failing
/// the whole row.
fn year_field<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Strip one trailing `&q` left over from pasting the key out of a sample
/// URL, then trim surrounding whitespace.
fn normalize_api_key(raw: &str) -> String {
    raw.strip_suffix("&q").unwrap_or(raw).trim().to_string()
}

/// Whether an upstream error object actually means "nothing matched".
///
/// The API reports genuine faults and empty result sets through the same
/// error channel, so the distinction rests on the error code plus a phrase
/// list. Unrecognized messages stay errors.
fn is_no_results(error: &WireError, phrases: &[String]) -> bool {
    if error.code == NO_RESULTS_CODE {
        return true;
    }
    let message = error.message.to_lowercase();
    phrases.iter().any(|phrase| message.contains(phrase.as_str()))
}

impl CatalogClient {
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: Secret::new(normalize_api_key(config.api_key.expose_secret())),
            timeout: Duration::from_secs(config.timeout_secs),
            no_results_phrases: config.no_results_phrases.clone(),
        }
    }

    /// Run one search against the catalog.
    ///
    /// A blank query short-circuits to [`SearchOutcome::NoResults`] without
    /// touching the network.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        if query.trim().is_empty() {
            return SearchOutcome::NoResults;
        }
        match self.fetch(query).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(%error, "catalog search failed");
                SearchOutcome::Error
            },
        }
    }

    async fn fetch(&self, query: &str) -> Result<SearchOutcome, reqwest::Error> {
        debug!(%query, "searching catalog");
        let url = format!("{}/search/", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("apikey", self.api_key.expose_secret().as_str()),
                ("q", query),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let body: SearchResponse = response.json().await?;

        if let Some(error) = body.error {
            if is_no_results(&error, &self.no_results_phrases) {
                debug!(code = error.code, "catalog reported no results");
                return Ok(SearchOutcome::NoResults);
            }
            warn!(
                code = error.code,
                message = %error.message,
                "catalog reported an error"
            );
            return Ok(SearchOutcome::Error);
        }

        let movies = body
            .movie_list
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<WireMovie>(row) {
                Ok(movie) => Some(movie.into_movie()),
                Err(error) => {
                    warn!(%error, "skipping malformed catalog row");
                    None
                },
            })
            .collect();
        Ok(SearchOutcome::Found(movies))
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn test_client(base_url: &str) -> CatalogClient {
        let config = CatalogConfig {
            base_url: base_url.to_string(),
            api_key: Secret::new("test-key".to_string()),
            timeout_secs: 2,
            ..CatalogConfig::default()
        };
        CatalogClient::from_config(&config)
    }

    #[tokio::test]
    async fn found_movies_are_converted_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("apikey".into(), "test-key".into()),
                mockito::Matcher::UrlEncoded("q".into(), "matrix".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "movie_list": [
                        {
                            "id": 111,
                            "mixtype": "Film",
                            "name": "Матрица",
                            "name_orig": "The Matrix",
                            "year": 1999,
                            "poster": "https://st.kinorium.com/{$image_size_id}/111.jpg"
                        },
                        {
                            "id": 222,
                            "mixtype": "Film",
                            "name": "Матрица: Перезагрузка",
                            "name_orig": "The Matrix Reloaded",
                            "year": 2003
                        }
                    ]
                }"#,
            )
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("matrix").await;
        let SearchOutcome::Found(movies) = outcome else {
            panic!("expected Found, got {outcome:?}");
        };
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].display_title, "The Matrix");
        assert_eq!(movies[0].original_title, "Матрица");
        assert_eq!(movies[0].release_year, Some(1999));
        assert!(!movies[0].is_series);
        assert_eq!(
            movies[0].poster_url("200").as_deref(),
            Some("https://st.kinorium.com/200/111.jpg")
        );
        assert_eq!(movies[1].id, 222);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_code_404_classifies_as_no_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"movie_list": [], "error": {"code": 404, "message": "Not found"}}"#)
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("zzz").await;
        assert_eq!(outcome, SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn no_results_phrase_matches_regardless_of_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": {"code": 500, "message": "Nothing Found for query"}}"#)
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("zzz").await;
        assert_eq!(outcome, SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn cyrillic_no_results_phrase_is_recognized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"error": {"code": 1, "message": "По вашему запросу ничего не найдено"}}"#,
            )
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("привет").await;
        assert_eq!(outcome, SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn unrecognized_error_classifies_as_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": {"code": 500, "message": "internal failure"}}"#)
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("matrix").await;
        assert_eq!(outcome, SearchOutcome::Error);
    }

    #[tokio::test]
    async fn http_failure_classifies_as_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("matrix").await;
        assert_eq!(outcome, SearchOutcome::Error);
    }

    #[tokio::test]
    async fn unparseable_body_classifies_as_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway timeout</html>")
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("matrix").await;
        assert_eq!(outcome, SearchOutcome::Error);
    }

    #[tokio::test]
    async fn blank_query_skips_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("   ").await;
        assert_eq!(outcome, SearchOutcome::NoResults);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_movie_list_is_an_empty_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("matrix").await;
        assert_eq!(outcome, SearchOutcome::Found(vec![]));
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"movie_list": [
                    {"id": "not-a-number", "name": "broken"},
                    {"id": 7, "mixtype": "Film", "name": "Дюна", "name_orig": "Dune"}
                ]}"#,
            )
            .create_async()
            .await;

        let outcome = test_client(&server.url()).search("dune").await;
        let SearchOutcome::Found(movies) = outcome else {
            panic!("expected Found, got {outcome:?}");
        };
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, 7);
    }

    #[test]
    fn display_title_falls_back_to_local_name() {
        let wire: WireMovie = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Брат",
            "name_orig": ""
        }))
        .unwrap();
        let movie = wire.into_movie();
        assert_eq!(movie.display_title, "Брат");
        assert_eq!(movie.original_title, "Брат");
    }

    #[test]
    fn year_fields_tolerate_strings_and_nulls() {
        let wire: WireMovie = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "x",
            "year": "1999",
            "year_serial_b": null,
            "year_serial_e": {"weird": true}
        }))
        .unwrap();
        assert_eq!(wire.year, Some(1999));
        assert_eq!(wire.year_serial_b, None);
        assert_eq!(wire.year_serial_e, None);
    }

    #[rstest]
    #[case("abc", "abc")]
    #[case("abc&q", "abc")]
    #[case("abc&q&q", "abc&q")]
    #[case("  abc  ", "abc")]
    #[case(" abc&q ", "abc&q")]
    #[case("", "")]
    fn api_key_normalization(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_api_key(raw), expected);
    }
}
