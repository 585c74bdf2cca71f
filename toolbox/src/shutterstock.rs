//! Shutterstock image search adapter.
//!
//! Turns a tool invocation into one `GET /v2/images/search` call with a fixed
//! page shape (page 1, five results, most popular first) and normalizes the
//! response into a [`SearchOutcome`].

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::{SHUTTERSTOCK_TOKEN_VAR, ShutterstockConfig};
use crate::error::{Error, Result};

/// Image type used when the caller does not pick one.
pub const DEFAULT_IMAGE_TYPE: &str = "photo";

/// Orientation used when the caller does not pick one.
pub const DEFAULT_ORIENTATION: &str = "vertical";

/// Results per page.
pub const PAGE_SIZE: &str = "5";

/// Page requested.
pub const PAGE: &str = "1";

/// Sort order requested.
pub const SORT: &str = "popular";

/// Path of the image search endpoint.
const SEARCH_PATH: &str = "/v2/images/search";

/// A single image search.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SearchQuery {
    /// Search term.
    pub term: String,
    /// `photo`, `illustration` or `vector`.
    pub image_type: Option<String>,
    /// `horizontal` or `vertical`.
    pub orientation: Option<String>,
}

impl SearchQuery {
    /// Query for `term` with default image type and orientation.
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            image_type: None,
            orientation: None,
        }
    }

    /// Set the image type.
    #[must_use]
    pub fn image_type(mut self, image_type: Option<String>) -> Self {
        self.image_type = image_type;
        self
    }

    /// Set the orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Option<String>) -> Self {
        self.orientation = orientation;
        self
    }

    /// Query string sent to the provider, defaults resolved.
    #[must_use]
    pub fn params(&self) -> [(&'static str, &str); 6] {
        [
            ("query", self.term.as_str()),
            (
                "image_type",
                self.image_type.as_deref().unwrap_or(DEFAULT_IMAGE_TYPE),
            ),
            (
                "orientation",
                self.orientation.as_deref().unwrap_or(DEFAULT_ORIENTATION),
            ),
            ("page", PAGE),
            ("per_page", PAGE_SIZE),
            ("sort", SORT),
        ]
    }
}

/// Normalized search result.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SearchOutcome {
    /// Image metadata records, passed through as returned.
    Images(Vec<Value>),
    /// The provider found nothing.
    NoResults,
}

impl SearchOutcome {
    /// Text rendering used as tool output.
    ///
    /// Records are serialized exactly once, as pretty-printed JSON.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Self::Images(records) => Ok(serde_json::to_string_pretty(records)?),
            Self::NoResults => Ok("No results found".to_string()),
        }
    }
}

/// Search response body. Only `data` is relied upon.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Result records. Absent and `null` both mean none.
    #[serde(default, deserialize_with = "null_as_empty")]
    data: Vec<Value>,
    /// Total matches across all pages.
    #[serde(default)]
    total_count: Option<u64>,
}

/// Deserialize a possibly-null array as empty.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error body shape used by the provider.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    /// Human readable message.
    message: String,
}

/// Client for the Shutterstock v2 API.
#[derive(Debug, Clone)]
pub struct ShutterstockClient {
    /// Underlying HTTP client with auth headers preset.
    http: reqwest::Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl ShutterstockClient {
    /// Build a client. Fails when the access token is missing or not
    /// usable as a header value.
    pub fn new(config: &ShutterstockConfig) -> Result<Self> {
        let token = config.require_token()?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::InvalidSecret(SHUTTERSTOCK_TOKEN_VAR))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!("toolbox/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run one image search.
    pub async fn search_images(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);
        tracing::debug!(term = %query.term, "searching shutterstock images");

        let response = self.http.get(&url).query(&query.params()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(Error::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            returned = parsed.data.len(),
            total = parsed.total_count,
            "shutterstock search complete"
        );

        if parsed.data.is_empty() {
            Ok(SearchOutcome::NoResults)
        } else {
            Ok(SearchOutcome::Images(parsed.data))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> ShutterstockClient {
        ShutterstockClient::new(&ShutterstockConfig::new(Some("tok".into()), base_url)).unwrap()
    }

    #[test]
    fn test_params_resolve_defaults() {
        let query = SearchQuery::new("cats");
        let params = query.params();
        assert_eq!(
            params,
            [
                ("query", "cats"),
                ("image_type", "photo"),
                ("orientation", "vertical"),
                ("page", "1"),
                ("per_page", "5"),
                ("sort", "popular"),
            ]
        );
    }

    #[test]
    fn test_params_keep_overrides() {
        let query = SearchQuery::new("sea")
            .image_type(Some("vector".into()))
            .orientation(Some("horizontal".into()));
        let params = query.params();
        assert_eq!(params[1], ("image_type", "vector"));
        assert_eq!(params[2], ("orientation", "horizontal"));
    }

    #[test]
    fn test_new_requires_token() {
        let err = ShutterstockClient::new(&ShutterstockConfig::default()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_new_rejects_token_unusable_as_header() {
        let config = ShutterstockConfig::new(Some("bad\ntoken".into()), "http://localhost");
        let err = ShutterstockClient::new(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidSecret(SHUTTERSTOCK_TOKEN_VAR)));
        assert!(err.is_config());
        assert!(!err.to_string().contains("is not set"));
    }

    #[test]
    fn test_no_results_text() {
        assert_eq!(SearchOutcome::NoResults.to_text().unwrap(), "No results found");
    }

    #[tokio::test]
    async fn test_search_sends_fixed_query_and_returns_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images/search"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("query", "cats"))
            .and(query_param("image_type", "photo"))
            .and(query_param("orientation", "vertical"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "5"))
            .and(query_param("sort", "popular"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "per_page": 5,
                "total_count": 2,
                "data": [
                    {"id": "1", "description": "tabby cat"},
                    {"id": "2", "description": "black cat"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client(&server.uri())
            .search_images(&SearchQuery::new("cats"))
            .await
            .unwrap();

        let SearchOutcome::Images(records) = &outcome else {
            panic!("expected images, got {outcome:?}");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["description"], "tabby cat");

        let text = outcome.to_text().unwrap();
        let decoded: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, *records);
    }

    #[tokio::test]
    async fn test_search_empty_data_is_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let outcome = client(&server.uri())
            .search_images(&SearchQuery::new("nothing"))
            .await
            .unwrap();
        assert_eq!(outcome, SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn test_search_null_data_is_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": null, "total_count": 0})),
            )
            .mount(&server)
            .await;

        let outcome = client(&server.uri())
            .search_images(&SearchQuery::new("nothing"))
            .await
            .unwrap();
        assert_eq!(outcome, SearchOutcome::NoResults);
        assert_eq!(outcome.to_text().unwrap(), "No results found");
    }

    #[tokio::test]
    async fn test_search_provider_error_uses_message_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images/search"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})),
            )
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .search_images(&SearchQuery::new("cats"))
            .await
            .unwrap_err();
        match err {
            Error::Provider { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .search_images(&SearchQuery::new("cats"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
