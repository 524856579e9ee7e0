use std::time::Duration;

use feed_logging::{feed_debug, feed_warn};
use futures_util::StreamExt;
use moviefeed_core::{CatalogItem, FilterSpec};
use url::Url;

use crate::decode::decode_movie_page;
use crate::{FailureKind, TransportError};

const DISCOVER_PATH: &str = "discover/movie";
const SEARCH_PATH: &str = "search/movie";

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub base_url: String,
    /// v3 key, sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    /// v4 read token, sent as `Authorization: Bearer`.
    pub bearer_token: Option<String>,
    pub language: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: None,
            bearer_token: None,
            language: Some("en-US".to_string()),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Remote paginated movie catalog.
///
/// Implementations are stateless and shared between controllers.
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of a filtered feed. `filters.page()` selects the page.
    async fn fetch_page(&self, filters: &FilterSpec) -> Result<Vec<CatalogItem>, TransportError>;

    async fn search_by_text(&self, query: &str) -> Result<Vec<CatalogItem>, TransportError>;
}

/// [`CatalogClient`] backed by the TMDB v3 REST API.
#[derive(Debug, Clone)]
pub struct TmdbCatalogClient {
    settings: CatalogSettings,
    client: reqwest::Client,
}

impl TmdbCatalogClient {
    pub fn new(settings: CatalogSettings) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str, params: &[(String, String)]) -> Result<Url, TransportError> {
        let base = self.settings.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))
            .map_err(|err| TransportError::new(FailureKind::InvalidRequest, err.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.extend_pairs(params);
            if let Some(language) = &self.settings.language {
                query.append_pair("language", language);
            }
            if let Some(key) = &self.settings.api_key {
                query.append_pair("api_key", key);
            }
        }
        Ok(url)
    }

    async fn get_page(&self, url: Url) -> Result<Vec<CatalogItem>, TransportError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.settings.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            feed_warn!("Catalog request failed with status {}", status);
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        decode_movie_page(&bytes)
    }
}

#[async_trait::async_trait]
impl CatalogClient for TmdbCatalogClient {
    async fn fetch_page(&self, filters: &FilterSpec) -> Result<Vec<CatalogItem>, TransportError> {
        feed_debug!("Fetching {} page {}", DISCOVER_PATH, filters.page());
        let url = self.endpoint(DISCOVER_PATH, &filters.query_pairs())?;
        self.get_page(url).await
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<CatalogItem>, TransportError> {
        feed_debug!("Searching {} for {:?}", SEARCH_PATH, query);
        let params = [("query".to_string(), query.to_string())];
        let url = self.endpoint(SEARCH_PATH, &params)?;
        self.get_page(url).await
    }
}

fn too_large(max_bytes: u64, actual: u64) -> TransportError {
    TransportError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

// Strip the URL so the api_key query parameter never reaches messages or logs.
fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_decode() {
        FailureKind::Decode
    } else {
        FailureKind::Network
    };
    TransportError::new(kind, err.without_url().to_string())
}
