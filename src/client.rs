//! Content store client
//!
//! `SanityClient` is the one long-lived connection to the content API. It
//! is built once from configuration and handed to whoever runs queries,
//! usually behind `Arc<dyn ContentSource>` so tests and the web layer can
//! swap in another source.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::config::CmsConfig;
use crate::image_url::{ImageUrlBuilder, ImageUrls};
use crate::models::{AssetId, Image};
use crate::{CmsError, Result};

/// GET requests with longer URLs are sent as POST instead
const MAX_GET_URL_LENGTH: usize = 11_264;

/// Named parameters of a query, sent as `$name=<json>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(key, value)` pairs for the query string, values JSON-encoded
    fn url_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, value)| (format!("${name}"), value.to_string()))
            .collect()
    }

    fn to_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect::<Map<_, _>>())
    }
}

/// Anything that can answer a query with its raw JSON `result`
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn query(&self, groq: &str, params: &QueryParams) -> Result<Value>;
}

/// Run a single-document query. A `null` result is `Ok(None)`.
pub async fn fetch_one<T, S>(source: &S, groq: &str, params: &QueryParams) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: ContentSource + ?Sized,
{
    let value = source.query(groq, params).await?;
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| CmsError::decode(format!("unexpected document shape: {e}")))
}

/// Run a collection query. A `null` result is an empty list.
pub async fn fetch_all<T, S>(source: &S, groq: &str, params: &QueryParams) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: ContentSource + ?Sized,
{
    match source.query(groq, params).await? {
        Value::Null => Ok(Vec::new()),
        value @ Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| CmsError::decode(format!("unexpected list item shape: {e}"))),
        other => Err(CmsError::decode(format!(
            "expected a list of documents, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ms: Option<u64>,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// HTTP client for the content API
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: Client,
    query_url: String,
    images: ImageUrls,
}

impl SanityClient {
    /// Build the client. Fails on incomplete configuration.
    pub fn new(config: &CmsConfig) -> Result<Self> {
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| CmsError::config("CMS token contains characters not allowed in a header"))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("tourcms/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| CmsError::config(format!("Failed to create HTTP client: {e}")))?;

        let query_url = format!(
            "{}/v{}/data/query/{}",
            config.api_base_url(),
            config.normalized_api_version(),
            config.dataset
        );
        info!(url = %query_url, use_cdn = config.use_cdn, "Content client ready");

        Ok(Self {
            http,
            query_url,
            images: ImageUrls::from_config(config),
        })
    }

    #[must_use]
    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Single-document fetch; `None` when nothing matches
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &QueryParams,
    ) -> Result<Option<T>> {
        fetch_one(self, groq, params).await
    }

    /// Collection fetch; empty when nothing matches
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &QueryParams,
    ) -> Result<Vec<T>> {
        fetch_all(self, groq, params).await
    }

    /// Transform URL builder for a known-good asset
    #[must_use]
    pub fn image_url(&self, asset: &AssetId) -> ImageUrlBuilder {
        self.images.image(asset)
    }

    /// Transform URL builder for an image field, if it has an asset
    #[must_use]
    pub fn image(&self, image: &Image) -> Option<ImageUrlBuilder> {
        self.images.for_image(image)
    }

    #[must_use]
    pub fn images(&self) -> &ImageUrls {
        &self.images
    }

    /// Cheap round trip proving credentials and dataset are usable
    pub async fn health_check(&self) -> Result<u64> {
        let count: Option<u64> = self
            .fetch(r#"count(*[_type == "tour"])"#, &QueryParams::new())
            .await?;
        Ok(count.unwrap_or_default())
    }

    fn get_url(&self, groq: &str, params: &QueryParams) -> String {
        let mut url = format!("{}?query={}", self.query_url, urlencoding::encode(groq));
        for (key, value) in params.url_pairs() {
            url.push('&');
            url.push_str(&urlencoding::encode(&key));
            url.push('=');
            url.push_str(&urlencoding::encode(&value));
        }
        url
    }

    fn error_for(status: StatusCode, body: &[u8]) -> CmsError {
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            error!("Content API rejected credentials (HTTP {})", status.as_u16());
            return CmsError::Unauthorized {
                status: status.as_u16(),
            };
        }

        let parsed: Option<ErrorBody> = serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .map(|r| r.error);

        match parsed {
            Some(ErrorBody {
                description,
                kind,
            }) if status == StatusCode::BAD_REQUEST => {
                let description = description.unwrap_or_else(|| "malformed query".to_string());
                error!("Content API rejected query: {}", description);
                CmsError::Query {
                    kind: kind.unwrap_or_else(|| "queryError".to_string()),
                    description,
                }
            }
            parsed => {
                let message = parsed
                    .and_then(|e| e.description)
                    .or_else(|| {
                        let text = String::from_utf8_lossy(body);
                        let text = text.trim();
                        (!text.is_empty()).then(|| text.chars().take(200).collect())
                    })
                    .unwrap_or_else(|| {
                        status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string()
                    });
                warn!("Content API error {}: {}", status, message);
                CmsError::api(status.as_u16(), message)
            }
        }
    }
}

#[async_trait]
impl ContentSource for SanityClient {
    #[instrument(name = "cms_query", skip(self, groq, params), fields(params = params.0.len()))]
    async fn query(&self, groq: &str, params: &QueryParams) -> Result<Value> {
        let start_time = Instant::now();

        let url = self.get_url(groq, params);
        let request = if url.len() <= MAX_GET_URL_LENGTH {
            debug!("GET query ({} chars)", groq.len());
            self.http.get(url)
        } else {
            debug!("POST query, URL would be {} chars", url.len());
            self.http.post(&self.query_url).json(&serde_json::json!({
                "query": groq,
                "params": params.to_json(),
            }))
        };

        let response = request.send().await.map_err(|e| {
            error!("Content API unreachable: {}", e);
            CmsError::from(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(Self::error_for(status, &body));
        }

        let envelope: QueryResponse = serde_json::from_slice(&body)
            .map_err(|e| CmsError::decode(format!("invalid query response: {e}")))?;

        let elapsed = start_time.elapsed();
        info!(
            "Query answered in {:.3}s (server {}ms)",
            elapsed.as_secs_f64(),
            envelope.ms.unwrap_or_default()
        );
        if elapsed.as_secs() > 5 {
            warn!("Slow content API response: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(envelope.result)
    }
}
