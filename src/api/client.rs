use super::types::{Article, DeleteAck, FetchResult, NewTag, NewUser, Tag, User};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Origin used to resolve a relative base path such as `/api`.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// Base path used when nothing else is configured.
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors returned by [`ApiClient`] operations.
///
/// `Network` (no response) and `Server` (a response with a non-2xx status)
/// are distinct shapes: callers branch on them to decide what to show.
#[derive(Debug, Error)]
pub enum RequestError {
    /// No response was received: connect failure, timeout, or a broken body.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Server error: status {status}{}", detail_suffix(.payload))]
    Server {
        status: u16,
        /// Decoded JSON error body, when the body was JSON.
        payload: Option<serde_json::Value>,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request payload could not be serialized.
    #[error("Invalid request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The configured base URL cannot be used to build request URLs.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl RequestError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded error payload, if the server sent a JSON body.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            RequestError::Server { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Human-readable `detail` field of the error payload, if present.
    pub fn detail(&self) -> Option<&str> {
        self.payload().and_then(payload_detail)
    }

    /// True when no response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self, RequestError::Network(_))
    }
}

fn payload_detail(payload: &serde_json::Value) -> Option<&str> {
    payload.get("detail").and_then(serde_json::Value::as_str)
}

fn detail_suffix(payload: &Option<serde_json::Value>) -> String {
    payload
        .as_ref()
        .and_then(payload_detail)
        .map(|detail| format!(" ({})", detail))
        .unwrap_or_default()
}

/// Resolve a configured API location into an absolute base URL.
///
/// Absolute `http(s)` URLs are used as-is; bare paths like `/api` are
/// resolved against [`DEFAULT_ORIGIN`].
pub fn resolve_base_url(raw: &str) -> Result<Url, RequestError> {
    let raw = raw.trim();
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(DEFAULT_ORIGIN)
            .and_then(|origin| origin.join(raw))
            .map_err(|e| RequestError::InvalidUrl(format!("{}: {}", raw, e)))?,
        Err(e) => return Err(RequestError::InvalidUrl(format!("{}: {}", raw, e))),
    };

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RequestError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                raw, scheme
            )))
        }
    }
    if url.cannot_be_a_base() {
        return Err(RequestError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Thin client over the Cognos HTTP API.
///
/// One method per backend capability, one request per call. No retries and
/// no caching: every call hits the network. Cloning is cheap (the underlying
/// `reqwest::Client` is reference-counted), so background tasks take their
/// own copy.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client for `base_url` (absolute URL or path, see [`resolve_base_url`]).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RequestError> {
        let base_url = resolve_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("cognos/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .map_err(RequestError::Network)?;

        tracing::debug!(base_url = %base_url, timeout_secs = timeout.as_secs(), "API client ready");
        Ok(Self { http, base_url })
    }

    /// The resolved base URL all endpoints hang off.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn list_users(&self) -> Result<Vec<User>, RequestError> {
        let url = self.endpoint(&["users"])?;
        self.execute(Method::GET, url, None).await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, RequestError> {
        let id = user_id.to_string();
        let url = self.endpoint(&["users", &id])?;
        self.execute(Method::GET, url, None).await
    }

    /// The backend takes the new user's fields as query parameters.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, RequestError> {
        let mut url = self.endpoint(&["users"])?;
        url.query_pairs_mut()
            .append_pair("email", &user.email)
            .append_pair("name", &user.name);
        self.execute(Method::POST, url, None).await
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    pub async fn list_tags(&self) -> Result<Vec<Tag>, RequestError> {
        let url = self.endpoint(&["tags"])?;
        self.execute(Method::GET, url, None).await
    }

    pub async fn get_tag(&self, tag_id: i64) -> Result<Tag, RequestError> {
        let id = tag_id.to_string();
        let url = self.endpoint(&["tags", &id])?;
        self.execute(Method::GET, url, None).await
    }

    pub async fn create_tag(&self, user_id: i64, tag: &NewTag) -> Result<Tag, RequestError> {
        let id = user_id.to_string();
        let url = self.endpoint(&["users", &id, "tags"])?;
        let body = serde_json::to_vec(tag).map_err(RequestError::Encode)?;
        self.execute(Method::POST, url, Some(body)).await
    }

    /// Delete a tag. An empty response body counts as an acknowledgement.
    pub async fn delete_tag(&self, tag_id: i64) -> Result<DeleteAck, RequestError> {
        let id = tag_id.to_string();
        let url = self.endpoint(&["tags", &id])?;
        let ack: Option<DeleteAck> = self.execute(Method::DELETE, url, None).await?;
        Ok(ack.unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Articles
    // ------------------------------------------------------------------

    pub async fn list_articles(
        &self,
        tag_id: i64,
        min_score: Option<f64>,
    ) -> Result<Vec<Article>, RequestError> {
        let id = tag_id.to_string();
        let mut url = self.endpoint(&["tags", &id, "articles"])?;
        if let Some(score) = min_score {
            url.query_pairs_mut()
                .append_pair("min_score", &score.to_string());
        }
        self.execute(Method::GET, url, None).await
    }

    /// Ask the backend to ingest fresh news and score it against the tag.
    pub async fn fetch_news(&self, tag_id: i64) -> Result<FetchResult, RequestError> {
        let id = tag_id.to_string();
        let url = self.endpoint(&["tags", &id, "fetch-news"])?;
        self.execute(Method::GET, url, None).await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RequestError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, RequestError> {
        tracing::debug!(method = %method, url = %url, "Sending API request");
        let started = Instant::now();

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %method, url = %url, error = %e, "API request failed without response");
            RequestError::Network(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(RequestError::Network)?;

        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "API response received"
        );

        if !status.is_success() {
            let payload = serde_json::from_slice::<serde_json::Value>(&bytes).ok();
            tracing::warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                payload = ?payload,
                "API request rejected"
            );
            return Err(RequestError::Server {
                status: status.as_u16(),
                payload,
            });
        }

        // Treat an empty body as JSON null so ack-style endpoints decode to None.
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "API response did not match expected shape");
            RequestError::Decode(e)
        })
    }
}
