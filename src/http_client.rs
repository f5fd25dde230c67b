//! HTTP access layer for the Waveport server.
//!
//! Uses `reqwest` with `rustls-tls` to avoid an OpenSSL dependency.
//! Every call is a single timeout-bounded round trip: 30 seconds for data
//! calls, 5 seconds for the liveness probe. There is no retry anywhere in
//! this layer — every failure is surfaced to the caller as an [`ApiError`].
//!
//! Responses are content-negotiated: a body declared `application/json` is
//! parsed into [`Body::Json`], anything else comes back verbatim as
//! [`Body::Text`]. Callers must not assume a fixed body shape.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;

/// Timeout for data calls (uploads, listings, registration).
pub const DATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the liveness probe — short so an unreachable server is
/// reported quickly.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness probe endpoint.
pub const LIVENESS_PATH: &str = "/healthz/live";

/// Errors returned by the HTTP access layer.
///
/// Timeouts get a dedicated variant because callers show a
/// network-reachability message for them, distinct from a generic transport
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The deadline elapsed before a response was received.
    Timeout { endpoint: String },
    /// The server responded with a non-2xx status.
    Remote { status: u16, status_text: String },
    /// Any other transport-level failure (DNS, connection refused,
    /// malformed response).
    Network(String),
    /// The request payload could not be serialized to JSON.
    Encode(String),
    /// The response body could not be decoded into the expected type.
    Decode(String),
    /// The endpoint was empty — every call needs a non-empty path.
    InvalidEndpoint,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { endpoint } => write!(f, "request timeout for {endpoint}"),
            Self::Remote {
                status,
                status_text,
            } => write!(f, "server returned HTTP {status} {status_text}"),
            Self::Network(e) => write!(f, "network error: {e}"),
            Self::Encode(e) => write!(f, "failed to encode request body: {e}"),
            Self::Decode(e) => write!(f, "failed to decode response body: {e}"),
            Self::InvalidEndpoint => write!(f, "endpoint must be a non-empty path"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Map a reqwest transport error to the matching `ApiError` kind.
pub(crate) fn classify_transport(endpoint: &str, e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        ApiError::Network(e.to_string())
    }
}

/// A content-negotiated response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The response declared `application/json` and parsed cleanly.
    Json(serde_json::Value),
    /// Anything else — returned byte-for-byte as text.
    Text(String),
}

/// Request payload for [`ApiClient::request`].
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

/// Per-call options for [`ApiClient::request`].
///
/// The default is a bare GET with no headers, no body, and [`DATA_TIMEOUT`].
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            timeout: DATA_TIMEOUT,
        }
    }
}

/// Client for the Waveport server.
///
/// Holds the resolved endpoint configuration and a `reqwest::Client`.
/// Stateless between calls: no cache, no queue, no shared mutable state —
/// concurrent calls are independent round trips with independent timers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given endpoint configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Create a client from `WAVEPORT_API_HOST` / `WAVEPORT_API_PORT`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ApiConfig::from_env())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Join the base URL and an endpoint with exactly one slash.
    /// `build_url("/x")` and `build_url("x")` produce the same result.
    pub fn build_url(&self, endpoint: &str) -> String {
        let base = self.config.base_url();
        if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }

    /// Perform a timeout-bounded request and negotiate the response body.
    ///
    /// Non-2xx statuses become [`ApiError::Remote`]; an elapsed deadline
    /// becomes [`ApiError::Timeout`] (never `Network`); other transport
    /// failures become [`ApiError::Network`].
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Body, ApiError> {
        let response = self.send(endpoint, options).await?;
        negotiate(endpoint, response).await
    }

    /// Typed GET: requests JSON and decodes the body into `T`.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let options = RequestOptions {
            method: Method::GET,
            headers,
            ..Default::default()
        };
        decode(endpoint, self.request(endpoint, options).await?)
    }

    /// Typed POST: serializes `data` to JSON and decodes the JSON response
    /// into `T`.
    pub async fn post<T, B>(&self, endpoint: &str, data: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(data).map_err(|e| ApiError::Encode(e.to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let options = RequestOptions {
            method: Method::POST,
            headers,
            body: Some(RequestBody::Json(payload)),
            ..Default::default()
        };
        decode(endpoint, self.request(endpoint, options).await?)
    }

    /// POST a multipart form (binary upload path) and negotiate the
    /// response body.
    pub async fn post_multipart(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Body, ApiError> {
        if endpoint.trim().is_empty() {
            return Err(ApiError::InvalidEndpoint);
        }
        let url = self.build_url(endpoint);
        tracing::debug!(%url, "POST multipart");
        let builder = self
            .http
            .post(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .multipart(form);
        let response = self.dispatch(endpoint, builder, DATA_TIMEOUT).await?;
        negotiate(endpoint, response).await
    }

    /// GET a status-checked raw response for binary payloads (downloads).
    /// The caller reads the body as bytes or a stream.
    pub async fn get_raw(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<reqwest::Response, ApiError> {
        if endpoint.trim().is_empty() {
            return Err(ApiError::InvalidEndpoint);
        }
        let url = self.build_url(endpoint);
        tracing::debug!(%url, "GET raw");
        self.dispatch(endpoint, self.http.get(&url), timeout).await
    }

    /// Probe the server's liveness endpoint. Returns the response body as
    /// text (the endpoint replies with free-form text, not JSON).
    pub async fn probe_live(&self) -> Result<String, ApiError> {
        let options = RequestOptions {
            timeout: PROBE_TIMEOUT,
            ..Default::default()
        };
        match self.request(LIVENESS_PATH, options).await? {
            Body::Text(text) => Ok(text),
            Body::Json(value) => Ok(value.to_string()),
        }
    }

    async fn send(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<reqwest::Response, ApiError> {
        if endpoint.trim().is_empty() {
            return Err(ApiError::InvalidEndpoint);
        }
        let url = self.build_url(endpoint);
        tracing::debug!(method = %options.method, %url, "sending request");

        let mut builder = self
            .http
            .request(options.method, &url)
            .headers(options.headers);
        builder = match options.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Bytes(bytes)) => builder.body(bytes),
            None => builder,
        };
        self.dispatch(endpoint, builder, options.timeout).await
    }

    /// Execute a prepared request with the given deadline and check the
    /// status. The timeout covers connect through end of response body.
    async fn dispatch(
        &self,
        endpoint: &str,
        builder: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<reqwest::Response, ApiError> {
        let response = builder
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport(endpoint, e))?;

        let status = response.status();
        tracing::debug!(endpoint, status = status.as_u16(), "response received");
        if !status.is_success() {
            return Err(ApiError::Remote {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(response)
    }
}

/// Decode a negotiated body into a typed value. A text body still satisfies
/// callers expecting a plain `String` (the liveness endpoint answers in
/// free-form text); anything else requires JSON.
fn decode<T: DeserializeOwned>(endpoint: &str, body: Body) -> Result<T, ApiError> {
    match body {
        Body::Json(value) => {
            serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
        }
        Body::Text(text) => serde_json::from_value(serde_json::Value::String(text))
            .map_err(|e| ApiError::Decode(format!("expected JSON response from {endpoint}: {e}"))),
    }
}

/// Content negotiation: parse the body as JSON when the response declares
/// it, otherwise return the raw text unchanged.
async fn negotiate(endpoint: &str, response: reqwest::Response) -> Result<Body, ApiError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let text = response
        .text()
        .await
        .map_err(|e| classify_transport(endpoint, e))?;

    if is_json {
        let value = serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(Body::Json(value))
    } else {
        Ok(Body::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(ApiConfig {
            host: "localhost".to_string(),
            port: 5132,
        })
        .unwrap()
    }

    #[test]
    fn test_build_url_with_leading_slash() {
        assert_eq!(
            client().build_url("/GetRecordings"),
            "http://localhost:5132/GetRecordings"
        );
    }

    #[test]
    fn test_build_url_without_leading_slash() {
        assert_eq!(
            client().build_url("GetRecordings"),
            "http://localhost:5132/GetRecordings"
        );
    }

    #[test]
    fn test_build_url_is_idempotent() {
        let c = client();
        assert_eq!(c.build_url("/x"), c.build_url("/x"));
        assert_eq!(c.build_url("x"), c.build_url("/x"));
    }

    #[test]
    fn test_request_options_default() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::GET);
        assert!(options.headers.is_empty());
        assert!(options.body.is_none());
        assert_eq!(options.timeout, DATA_TIMEOUT);
    }

    #[tokio::test]
    async fn test_empty_endpoint_is_rejected() {
        let err = client()
            .request("", RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::InvalidEndpoint);

        let err = client().get_raw("  ", DATA_TIMEOUT).await.unwrap_err();
        assert_eq!(err, ApiError::InvalidEndpoint);
    }

    #[test]
    fn test_decode_rejects_text_body() {
        let err =
            decode::<Vec<String>>("/GetRecordings", Body::Text("alive".to_string())).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_decode_text_body_into_string() {
        let text: String = decode("/healthz/live", Body::Text("alive".to_string())).unwrap();
        assert_eq!(text, "alive");
    }

    #[test]
    fn test_decode_json_body() {
        let body = Body::Json(serde_json::json!(["a", "b"]));
        let values: Vec<String> = decode("/x", body).unwrap();
        assert_eq!(values, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::Timeout {
                endpoint: "/UploadAudio".to_string()
            }
            .to_string(),
            "request timeout for /UploadAudio"
        );
        assert_eq!(
            ApiError::Remote {
                status: 500,
                status_text: "Internal Server Error".to_string()
            }
            .to_string(),
            "server returned HTTP 500 Internal Server Error"
        );
        assert_eq!(
            ApiError::Network("connection refused".to_string()).to_string(),
            "network error: connection refused"
        );
        assert_eq!(
            ApiError::InvalidEndpoint.to_string(),
            "endpoint must be a non-empty path"
        );
    }
}
