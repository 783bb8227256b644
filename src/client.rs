//! Authenticated JSON client for the presentation API
//!
//! [`ApiClient::request`] is the raw contract: it always attaches the bearer
//! credential, sends an optional JSON body and hands back status, headers and
//! the body parsed as JSON (or the raw text when it is not JSON). It never
//! retries. The typed calls on top of it cover the four endpoints the
//! orchestrator uses.

use crate::config::Config;
use crate::error::{Error, RemoteError, Result};
use crate::types::{Deck, ExportFormat, ExportStart};
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

/// Longest error body (in characters) carried into an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Response body, parsed as JSON when possible
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON
    Json(Value),
    /// Body that was empty or not valid JSON (e.g. an HTML error page)
    Text(String),
}

/// Status, headers and body of one API call
#[derive(Clone, Debug)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers (`retry-after` is read from here)
    pub headers: HeaderMap,
    /// Parsed body
    pub data: ResponseBody,
}

impl ApiResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode a JSON body into a model
    ///
    /// A text body or a JSON body of the wrong shape is an [`Error::InvalidResponse`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.data {
            ResponseBody::Json(value) => T::deserialize(value).map_err(|e| {
                Error::InvalidResponse(format!("unexpected response shape: {e}"))
            }),
            ResponseBody::Text(text) => Err(Error::InvalidResponse(format!(
                "expected JSON, got: {}",
                truncate(text)
            ))),
        }
    }

    /// Best-effort human-readable error message from the body
    pub fn error_message(&self) -> String {
        match &self.data {
            ResponseBody::Json(value) => {
                let nested = value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str);
                let flat = value
                    .get("error")
                    .and_then(Value::as_str)
                    .or_else(|| value.get("message").and_then(Value::as_str));
                match nested.or(flat) {
                    Some(msg) => msg.to_string(),
                    None => truncate(&value.to_string()),
                }
            }
            ResponseBody::Text(text) if text.trim().is_empty() => self
                .status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
            ResponseBody::Text(text) => truncate(text),
        }
    }

    /// Turn a non-2xx response into a [`RemoteError::Api`]
    fn into_remote_error(self, operation: &str) -> Error {
        Error::Remote(RemoteError::Api {
            operation: operation.to_string(),
            status: self.status.as_u16(),
            message: self.error_message(),
        })
    }
}

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{head}…")
    }
}

fn parse_body(text: String) -> ResponseBody {
    if text.trim().is_empty() {
        return ResponseBody::Text(text);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Text(text),
    }
}

/// HTTP client for the presentation API
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl ApiClient {
    /// Build a client from the configuration
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config("base_url", "base URL cannot hold a path"));
        }
        // Keep any path prefix when joining endpoint paths
        let prefix = format!("{}/", base_url.path().trim_end_matches('/'));
        base_url.set_path(&prefix);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .user_agent(concat!("deckgen/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Issue an authenticated request against a path relative to the base URL
    ///
    /// The body, when present, is sent as JSON. The response body is parsed as
    /// JSON, falling back to raw text.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        self.send(method, url, body).await
    }

    /// Create a deck from a prompt
    pub async fn create_deck(&self, prompt: &str, name: Option<&str>) -> Result<Deck> {
        let mut body = json!({ "prompt": prompt });
        if let Some(name) = name {
            body["name"] = Value::String(name.to_string());
        }

        let url = self.endpoint(&["v1", "decks"])?;
        let response = self.send(Method::POST, url, Some(&body)).await?;
        if !response.is_success() {
            return Err(response.into_remote_error("create deck"));
        }
        response.json()
    }

    /// Fetch the current state of a deck
    ///
    /// Returns the raw response so the poller can inspect the status code and
    /// the `retry-after` header.
    pub async fn get_deck(&self, deck_id: &str) -> Result<ApiResponse> {
        let url = self.endpoint(&["v1", "decks", deck_id])?;
        self.send(Method::GET, url, None).await
    }

    /// Start an export job for a completed deck
    pub async fn start_export(
        &self,
        deck_id: &str,
        format: ExportFormat,
        upscale: bool,
    ) -> Result<ExportStart> {
        let body = json!({ "format": format.as_str(), "upscale": upscale });

        let url = self.endpoint(&["v1", "decks", deck_id, "export"])?;
        let response = self.send(Method::POST, url, Some(&body)).await?;
        if !response.is_success() {
            return Err(response.into_remote_error("start export"));
        }
        response.json()
    }

    /// Fetch the current state of an export job
    pub async fn get_export(&self, deck_id: &str, export_id: &str) -> Result<ApiResponse> {
        let mut url = self.endpoint(&["v1", "decks", deck_id, "export"])?;
        url.query_pairs_mut().append_pair("export_id", export_id);
        self.send(Method::GET, url, None).await
    }

    /// Base URL with path segments appended (each segment percent-encoded)
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config("base_url", "base URL cannot hold a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<ApiResponse> {
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "API response"
        );

        Ok(ApiResponse {
            status,
            headers,
            data: parse_body(text),
        })
    }
}
