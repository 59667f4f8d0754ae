//! HTTP client for the social backend.
//!
//! `ApiClient` owns its own authorization header. Installing or clearing a
//! bearer token affects every later request made through the same client and
//! nothing else in the process.

mod error;
mod types;

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
pub use error::{ApiError, ApiErrorKind, ApiResult, ErrorPayload};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
pub use types::{
    Credentials, ImageUpload, Like, LoginRequest, Notification, SignupRequest, TokenResponse,
    UserData, UserDetails,
};
use url::Url;

use crate::config::ApiConfig;

/// Base URL used when neither env nor config sets one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Environment variable overriding the configured base URL.
pub const BASE_URL_ENV: &str = "SOCIALAPP_BASE_URL";

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("socialapp/", env!("CARGO_PKG_VERSION"));

/// Resolves the backend base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if the chosen URL is not a valid http(s) URL.
pub fn resolve_base_url(config_base_url: Option<&str>) -> Result<String> {
    if let Ok(env_url) = std::env::var(BASE_URL_ENV) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_base_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_base_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }

    Ok(DEFAULT_BASE_URL.to_string())
}

/// Validates that a base URL is a well-formed http(s) URL.
///
/// # Errors
/// Returns an error if the URL cannot be parsed or uses another scheme.
pub fn validate_base_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("API base URL must use http or https: {url}");
    }
    Ok(parsed)
}

/// Client for the social backend REST API.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    authorization: RwLock<Option<String>>,
}

impl ApiClient {
    /// Creates a client from config, honoring the base URL env override.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let base_url = resolve_base_url(config.base_url.as_deref())?;
        Self::new(&base_url, config.request_timeout())
    }

    /// Creates a client for a base URL.
    ///
    /// # Panics
    /// In test builds (`#[cfg(test)]`), panics if `base_url` is the default
    /// URL. Tests must point the client at a mock server.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        #[cfg(test)]
        assert!(
            base_url.trim_end_matches('/') != DEFAULT_BASE_URL,
            "Tests must not use the default backend URL; start a wiremock server instead."
        );

        let base_url = validate_base_url(base_url)?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            authorization: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Installs (or clears, with `None`) the `Authorization` header value.
    pub fn set_authorization(&self, value: Option<String>) {
        *self
            .authorization
            .write()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Returns the current `Authorization` header value.
    pub fn authorization(&self) -> Option<String> {
        self.authorization
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `POST /login`
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<TokenResponse> {
        self.send_json(self.request(Method::POST, &["login"]).json(request))
            .await
    }

    /// `POST /signup`
    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<TokenResponse> {
        self.send_json(self.request(Method::POST, &["signup"]).json(request))
            .await
    }

    /// `GET /user`
    pub async fn user(&self) -> ApiResult<UserData> {
        self.send_json(self.request(Method::GET, &["user"])).await
    }

    /// `POST /user`
    pub async fn edit_details(&self, details: &UserDetails) -> ApiResult<()> {
        self.send(self.request(Method::POST, &["user"]).json(details))
            .await
            .map(drop)
    }

    /// `POST /user/image` as multipart with a single `image` field.
    pub async fn upload_image(&self, image: ImageUpload) -> ApiResult<()> {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)?;
        let form = reqwest::multipart::Form::new().part("image", part);
        self.send(self.request(Method::POST, &["user", "image"]).multipart(form))
            .await
            .map(drop)
    }

    /// `POST /notifications` with the ids to mark as read.
    pub async fn mark_notifications_read(&self, ids: &[String]) -> ApiResult<()> {
        self.send(self.request(Method::POST, &["notifications"]).json(ids))
            .await
            .map(drop)
    }

    /// `GET /scream/{id}/like`
    pub async fn like_scream(&self, scream_id: &str) -> ApiResult<()> {
        self.send(self.request(Method::GET, &["scream", scream_id, "like"]))
            .await
            .map(drop)
    }

    /// `GET /scream/{id}/unlike`
    pub async fn unlike_scream(&self, scream_id: &str) -> ApiResult<()> {
        self.send(self.request(Method::GET, &["scream", scream_id, "unlike"]))
            .await
            .map(drop)
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "sending request");
        let builder = self.http.request(method, url);
        match self.authorization() {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::parse(format!("Failed to parse response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, None).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://127.0.0.1:9/api/");
        assert_eq!(
            api.endpoint(&["user", "image"]).as_str(),
            "http://127.0.0.1:9/api/user/image"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("http://127.0.0.1:9");
        assert_eq!(
            api.endpoint(&["scream", "a/b c", "like"]).as_str(),
            "http://127.0.0.1:9/scream/a%2Fb%20c/like"
        );
    }

    #[test]
    fn test_authorization_slot_is_per_client() {
        let first = client("http://127.0.0.1:9");
        let second = client("http://127.0.0.1:9");
        first.set_authorization(Some("Bearer abc".to_string()));
        assert_eq!(first.authorization().as_deref(), Some("Bearer abc"));
        assert_eq!(second.authorization(), None);

        first.set_authorization(None);
        assert_eq!(first.authorization(), None);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        assert!(ApiClient::new("ftp://example.com", None).is_err());
        assert!(ApiClient::new("not a url", None).is_err());
    }

    #[test]
    #[should_panic(expected = "Tests must not use the default backend URL")]
    fn test_default_url_is_blocked_in_tests() {
        let _ = ApiClient::new(DEFAULT_BASE_URL, None);
    }
}
