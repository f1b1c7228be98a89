//! The request invoker: one HTTP round trip in, one decoded JSON value out.
//!
//! Flow of [`Invoker::invoke`]:
//! - Join the path onto the base URL.
//! - Encode the optional body as JSON text.
//! - Set `X-Request-Id`, the provider's token and, when a body is present,
//!   `Content-Type: application/json`. Caller headers replace any of these, one
//!   value per name.
//! - Send, read the whole body, and apply the [`StatusPolicy`].
//! - Decode the body as JSON.
//!
//! Failures surface as [`Error`]; retryable ones are resent per [`RetryPolicy`].

pub mod error;
pub mod jwt;
pub mod retry;
pub mod token;

pub use self::error::Error;
pub use self::retry::RetryPolicy;

use self::token::{NoToken, TokenProvider};
use reqwest::{
    Client, Method,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use secrecy::ExposeSecret;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{Instrument, debug, info_span, warn};
use ulid::Ulid;
use url::Url;

/// Maximum number of error body characters kept in [`Error::HttpStatus`].
const MAX_ERROR_CHARS: usize = 200;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// What to do with a response whose status is not 2xx.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Fail with [`Error::HttpStatus`].
    #[default]
    Strict,
    /// Decode the body as if the request had succeeded.
    Permissive,
}

/// How the token is written into the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// The token alone, which is what the user service validates.
    #[default]
    Raw,
    /// `Bearer <token>`
    Bearer,
}

impl AuthScheme {
    fn header_value(self, token: &str) -> String {
        match self {
            Self::Raw => token.to_string(),
            Self::Bearer => format!("Bearer {token}"),
        }
    }
}

pub struct Builder {
    base_url: String,
    user_agent: String,
    tokens: Arc<dyn TokenProvider>,
    scheme: AuthScheme,
    policy: StatusPolicy,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl Builder {
    #[must_use]
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    #[must_use]
    pub fn token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = tokens;
        self
    }

    #[must_use]
    pub fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.scheme = scheme;
        self
    }

    #[must_use]
    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whole-request timeout; none by default.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// # Errors
    /// Returns an error if the base URL cannot be parsed or the HTTP client cannot be built.
    pub fn build(self) -> Result<Invoker, Error> {
        let base_url = Url::parse(self.base_url.trim())?;

        let mut client = Client::builder().user_agent(self.user_agent);

        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(Invoker {
            client: client.build().map_err(Error::Network)?,
            base_url,
            tokens: self.tokens,
            scheme: self.scheme,
            policy: self.policy,
            retry: self.retry,
        })
    }
}

#[derive(Clone)]
pub struct Invoker {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
    scheme: AuthScheme,
    policy: StatusPolicy,
    retry: RetryPolicy,
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("base_url", &self.base_url.as_str())
            .field("scheme", &self.scheme)
            .field("policy", &self.policy)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Invoker {
    #[must_use]
    pub fn builder(base_url: &str) -> Builder {
        Builder {
            base_url: base_url.to_string(),
            user_agent: crate::APP_USER_AGENT.to_string(),
            tokens: Arc::new(NoToken),
            scheme: AuthScheme::default(),
            policy: StatusPolicy::default(),
            retry: RetryPolicy::default(),
            timeout: None,
        }
    }

    /// A copy of this invoker that asks `tokens` for the `Authorization` header instead.
    #[must_use]
    pub fn with_token_provider(&self, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            tokens,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join `path` onto the base URL, keeping any path prefix the base already has.
    /// # Errors
    /// Returns an error if the result is not a valid URL.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim().trim_start_matches('/');

        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// `GET path` with no extra headers.
    /// # Errors
    /// See [`Invoker::invoke`].
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        self.invoke(Method::GET, path, None::<&Value>, &[]).await
    }

    /// `POST path` with a JSON body and no extra headers.
    /// # Errors
    /// See [`Invoker::invoke`].
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, Error> {
        self.invoke(Method::POST, path, Some(body), &[]).await
    }

    /// Perform the request and decode the response body into `T`.
    /// # Errors
    /// See [`Invoker::invoke`]; a body that does not match `T` is an [`Error::Decode`].
    pub async fn invoke_as<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: &[(String, String)],
    ) -> Result<T, Error> {
        let value = self.invoke(method, path, body, headers).await?;
        serde_json::from_value(value).map_err(Error::Decode)
    }

    /// Perform one request and return the decoded JSON body.
    /// # Errors
    /// - [`Error::Url`] if `path` does not form a valid URL
    /// - [`Error::Encode`] if `body` cannot be serialized
    /// - [`Error::Header`] or [`Error::Token`] if headers cannot be built
    /// - [`Error::Network`] if the server cannot be reached
    /// - [`Error::HttpStatus`] on a non-2xx status under [`StatusPolicy::Strict`]
    /// - [`Error::Decode`] if the response body is not JSON
    pub async fn invoke<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: &[(String, String)],
    ) -> Result<Value, Error> {
        let url = self.endpoint_url(path)?;

        let payload = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(Error::Encode)?;

        let mut retry = 0;

        loop {
            let request_id = Ulid::new().to_string();

            let span = info_span!(
                "http.request",
                http.method = %method,
                url = %url,
                request_id = %request_id,
                attempt = retry + 1
            );

            let result = self
                .round_trip(&method, &url, payload.as_deref(), headers, &request_id)
                .instrument(span)
                .await;

            match result {
                Err(e) if e.is_retryable() && retry < self.retry.max_retries() => {
                    retry += 1;

                    let delay = self.retry.backoff(retry);

                    warn!(
                        "{} {} failed: {}, retrying in {:?} ({}/{})",
                        method,
                        url,
                        e,
                        delay,
                        retry,
                        self.retry.max_retries()
                    );

                    sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn round_trip(
        &self,
        method: &Method,
        url: &Url,
        payload: Option<&str>,
        headers: &[(String, String)],
        request_id: &str,
    ) -> Result<Value, Error> {
        let caller = caller_headers(headers)?;

        let mut request_headers = HeaderMap::new();

        request_headers.insert(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_str(request_id)
                .map_err(|e| Error::Header(format!("{REQUEST_ID_HEADER}: {e}")))?,
        );

        // an explicit Authorization header means the provider is not consulted
        if !caller.contains_key(AUTHORIZATION)
            && let Some(token) = self.tokens.token()?
        {
            let mut value = HeaderValue::from_str(&self.scheme.header_value(token.expose_secret()))
                .map_err(|e| Error::Header(format!("{AUTHORIZATION}: {e}")))?;
            value.set_sensitive(true);

            request_headers.insert(AUTHORIZATION, value);
        }

        if payload.is_some() {
            request_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        request_headers.extend(caller);

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .headers(request_headers);

        if let Some(payload) = payload {
            builder = builder.body(payload.to_string());
        }

        let response = builder.send().await.map_err(Error::Network)?;

        let status = response.status();

        let bytes = response.bytes().await.map_err(Error::Network)?;

        debug!("{} {} -> {} ({} bytes)", method, url, status, bytes.len());

        if !status.is_success() && self.policy == StatusPolicy::Strict {
            return Err(Error::HttpStatus {
                status,
                body: sanitize_body(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(Error::Decode)
    }
}

/// Validate caller headers; a repeated name keeps its last value.
fn caller_headers(headers: &[(String, String)]) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Header(format!("{name}: {e}")))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| Error::Header(format!("{name}: {e}")))?;

        map.insert(header_name, header_value);
    }

    Ok(map)
}

/// Trim and truncate an error body for display.
fn sanitize_body(body: &[u8]) -> String {
    let body = String::from_utf8_lossy(body);
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
