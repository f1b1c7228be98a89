use crate::api::Api;
use crate::client::{
    AuthScheme, Invoker, RetryPolicy, StatusPolicy,
    token::StaticToken,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};

#[derive(Clone)]
pub struct GlobalArgs {
    pub url: String,
    pub token: SecretString,
    pub auth_scheme: AuthScheme,
    pub status_policy: StatusPolicy,
    pub timeout: Option<Duration>,
    pub retries: u32,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            url,
            token: SecretString::default(),
            auth_scheme: AuthScheme::default(),
            status_policy: StatusPolicy::default(),
            timeout: None,
            retries: 0,
        }
    }

    pub fn set_token(&mut self, token: SecretString) {
        self.token = token;
    }

    /// Build an [`Api`] that presents the configured token on every request.
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn api(&self) -> Result<Api> {
        let invoker = Invoker::builder(&self.url)
            .token_provider(Arc::new(StaticToken::new(self.token.clone())))
            .auth_scheme(self.auth_scheme)
            .status_policy(self.status_policy)
            .retry(RetryPolicy::new(self.retries))
            .timeout(self.timeout)
            .build()
            .with_context(|| format!("invalid base URL: {}", self.url))?;

        Ok(Api::new(invoker))
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("url", &self.url)
            .field("token", &"***")
            .field("auth_scheme", &self.auth_scheme)
            .field("status_policy", &self.status_policy)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish()
    }
}
