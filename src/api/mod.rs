//! Operations of the user service, one per endpoint.

pub mod types;

pub use self::types::{
    ApiFailure, CreateOutcome, CreatedUser, Credentials, Health, LoginOutcome, LogoutOutcome,
    NewUser, Tokens, User, UserLoggedIn,
};

use self::types::{LogoutRequest, RefreshRequest, UserList, UserResponse};
use crate::client::{
    Error, Invoker,
    token::{NoToken, SessionToken, StaticToken},
};
use reqwest::Method;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const PATH_LOGIN: &str = "/app/login";
pub const PATH_USERS: &str = "/users/all";
pub const PATH_USER: &str = "/users";
/// Not routed by every deployment of the user service.
pub const PATH_CREATE_USER: &str = "/users/create";
pub const PATH_LOGOUT: &str = "/session/logout";
pub const PATH_REFRESH: &str = "/session/refresh";
pub const PATH_PING: &str = "/ping";

#[derive(Debug, Clone)]
pub struct Api {
    invoker: Invoker,
    session: Option<Arc<SessionToken>>,
}

impl Api {
    #[must_use]
    pub fn new(invoker: Invoker) -> Self {
        Self {
            invoker,
            session: None,
        }
    }

    /// Keep `session` in step with login, refresh and logout.
    ///
    /// `session` should also be the invoker's token provider so the stored
    /// access token is presented on later calls.
    #[must_use]
    pub fn with_session(invoker: Invoker, session: Arc<SessionToken>) -> Self {
        Self {
            invoker,
            session: Some(session),
        }
    }

    #[must_use]
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// `POST /app/login`, returning the response exactly as received.
    /// # Errors
    /// See [`Invoker::invoke`].
    #[instrument(skip(self))]
    pub async fn login_raw(&self, credentials: &Credentials) -> Result<Value, Error> {
        self.invoker.post(PATH_LOGIN, credentials).await
    }

    /// `POST /app/login`; on success the issued tokens replace the session, if any.
    ///
    /// With a session the login goes out without an `Authorization` header, and the
    /// current tokens stay in place unless the backend issues new ones.
    /// # Errors
    /// See [`Invoker::invoke`]; a body that is neither a login nor a failure is an [`Error::Decode`].
    #[instrument(skip(self))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, Error> {
        let response = if self.session.is_some() {
            self.invoker
                .with_token_provider(Arc::new(NoToken))
                .post(PATH_LOGIN, credentials)
                .await?
        } else {
            self.login_raw(credentials).await?
        };

        let outcome: LoginOutcome = decode(response)?;

        match &outcome {
            LoginOutcome::LoggedIn { user_logged_in } => {
                info!("logged in as {}", user_logged_in.name);

                if let Some(session) = &self.session {
                    session.store(
                        SecretString::from(user_logged_in.jwt.clone()),
                        user_logged_in.refresh_token.clone().map(SecretString::from),
                    )?;
                }
            }
            LoginOutcome::Rejected(failure) => {
                warn!("login rejected: {}: {}", failure.message, failure.error);
            }
        }

        Ok(outcome)
    }

    /// `GET /users/all`, returning the response exactly as received.
    /// # Errors
    /// See [`Invoker::invoke`].
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Value, Error> {
        self.invoker.get(PATH_USERS).await
    }

    /// `GET /users/all` decoded into users, in the order the backend sent them.
    /// # Errors
    /// See [`Invoker::invoke`].
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<User>, Error> {
        let list: UserList = decode(self.list_users().await?)?;
        Ok(list.into())
    }

    /// `GET /users/{id}`
    /// # Errors
    /// See [`Invoker::invoke`].
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i32) -> Result<User, Error> {
        let response: UserResponse = decode(self.invoker.get(&format!("{PATH_USER}/{id}")).await?)?;
        Ok(response.user)
    }

    /// `POST /users/create`
    /// # Errors
    /// See [`Invoker::invoke`].
    #[instrument(skip(self))]
    pub async fn create_user(&self, user: &NewUser) -> Result<CreateOutcome, Error> {
        decode(self.invoker.post(PATH_CREATE_USER, user).await?)
    }

    /// `POST /session/logout`; the session is cleared once the backend confirms.
    /// # Errors
    /// See [`Invoker::invoke`].
    #[instrument(skip(self))]
    pub async fn logout(&self, id: i32) -> Result<LogoutOutcome, Error> {
        let outcome: LogoutOutcome =
            decode(self.invoker.post(PATH_LOGOUT, &LogoutRequest { id }).await?)?;

        if outcome.user_logged_out {
            if let Some(session) = &self.session {
                session.clear()?;
            }
        } else {
            warn!("logout of user {} not confirmed", id);
        }

        Ok(outcome)
    }

    /// `POST /session/refresh`; the new tokens replace the session, if any.
    ///
    /// The refresh token is also presented as the `Authorization` header: it outlives
    /// the access token, which has usually expired by the time a refresh is needed.
    /// # Errors
    /// See [`Invoker::invoke`].
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, id: i32, refresh_token: &SecretString) -> Result<Tokens, Error> {
        let request = RefreshRequest { id, refresh_token };

        let invoker = self
            .invoker
            .with_token_provider(Arc::new(StaticToken::new(refresh_token.clone())));

        let tokens: Tokens = decode(invoker.post(PATH_REFRESH, &request).await?)?;

        if let Some(session) = &self.session {
            session.store(
                SecretString::from(tokens.access_token.clone()),
                Some(SecretString::from(tokens.refresh_token.clone())),
            )?;
        }

        Ok(tokens)
    }

    /// Refresh using the refresh token held by the session.
    /// # Errors
    /// Returns [`Error::Token`] when there is no session or it holds no refresh token.
    pub async fn refresh_session(&self, id: i32) -> Result<Tokens, Error> {
        let refresh_token = self
            .session
            .as_ref()
            .map(|session| session.refresh_token())
            .transpose()?
            .flatten()
            .ok_or_else(|| Error::Token("no refresh token in session".to_string()))?;

        self.refresh(id, &refresh_token).await
    }

    /// `GET /ping`
    /// # Errors
    /// See [`Invoker::invoke`].
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<Health, Error> {
        self.invoker
            .invoke_as(Method::GET, PATH_PING, None::<&Value>, &[])
            .await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value).map_err(Error::Decode)
}
