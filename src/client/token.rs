//! Token providers for the `Authorization` header.
//!
//! The invoker asks its provider for a token on every request, so a provider can
//! swap credentials between calls without rebuilding the client.

use super::{Error, jwt};
use secrecy::{ExposeSecret, SecretString};
use std::sync::RwLock;
use tracing::debug;

pub trait TokenProvider: Send + Sync {
    /// Token to present on the next request, `None` to send no `Authorization` header.
    /// # Errors
    /// Returns [`Error::Token`] when the provider holds a token it knows is unusable.
    fn token(&self) -> Result<Option<SecretString>, Error>;
}

/// Sends no `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn token(&self) -> Result<Option<SecretString>, Error> {
        Ok(None)
    }
}

/// The same token on every request, never checked for expiry.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: SecretString,
}

impl StaticToken {
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<Option<SecretString>, Error> {
        if self.token.expose_secret().trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.token.clone()))
    }
}

struct Session {
    access: SecretString,
    refresh: Option<SecretString>,
}

/// Tokens issued by the backend for the current session.
///
/// Empty until [`SessionToken::store`] is called (usually by a successful login).
/// An access token whose `exp` claim is in the past is refused instead of sent.
#[derive(Default)]
pub struct SessionToken {
    session: RwLock<Option<Session>>,
}

impl SessionToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session tokens.
    /// # Errors
    /// Returns an error if the session lock is poisoned.
    pub fn store(&self, access: SecretString, refresh: Option<SecretString>) -> Result<(), Error> {
        let mut session = self.session.write().map_err(|_| poisoned())?;

        debug!(
            expires_at = jwt::expires_at(access.expose_secret()),
            "storing session tokens"
        );

        *session = Some(Session { access, refresh });

        Ok(())
    }

    /// Drop the session tokens.
    /// # Errors
    /// Returns an error if the session lock is poisoned.
    pub fn clear(&self) -> Result<(), Error> {
        let mut session = self.session.write().map_err(|_| poisoned())?;
        *session = None;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the session lock is poisoned.
    pub fn is_active(&self) -> Result<bool, Error> {
        Ok(self.session.read().map_err(|_| poisoned())?.is_some())
    }

    /// # Errors
    /// Returns an error if the session lock is poisoned.
    pub fn refresh_token(&self) -> Result<Option<SecretString>, Error> {
        Ok(self
            .session
            .read()
            .map_err(|_| poisoned())?
            .as_ref()
            .and_then(|s| s.refresh.clone()))
    }

    fn token_at(&self, now: u64) -> Result<Option<SecretString>, Error> {
        let session = self.session.read().map_err(|_| poisoned())?;

        let Some(session) = session.as_ref() else {
            return Ok(None);
        };

        if let Some(exp) = jwt::expires_at(session.access.expose_secret())
            && exp <= now
        {
            return Err(Error::Token(format!("access token expired at {exp}")));
        }

        Ok(Some(session.access.clone()))
    }
}

impl TokenProvider for SessionToken {
    fn token(&self) -> Result<Option<SecretString>, Error> {
        self.token_at(jwt::now())
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self.session.read().map(|s| s.is_some()).unwrap_or(false);
        f.debug_struct("SessionToken")
            .field("active", &active)
            .finish()
    }
}

fn poisoned() -> Error {
    Error::Token("session lock poisoned".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64ct::{Base64UrlUnpadded, Encoding};

    fn jwt_expiring_at(exp: u64) -> SecretString {
        SecretString::from(format!(
            "{}.{}.sig",
            Base64UrlUnpadded::encode_string(br#"{"typ":"JWT","alg":"HS256"}"#),
            Base64UrlUnpadded::encode_string(format!(r#"{{"exp":{exp}}}"#).as_bytes())
        ))
    }

    #[test]
    fn static_token_is_returned_verbatim() {
        let provider = StaticToken::new(SecretString::from("fixed-token".to_string()));
        let token = provider.token().unwrap().unwrap();
        assert_eq!(token.expose_secret(), "fixed-token");
    }

    #[test]
    fn static_token_ignores_expiry() {
        let provider = StaticToken::new(jwt_expiring_at(1));
        assert!(provider.token().unwrap().is_some());
    }

    #[test]
    fn empty_static_token_sends_no_header() {
        let provider = StaticToken::new(SecretString::from(String::new()));
        assert!(provider.token().unwrap().is_none());
    }

    #[test]
    fn no_token_is_none() {
        assert!(NoToken.token().unwrap().is_none());
    }

    #[test]
    fn session_starts_empty() {
        let session = SessionToken::new();
        assert!(!session.is_active().unwrap());
        assert!(session.token().unwrap().is_none());
        assert!(session.refresh_token().unwrap().is_none());
    }

    #[test]
    fn session_store_and_clear() {
        let session = SessionToken::new();
        session
            .store(
                jwt_expiring_at(10_000_000_000),
                Some(SecretString::from("refresh-1".to_string())),
            )
            .unwrap();

        assert!(session.is_active().unwrap());
        assert!(session.token().unwrap().is_some());
        assert_eq!(
            session.refresh_token().unwrap().unwrap().expose_secret(),
            "refresh-1"
        );

        session.clear().unwrap();
        assert!(!session.is_active().unwrap());
        assert!(session.token().unwrap().is_none());
    }

    #[test]
    fn session_refuses_expired_access_token() {
        let session = SessionToken::new();
        session.store(jwt_expiring_at(100), None).unwrap();

        let err = session.token_at(100).err().unwrap();
        assert!(err.to_string().contains("expired at 100"));
        assert!(session.token_at(99).unwrap().is_some());
    }

    #[test]
    fn session_accepts_opaque_access_token() {
        let session = SessionToken::new();
        session
            .store(SecretString::from("opaque".to_string()), None)
            .unwrap();
        assert_eq!(
            session.token().unwrap().unwrap().expose_secret(),
            "opaque"
        );
    }

    #[test]
    fn session_debug_hides_tokens() {
        let session = SessionToken::new();
        session
            .store(SecretString::from("secret-access".to_string()), None)
            .unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-access"));
        assert!(debug.contains("active: true"));
    }
}
