use super::print_json;
use crate::api::{Api, ApiFailure, Credentials};
use anyhow::{Context, Result, bail};
use secrecy::SecretString;

#[derive(Debug)]
pub struct LoginArgs {
    pub name: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct RefreshArgs {
    pub id: i32,
    pub refresh_token: SecretString,
}

/// Print the login response as received.
/// # Errors
/// Returns an error if the request fails or the body is a `{message, error}` failure.
pub async fn login(api: &Api, args: LoginArgs) -> Result<()> {
    let credentials = Credentials {
        name: args.name,
        password: args.password,
    };

    let response = api
        .login_raw(&credentials)
        .await
        .with_context(|| format!("login failed for {}", credentials.name))?;

    print_json(&response)?;

    if let Some(failure) = ApiFailure::from_body(&response) {
        bail!("{}: {}", failure.message, failure.error);
    }

    Ok(())
}

/// # Errors
/// Returns an error if the request fails or the logout is not confirmed.
pub async fn logout(api: &Api, id: i32) -> Result<()> {
    let outcome = api
        .logout(id)
        .await
        .with_context(|| format!("logout failed for user {id}"))?;

    print_json(&outcome)?;

    if !outcome.user_logged_out {
        bail!(
            "user {} was not logged out: {}",
            id,
            outcome.error.unwrap_or_default()
        );
    }

    Ok(())
}

/// # Errors
/// Returns an error if the request fails.
pub async fn refresh(api: &Api, args: RefreshArgs) -> Result<()> {
    let tokens = api
        .refresh(args.id, &args.refresh_token)
        .await
        .with_context(|| format!("session refresh failed for user {}", args.id))?;

    print_json(&tokens)
}
