use super::print_json;
use crate::api::{Api, CreateOutcome, NewUser};
use anyhow::{Context, Result, bail};
use secrecy::SecretString;

#[derive(Debug)]
pub struct CreateArgs {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

/// Print the user list exactly as the service returned it.
/// # Errors
/// Returns an error if the request fails.
pub async fn list(api: &Api) -> Result<()> {
    let users = api.list_users().await.context("failed to list users")?;
    print_json(&users)
}

/// # Errors
/// Returns an error if the request fails.
pub async fn show(api: &Api, id: i32) -> Result<()> {
    let user = api
        .get_user(id)
        .await
        .with_context(|| format!("failed to get user {id}"))?;
    print_json(&user)
}

/// # Errors
/// Returns an error if the request fails or the service refuses the new user.
pub async fn create(api: &Api, args: CreateArgs) -> Result<()> {
    let user = NewUser {
        name: args.name,
        email: args.email,
        password: args.password,
    };

    let outcome = api
        .create_user(&user)
        .await
        .with_context(|| format!("failed to create user {}", user.email))?;

    print_json(&outcome)?;

    if let CreateOutcome::Rejected(failure) = outcome {
        bail!("{}: {}", failure.message, failure.error);
    }

    Ok(())
}
