use super::print_json;
use crate::api::Api;
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if the service cannot be reached or answers unexpectedly.
pub async fn execute(api: &Api) -> Result<()> {
    let health = api.ping().await.context("user service is not reachable")?;
    print_json(&health)
}
