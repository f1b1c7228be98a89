use crate::cli::actions::{Action, ping, session, users};
use crate::cli::globals::GlobalArgs;
use anyhow::Result;
use tracing::debug;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    debug!("executing {:?} with {:?}", action, globals);

    let api = globals.api()?;

    match action {
        Action::Login(args) => session::login(&api, args).await,
        Action::Logout { id } => session::logout(&api, id).await,
        Action::Refresh(args) => session::refresh(&api, args).await,
        Action::Users => users::list(&api).await,
        Action::User { id } => users::show(&api, id).await,
        Action::CreateUser(args) => users::create(&api, args).await,
        Action::Ping => ping::execute(&api).await,
    }
}
