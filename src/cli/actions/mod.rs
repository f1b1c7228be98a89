pub mod ping;
pub mod session;
pub mod users;

mod run;

use anyhow::Result;
use serde::Serialize;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Login(session::LoginArgs),
    Logout { id: i32 },
    Refresh(session::RefreshArgs),
    Users,
    User { id: i32 },
    CreateUser(users::CreateArgs),
    Ping,
}

impl Action {
    /// Execute the action against the service described by `globals`.
    /// # Errors
    /// Returns an error if the request fails or the service rejects it.
    pub async fn execute(self, globals: &GlobalArgs) -> Result<()> {
        run::execute(self, globals).await
    }
}

/// Write a response to stdout as pretty JSON.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
