//! Map parsed arguments to the action to run and the connection options it runs with.

use crate::cli::actions::{Action, session, users};
use crate::cli::commands::{
    client,
    session::{self as session_cmd, required},
    users as users_cmd,
};
use crate::cli::globals::GlobalArgs;
use crate::client::{AuthScheme, StatusPolicy};
use anyhow::{Context, Result, bail};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or no subcommand was given.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let (name, sub_m) = matches.subcommand().context("missing subcommand")?;

    // Global options are propagated, so read them where the user may have put them.
    let opts = client::Options::parse(sub_m)?;

    let mut globals = GlobalArgs::new(opts.url);
    globals.set_token(SecretString::from(opts.token));
    globals.auth_scheme = if opts.bearer {
        AuthScheme::Bearer
    } else {
        AuthScheme::Raw
    };
    globals.status_policy = if opts.permissive {
        StatusPolicy::Permissive
    } else {
        StatusPolicy::Strict
    };
    globals.timeout = opts.timeout;
    globals.retries = opts.retries;

    let id = |m: &clap::ArgMatches| -> Result<i32> {
        m.get_one::<i32>(session_cmd::ARG_ID)
            .copied()
            .context("missing required argument: id")
    };

    let action = match name {
        session_cmd::CMD_LOGIN => Action::Login(session::LoginArgs {
            name: required(sub_m, session_cmd::ARG_NAME)?,
            password: SecretString::from(required(sub_m, session_cmd::ARG_PASSWORD)?),
        }),
        session_cmd::CMD_LOGOUT => Action::Logout { id: id(sub_m)? },
        session_cmd::CMD_REFRESH => Action::Refresh(session::RefreshArgs {
            id: id(sub_m)?,
            refresh_token: SecretString::from(required(sub_m, session_cmd::ARG_REFRESH_TOKEN)?),
        }),
        users_cmd::CMD_USERS => Action::Users,
        users_cmd::CMD_USER => Action::User { id: id(sub_m)? },
        users_cmd::CMD_CREATE => Action::CreateUser(users::CreateArgs {
            name: required(sub_m, users_cmd::ARG_NAME)?,
            email: required(sub_m, users_cmd::ARG_EMAIL)?,
            password: SecretString::from(required(sub_m, users_cmd::ARG_PASSWORD)?),
        }),
        users_cmd::CMD_PING => Action::Ping,
        other => bail!("unknown subcommand: {other}"),
    };

    Ok((action, globals))
}
