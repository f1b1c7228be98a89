use clap::{Arg, ArgMatches, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_REFRESH: &str = "refresh";

pub const ARG_NAME: &str = "name";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_ID: &str = "id";
pub const ARG_REFRESH_TOKEN: &str = "refresh-token";

#[must_use]
pub fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Log in and print the issued tokens")
        .arg(
            Arg::new(ARG_NAME)
                .short('n')
                .long(ARG_NAME)
                .help("User name")
                .env("USERCTL_NAME")
                .default_value("miguel"),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long(ARG_PASSWORD)
                .help("Password")
                .env("USERCTL_PASSWORD")
                .default_value("123")
                .hide_default_value(true)
                .hide_env_values(true),
        )
}

#[must_use]
pub fn logout() -> Command {
    Command::new(CMD_LOGOUT)
        .about("End the session of a user")
        .arg(
            Arg::new(ARG_ID)
                .help("User id")
                .required(true)
                .value_parser(clap::value_parser!(i32)),
        )
}

#[must_use]
pub fn refresh() -> Command {
    Command::new(CMD_REFRESH)
        .about("Exchange a refresh token for a new token pair")
        .arg(
            Arg::new(ARG_ID)
                .long(ARG_ID)
                .help("User id")
                .required(true)
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN)
                .long(ARG_REFRESH_TOKEN)
                .help("Refresh token issued at login")
                .env("USERCTL_REFRESH_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
}

/// Read a required string argument, treating an empty value as missing.
/// # Errors
/// Returns an error if the argument is absent or empty.
pub fn required(matches: &ArgMatches, id: &str) -> anyhow::Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
}
