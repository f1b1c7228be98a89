use clap::{Arg, Command};

pub const CMD_USERS: &str = "users";
pub const CMD_USER: &str = "user";
pub const CMD_CREATE: &str = "create";
pub const CMD_PING: &str = "ping";

pub const ARG_ID: &str = "id";
pub const ARG_NAME: &str = "name";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn users() -> Command {
    Command::new(CMD_USERS).about("List all users")
}

#[must_use]
pub fn user() -> Command {
    Command::new(CMD_USER).about("Show one user").arg(
        Arg::new(ARG_ID)
            .help("User id")
            .required(true)
            .value_parser(clap::value_parser!(i32)),
    )
}

#[must_use]
pub fn create() -> Command {
    Command::new(CMD_CREATE)
        .about("Register a new user")
        .arg(
            Arg::new(ARG_NAME)
                .short('n')
                .long(ARG_NAME)
                .help("User name")
                .required(true),
        )
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long(ARG_EMAIL)
                .help("Email address")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long(ARG_PASSWORD)
                .help("Password")
                .env("USERCTL_NEW_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

#[must_use]
pub fn ping() -> Command {
    Command::new(CMD_PING).about("Check that the user service is up")
}
