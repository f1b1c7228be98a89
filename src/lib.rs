//! # userctl
//!
//! A client for the user-service API. The core is [`client::Invoker`], a stateless
//! request invoker: one call is one HTTP round trip that encodes an optional JSON
//! body, attaches the auth token and decodes the JSON response.
//!
//! [`api::Api`] wraps the invoker with one operation per backend endpoint
//! (login, user listing, session refresh, ...) and [`cli`] binds those operations
//! to subcommands of the `userctl` binary.
//!
//! Tokens come from a [`client::token::TokenProvider`]. The default is a fixed
//! token ([`client::token::StaticToken`]); [`client::token::SessionToken`] keeps
//! the tokens issued by login and replaces them on refresh.

pub mod api;
pub mod cli;
pub mod client;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
