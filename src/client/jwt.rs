//! Read-only view of JWT claims.
//!
//! Only the payload segment is decoded and the signature is never checked; the
//! backend is the one verifying tokens. The client only needs `exp` to avoid
//! sending a token it already knows has expired.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Deserialize)]
struct Claims {
    exp: Option<u64>,
}

/// Returns the `exp` claim (seconds since the epoch) of a compact JWT.
///
/// Returns `None` when `token` is not a three-segment JWT, the payload is not
/// base64url JSON, or the claim is absent.
#[must_use]
pub fn expires_at(token: &str) -> Option<u64> {
    let mut segments = token.trim().split('.');

    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let decoded = Base64UrlUnpadded::decode_vec(payload.trim_end_matches('=')).ok()?;

    serde_json::from_slice::<Claims>(&decoded).ok()?.exp
}

/// Current time in seconds since the epoch.
#[must_use]
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
