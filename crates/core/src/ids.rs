//! Identifier and token generation.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::clock;
use crate::types::RecordId;

/// Length of the random suffix appended to local ids.
const LOCAL_SUFFIX_LENGTH: usize = 6;

/// Length of generated password-reset tokens.
const RESET_TOKEN_LENGTH: usize = 40;

/// Id for a record in the local store: base-36 clock ticks plus a random suffix.
///
/// The clock is strictly monotonic, so ids are unique within a process
/// without any coordinating authority; the suffix keeps them apart across
/// processes writing the same store.
pub fn local_id() -> RecordId {
    let ticks = clock::now().timestamp_micros().unsigned_abs();
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(LOCAL_SUFFIX_LENGTH)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}{suffix}", to_base36(ticks))
}

/// Id for a row in the remote store (time-ordered UUID v7).
pub fn remote_id() -> RecordId {
    Uuid::now_v7().to_string()
}

/// Id for an activity that does not collide with any id in `existing`.
pub fn activity_id<'a>(existing: impl IntoIterator<Item = &'a str> + Clone) -> RecordId {
    loop {
        let candidate = format!("act_{}", local_id());
        if !existing.clone().into_iter().any(|id| id == candidate) {
            return candidate;
        }
    }
}

/// Public share token for a trip.
pub fn share_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Plaintext password-reset token. Only its digest is persisted.
pub fn reset_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// What `password_resets.token_hash` stores for a reset token: lowercase
/// hex SHA-256 of its text.
pub fn reset_token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
