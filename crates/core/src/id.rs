//! Record identifiers
//!
//! Ids are `"<unix millis>-<6 base36 chars>"`. They avoid collisions within a
//! single device but carry no global uniqueness guarantee.

use rand::Rng;

const SUFFIX_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

/// How many fresh ids a store tries before giving up on a collision.
const MAX_ID_ATTEMPTS: usize = 8;

/// Generate a new record id
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect();

    format!("{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// Generate an id that `taken` reports as unused
pub(crate) fn generate_unique_id(taken: impl Fn(&str) -> bool) -> Option<String> {
    (0..MAX_ID_ATTEMPTS)
        .map(|_| generate_id())
        .find(|id| !taken(id))
}
