use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, SeedableRng, distr::Alphanumeric, rngs::StdRng, seq::index};
use sha2::{Digest, Sha256};

use crate::error::PipelineError;

/// Random alphanumeric token, used for session keys and the OAuth `state`.
pub fn generate_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Digest of a refresh token as carried by the remember cookie.
pub fn credential_digest(refresh_token: &str) -> String {
    let hash = Sha256::digest(refresh_token.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Compares two strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Picks `k` distinct indices from `[0, track_count)`, sorted ascending.
///
/// The generator is seeded from the operating system on every call, so two
/// samples taken by the same process are unrelated.
///
/// # Errors
///
/// Returns [`PipelineError::Input`] when `k` exceeds `track_count`; callers
/// clamp the configured sample size to the playlist size first.
pub fn sample_indices(track_count: usize, k: usize) -> Result<Vec<usize>, PipelineError> {
    if k > track_count {
        return Err(PipelineError::input(format!(
            "cannot sample {} tracks from a playlist of {}",
            k, track_count
        )));
    }

    let mut rng = StdRng::from_os_rng();
    let mut picked = index::sample(&mut rng, track_count, k).into_vec();
    picked.sort_unstable();
    Ok(picked)
}
