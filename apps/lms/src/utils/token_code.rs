//! Pick token string generation.
//!
//! Tokens are 32 characters from `[A-Za-z0-9]`, drawn from the thread-local
//! CSPRNG. They end up in links sent to players, so only URL-safe characters.

use rand::distr::Alphanumeric;
use rand::Rng;

pub const TOKEN_LEN: usize = 32;

/// Generate a fresh pick token string.
///
/// # Example
/// ```
/// use lms::utils::token_code::{generate_token, TOKEN_LEN};
///
/// let token = generate_token();
/// assert_eq!(token.len(), TOKEN_LEN);
/// assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
