//! Unique test data so suites sharing a database never collide.

use ulid::Ulid;

/// `{prefix}-{ulid}`
///
/// ```
/// use lms_test_support::unique_helpers::unique_str;
///
/// let a = unique_str("player");
/// assert_ne!(a, unique_str("player"));
/// assert!(a.starts_with("player-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{prefix}-{}", Ulid::new())
}

/// A display name for a test player.
pub fn unique_player_name(prefix: &str) -> String {
    unique_str(&format!("{prefix} player"))
}

/// A contact string in the shape of a phone number, unique per call.
pub fn unique_contact() -> String {
    let ulid = Ulid::new().to_string();
    let digits: String = ulid
        .bytes()
        .rev()
        .take(9)
        .map(|b| char::from(b'0' + b % 10))
        .collect();
    format!("+447{digits}")
}
