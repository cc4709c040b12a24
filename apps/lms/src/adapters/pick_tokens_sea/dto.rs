//! DTOs for pick_tokens_sea adapter.

use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct PickTokenCreate {
    pub player_id: i64,
    pub round_id: i64,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Replace an expired token's string and expiry in place.
#[derive(Debug, Clone)]
pub struct PickTokenRotate {
    pub id: i64,
    pub token: String,
    pub expires_at: OffsetDateTime,
}
