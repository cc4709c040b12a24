//! DTOs for rounds_sea adapter.

use time::OffsetDateTime;

/// A new round; always stored as pending.
#[derive(Debug, Clone)]
pub struct RoundCreate {
    pub cycle_number: i32,
    pub round_number: i32,
    pub first_kickoff_at: Option<OffsetDateTime>,
}
