//! DTOs for picks_sea adapter.

use crate::entities::picks::PickOutcome;

#[derive(Debug, Clone)]
pub struct PickCreate {
    pub player_id: i64,
    pub round_id: i64,
    pub fixture_id: i64,
    pub selection: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PickSetOutcome {
    pub pick_id: i64,
    pub outcome: PickOutcome,
}
