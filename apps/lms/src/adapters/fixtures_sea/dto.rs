//! DTOs for fixtures_sea adapter.

use time::OffsetDateTime;

use crate::entities::fixtures::FixtureResult;

#[derive(Debug, Clone)]
pub struct FixtureCreate {
    pub round_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub kickoff_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy)]
pub struct FixtureSetResult {
    pub fixture_id: i64,
    pub result: FixtureResult,
}
