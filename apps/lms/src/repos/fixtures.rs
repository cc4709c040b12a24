//! Fixtures attached to a round, and their results.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::fixtures_sea as fixtures_adapter;
use crate::adapters::rounds_sea as rounds_adapter;
use crate::domain::{same_team, FixtureOutcome};
use crate::entities::fixtures::{self, FixtureResult};
use crate::entities::rounds::RoundStatus;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: i64,
    pub round_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub kickoff_at: Option<OffsetDateTime>,
    pub result: Option<FixtureOutcome>,
    pub result_recorded_at: Option<OffsetDateTime>,
}

impl Fixture {
    /// Canonical team name if `selection` names either side.
    pub fn team_named(&self, selection: &str) -> Option<&str> {
        [self.home_team.as_str(), self.away_team.as_str()]
            .into_iter()
            .find(|team| same_team(team, selection))
    }
}

#[derive(Debug, Clone)]
pub struct NewFixture {
    pub home_team: String,
    pub away_team: String,
    pub kickoff_at: Option<OffsetDateTime>,
}

impl NewFixture {
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            kickoff_at: None,
        }
    }

    pub fn with_kickoff(mut self, kickoff_at: OffsetDateTime) -> Self {
        self.kickoff_at = Some(kickoff_at);
        self
    }
}

/// Attach fixtures to a round that has not completed.
pub async fn add_fixtures<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    new_fixtures: Vec<NewFixture>,
) -> Result<Vec<Fixture>, DomainError> {
    let round = rounds_adapter::require_round(conn, round_id).await?;
    if round.status == RoundStatus::Completed {
        return Err(DomainError::validation(
            ValidationKind::InvalidTransition,
            format!("round {round_id} is completed; fixtures are frozen"),
        ));
    }

    let mut created = Vec::with_capacity(new_fixtures.len());
    for nf in new_fixtures {
        let home_team = nf.home_team.trim().to_string();
        let away_team = nf.away_team.trim().to_string();
        if home_team.is_empty() || away_team.is_empty() || same_team(&home_team, &away_team) {
            return Err(DomainError::validation(
                ValidationKind::Other("INVALID_FIXTURE".into()),
                "A fixture needs two distinct, non-empty teams",
            ));
        }
        let dto = fixtures_adapter::FixtureCreate {
            round_id,
            home_team,
            away_team,
            kickoff_at: nf.kickoff_at,
        };
        created.push(Fixture::from(fixtures_adapter::create_fixture(conn, dto).await?));
    }
    Ok(created)
}

pub async fn require_fixture<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    fixture_id: i64,
) -> Result<Fixture, DomainError> {
    let fixture = fixtures_adapter::require_fixture(conn, fixture_id).await?;
    Ok(Fixture::from(fixture))
}

pub async fn find_all_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<Fixture>, DomainError> {
    let fixtures = fixtures_adapter::find_all_by_round(conn, round_id).await?;
    Ok(fixtures.into_iter().map(Fixture::from).collect())
}

/// Record a fixture's final result.
///
/// The winner must be one of the fixture's teams. Re-recording the same
/// result is a no-op; a different result is rejected.
pub async fn record_result<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    fixture_id: i64,
    outcome: &FixtureOutcome,
) -> Result<Fixture, DomainError> {
    let fixture = require_fixture(conn, fixture_id).await?;

    let result = match outcome {
        FixtureOutcome::Draw => FixtureResult::Draw,
        FixtureOutcome::Winner(team) if same_team(team, &fixture.home_team) => {
            FixtureResult::HomeWin
        }
        FixtureOutcome::Winner(team) if same_team(team, &fixture.away_team) => {
            FixtureResult::AwayWin
        }
        FixtureOutcome::Winner(team) => {
            return Err(DomainError::validation(
                ValidationKind::InvalidResult,
                format!("'{team}' does not play in fixture {fixture_id}"),
            ))
        }
    };

    if let Some(existing) = &fixture.result {
        if outcome_matches(existing, outcome) {
            return Ok(fixture);
        }
        return Err(DomainError::validation(
            ValidationKind::InvalidResult,
            format!("fixture {fixture_id} already has a different result"),
        ));
    }

    let dto = fixtures_adapter::FixtureSetResult { fixture_id, result };
    let updated = fixtures_adapter::set_result(conn, dto).await?;
    Ok(Fixture::from(updated))
}

fn outcome_matches(a: &FixtureOutcome, b: &FixtureOutcome) -> bool {
    match (a, b) {
        (FixtureOutcome::Draw, FixtureOutcome::Draw) => true,
        (FixtureOutcome::Winner(x), FixtureOutcome::Winner(y)) => same_team(x, y),
        _ => false,
    }
}

/// Remove every fixture. Picks must be gone first.
pub(crate) async fn delete_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<u64, DomainError> {
    Ok(fixtures_adapter::delete_all(conn).await?)
}

impl From<fixtures::Model> for Fixture {
    fn from(model: fixtures::Model) -> Self {
        let result = model.result.map(|r| match r {
            FixtureResult::HomeWin => FixtureOutcome::Winner(model.home_team.clone()),
            FixtureResult::AwayWin => FixtureOutcome::Winner(model.away_team.clone()),
            FixtureResult::Draw => FixtureOutcome::Draw,
        });
        Self {
            id: model.id,
            round_id: model.round_id,
            home_team: model.home_team,
            away_team: model.away_team,
            kickoff_at: model.kickoff_at,
            result,
            result_recorded_at: model.result_recorded_at,
        }
    }
}
