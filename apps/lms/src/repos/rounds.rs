//! Round repository functions for domain layer (generic over ConnectionTrait).
//!
//! Reads by id and history only. Queries by status belong to the lifecycle service.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::rounds_sea as rounds_adapter;
use crate::domain::ActiveCandidate;
use crate::entities::rounds;
use crate::errors::domain::DomainError;

/// Round domain model
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub id: i64,
    pub cycle_number: i32,
    pub round_number: i32,
    pub status: RoundStatus,
    pub first_kickoff_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub activated_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    Pending,
    Active,
    Completed,
}

impl ActiveCandidate for Round {
    fn id(&self) -> i64 {
        self.id
    }

    fn cycle_number(&self) -> i32 {
        self.cycle_number
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Option<Round>, DomainError> {
    let round = rounds_adapter::find_by_id(conn, round_id).await?;
    Ok(round.map(Round::from))
}

pub async fn require_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Round, DomainError> {
    let round = rounds_adapter::require_round(conn, round_id).await?;
    Ok(Round::from(round))
}

/// Create a pending round; `(cycle_number, round_number)` must be free.
pub async fn create_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cycle_number: i32,
    round_number: i32,
    first_kickoff_at: Option<OffsetDateTime>,
) -> Result<Round, DomainError> {
    let dto = rounds_adapter::RoundCreate {
        cycle_number,
        round_number,
        first_kickoff_at,
    };
    let round = rounds_adapter::create_round(conn, dto).await?;
    Ok(Round::from(round))
}

/// All rounds (or one cycle's rounds) ordered by cycle, then round number.
pub async fn list_history<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cycle_number: Option<i32>,
) -> Result<Vec<Round>, DomainError> {
    let rounds = rounds_adapter::find_history(conn, cycle_number).await?;
    Ok(rounds.into_iter().map(Round::from).collect())
}

pub async fn latest_cycle_number<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Option<i32>, DomainError> {
    Ok(rounds_adapter::latest_cycle_number(conn).await?)
}

pub async fn max_round_number_in_cycle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cycle_number: i32,
) -> Result<Option<i32>, DomainError> {
    Ok(rounds_adapter::max_round_number(conn, cycle_number).await?)
}

/// Remove every round. Rows referencing rounds must be gone first.
pub(crate) async fn delete_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<u64, DomainError> {
    Ok(rounds_adapter::delete_all(conn).await?)
}

// Conversions between SeaORM models and domain models

impl From<rounds::Model> for Round {
    fn from(model: rounds::Model) -> Self {
        Self {
            id: model.id,
            cycle_number: model.cycle_number,
            round_number: model.round_number,
            status: model.status.into(),
            first_kickoff_at: model.first_kickoff_at,
            created_at: model.created_at,
            activated_at: model.activated_at,
            completed_at: model.completed_at,
        }
    }
}

impl From<rounds::RoundStatus> for RoundStatus {
    fn from(status: rounds::RoundStatus) -> Self {
        match status {
            rounds::RoundStatus::Pending => RoundStatus::Pending,
            rounds::RoundStatus::Active => RoundStatus::Active,
            rounds::RoundStatus::Completed => RoundStatus::Completed,
        }
    }
}
