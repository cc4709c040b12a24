//! Pick repository functions.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::picks_sea as picks_adapter;
use crate::entities::picks;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub id: i64,
    pub player_id: i64,
    pub round_id: i64,
    pub fixture_id: i64,
    pub selection: String,
    pub outcome: PickOutcome,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Pending,
    Won,
    Lost,
}

pub async fn create_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    round_id: i64,
    fixture_id: i64,
    selection: &str,
) -> Result<Pick, DomainError> {
    let dto = picks_adapter::PickCreate {
        player_id,
        round_id,
        fixture_id,
        selection: selection.to_string(),
    };
    let pick = picks_adapter::create_pick(conn, dto).await?;
    Ok(Pick::from(pick))
}

pub async fn find_by_player_and_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    round_id: i64,
) -> Result<Option<Pick>, DomainError> {
    let pick = picks_adapter::find_by_player_and_round(conn, player_id, round_id).await?;
    Ok(pick.map(Pick::from))
}

pub async fn find_all_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<Pick>, DomainError> {
    let picks = picks_adapter::find_all_by_round(conn, round_id).await?;
    Ok(picks.into_iter().map(Pick::from).collect())
}

pub async fn count_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<u64, DomainError> {
    Ok(picks_adapter::count_by_round(conn, round_id).await?)
}

/// Teams the player already backed in other rounds of the cycle.
pub async fn selections_in_cycle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    cycle_number: i32,
    excluding_round_id: i64,
) -> Result<Vec<String>, DomainError> {
    Ok(
        picks_adapter::selections_in_cycle(conn, player_id, cycle_number, excluding_round_id)
            .await?,
    )
}

pub async fn set_outcome<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    pick_id: i64,
    outcome: PickOutcome,
) -> Result<(), DomainError> {
    let dto = picks_adapter::PickSetOutcome {
        pick_id,
        outcome: outcome.into(),
    };
    picks_adapter::set_outcome(conn, dto).await?;
    Ok(())
}

pub(crate) async fn delete_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<u64, DomainError> {
    Ok(picks_adapter::delete_all(conn).await?)
}

impl From<picks::Model> for Pick {
    fn from(model: picks::Model) -> Self {
        Self {
            id: model.id,
            player_id: model.player_id,
            round_id: model.round_id,
            fixture_id: model.fixture_id,
            selection: model.selection,
            outcome: model.outcome.into(),
            created_at: model.created_at,
        }
    }
}

impl From<picks::PickOutcome> for PickOutcome {
    fn from(outcome: picks::PickOutcome) -> Self {
        match outcome {
            picks::PickOutcome::Pending => PickOutcome::Pending,
            picks::PickOutcome::Won => PickOutcome::Won,
            picks::PickOutcome::Lost => PickOutcome::Lost,
        }
    }
}

impl From<PickOutcome> for picks::PickOutcome {
    fn from(outcome: PickOutcome) -> Self {
        match outcome {
            PickOutcome::Pending => picks::PickOutcome::Pending,
            PickOutcome::Won => picks::PickOutcome::Won,
            PickOutcome::Lost => picks::PickOutcome::Lost,
        }
    }
}
