//! Player registry.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::info;

use crate::adapters::players_sea as players_adapter;
use crate::adapters::rounds_sea as rounds_adapter;
use crate::entities::players;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::logging::pii::Redacted;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub contact: Option<String>,
    pub status: PlayerStatus,
    pub eliminated_round_id: Option<i64>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Active,
    Eliminated,
    Winner,
}

impl Player {
    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Active
    }
}

/// Register a player. The name is trimmed and must not be empty.
pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
    contact: Option<&str>,
) -> Result<Player, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::Other("EMPTY_NAME".into()),
            "Player name must not be empty",
        ));
    }
    let contact = contact.map(str::trim).filter(|c| !c.is_empty());

    let dto = players_adapter::PlayerCreate {
        name: name.to_string(),
        contact: contact.map(str::to_string),
    };
    let player = players_adapter::create_player(conn, dto).await?;
    info!(
        player_id = player.id,
        name = %Redacted(&player.name),
        contact = ?player.contact.as_deref().map(Redacted),
        "player registered"
    );
    Ok(Player::from(player))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Option<Player>, DomainError> {
    let player = players_adapter::find_by_id(conn, player_id).await?;
    Ok(player.map(Player::from))
}

pub async fn require_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Player, DomainError> {
    let player = players_adapter::require_player(conn, player_id).await?;
    Ok(Player::from(player))
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<Player>, DomainError> {
    let players = players_adapter::list_all(conn).await?;
    Ok(players.into_iter().map(Player::from).collect())
}

pub async fn list_by_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: PlayerStatus,
) -> Result<Vec<Player>, DomainError> {
    let players = players_adapter::list_by_status(conn, status.into()).await?;
    Ok(players.into_iter().map(Player::from).collect())
}

pub async fn count_by_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: PlayerStatus,
) -> Result<u64, DomainError> {
    Ok(players_adapter::count_by_status(conn, status.into()).await?)
}

pub async fn active_player_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, DomainError> {
    Ok(players_adapter::ids_by_status(conn, players::PlayerStatus::Active).await?)
}

/// Knock out still-active players in `round_id`. Returns how many changed.
pub async fn eliminate<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_ids: &[i64],
    round_id: i64,
) -> Result<u64, DomainError> {
    Ok(players_adapter::eliminate(conn, player_ids, round_id).await?)
}

/// Reinstate every player knocked out in a round of `cycle_number`.
pub async fn reinstate_eliminated_in_cycle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cycle_number: i32,
) -> Result<Vec<i64>, DomainError> {
    let round_ids: Vec<i64> = rounds_adapter::find_history(conn, Some(cycle_number))
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    let player_ids = players_adapter::eliminated_in_rounds(conn, &round_ids).await?;
    players_adapter::reinstate(conn, &player_ids).await?;
    Ok(player_ids)
}

/// Reinstate every eliminated player and every winner.
pub async fn reinstate_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, DomainError> {
    let mut player_ids =
        players_adapter::ids_by_status(conn, players::PlayerStatus::Eliminated).await?;
    player_ids.extend(players_adapter::ids_by_status(conn, players::PlayerStatus::Winner).await?);
    player_ids.sort_unstable();
    players_adapter::reinstate(conn, &player_ids).await?;
    Ok(player_ids)
}

pub async fn mark_winner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Player, DomainError> {
    let player = players_adapter::mark_winner(conn, player_id).await?;
    Ok(Player::from(player))
}

impl From<players::Model> for Player {
    fn from(model: players::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact: model.contact,
            status: model.status.into(),
            eliminated_round_id: model.eliminated_round_id,
            created_at: model.created_at,
        }
    }
}

impl From<players::PlayerStatus> for PlayerStatus {
    fn from(status: players::PlayerStatus) -> Self {
        match status {
            players::PlayerStatus::Active => PlayerStatus::Active,
            players::PlayerStatus::Eliminated => PlayerStatus::Eliminated,
            players::PlayerStatus::Winner => PlayerStatus::Winner,
        }
    }
}

impl From<PlayerStatus> for players::PlayerStatus {
    fn from(status: PlayerStatus) -> Self {
        match status {
            PlayerStatus::Active => players::PlayerStatus::Active,
            PlayerStatus::Eliminated => players::PlayerStatus::Eliminated,
            PlayerStatus::Winner => players::PlayerStatus::Winner,
        }
    }
}
