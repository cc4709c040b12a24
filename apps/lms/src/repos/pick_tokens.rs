//! Pick token storage.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::pick_tokens_sea as tokens_adapter;
use crate::entities::pick_tokens;
use crate::errors::domain::{DomainError, NotFoundKind};

/// A single-use credential for one player's pick in one round.
#[derive(Clone, PartialEq)]
pub struct PickToken {
    pub id: i64,
    pub player_id: i64,
    pub round_id: i64,
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub used_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

// The token string is a credential; keep it out of Debug output.
impl std::fmt::Debug for PickToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickToken")
            .field("id", &self.id)
            .field("player_id", &self.player_id)
            .field("round_id", &self.round_id)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("used_at", &self.used_at)
            .finish()
    }
}

impl PickToken {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

pub async fn find_by_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token: &str,
) -> Result<Option<PickToken>, DomainError> {
    let found = tokens_adapter::find_by_token(conn, token).await?;
    Ok(found.map(PickToken::from))
}

pub async fn require_by_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token: &str,
) -> Result<PickToken, DomainError> {
    find_by_token(conn, token)
        .await?
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Token, "pick token not found"))
}

pub async fn find_by_player_and_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    round_id: i64,
) -> Result<Option<PickToken>, DomainError> {
    let found = tokens_adapter::find_by_player_and_round(conn, player_id, round_id).await?;
    Ok(found.map(PickToken::from))
}

pub async fn create_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    round_id: i64,
    token: String,
    expires_at: OffsetDateTime,
) -> Result<PickToken, DomainError> {
    let dto = tokens_adapter::PickTokenCreate {
        player_id,
        round_id,
        token,
        expires_at,
    };
    Ok(PickToken::from(tokens_adapter::create_token(conn, dto).await?))
}

pub async fn rotate_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token_id: i64,
    token: String,
    expires_at: OffsetDateTime,
) -> Result<PickToken, DomainError> {
    let dto = tokens_adapter::PickTokenRotate {
        id: token_id,
        token,
        expires_at,
    };
    Ok(PickToken::from(tokens_adapter::rotate_token(conn, dto).await?))
}

/// `false` if the token had already been consumed.
pub async fn mark_used<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token_id: i64,
    used_at: OffsetDateTime,
) -> Result<bool, DomainError> {
    Ok(tokens_adapter::mark_used(conn, token_id, used_at).await? == 1)
}

pub(crate) async fn delete_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<u64, DomainError> {
    Ok(tokens_adapter::delete_all(conn).await?)
}

impl From<pick_tokens::Model> for PickToken {
    fn from(model: pick_tokens::Model) -> Self {
        Self {
            id: model.id,
            player_id: model.player_id,
            round_id: model.round_id,
            token: model.token,
            expires_at: model.expires_at,
            used_at: model.used_at,
            created_at: model.created_at,
        }
    }
}
