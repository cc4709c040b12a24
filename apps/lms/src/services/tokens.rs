//! Pick token issuer.
//!
//! A token is bound to whatever round the resolver calls current at the
//! moment of issuance. Nothing is cached between calls, so a rollover between
//! two issuances is reflected in the second token automatically.

use sea_orm::DatabaseTransaction;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::config::competition::CompetitionConfig;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::pick_tokens::{self, PickToken};
use crate::repos::{picks, players};
use crate::services::lifecycle::RoundLifecycle;
use crate::utils::token_code::generate_token;

const MAX_TOKEN_ATTEMPTS: usize = 5;

/// Result of [`PickTokenIssuer::issue`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenIssue {
    /// A new token was stored (or an expired one rotated).
    Minted(PickToken),
    /// The player already holds a live token for the current round.
    Reused(PickToken),
}

impl TokenIssue {
    pub fn token(&self) -> &PickToken {
        match self {
            TokenIssue::Minted(t) | TokenIssue::Reused(t) => t,
        }
    }

    pub fn into_token(self) -> PickToken {
        match self {
            TokenIssue::Minted(t) | TokenIssue::Reused(t) => t,
        }
    }

    pub fn is_minted(&self) -> bool {
        matches!(self, TokenIssue::Minted(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PickTokenIssuer {
    ttl: Duration,
}

impl PickTokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn from_config(config: &CompetitionConfig) -> Self {
        Self::new(config.token_ttl)
    }

    pub async fn issue(
        &self,
        txn: &DatabaseTransaction,
        player_id: i64,
    ) -> Result<TokenIssue, AppError> {
        self.issue_at(txn, player_id, OffsetDateTime::now_utc()).await
    }

    /// Issue a token for the current round as of `now`.
    pub async fn issue_at(
        &self,
        txn: &DatabaseTransaction,
        player_id: i64,
        now: OffsetDateTime,
    ) -> Result<TokenIssue, AppError> {
        let round = RoundLifecycle
            .lock_and_current(txn)
            .await?
            .ok_or_else(|| {
                DomainError::validation(ValidationKind::NoActiveRound, "No round is currently open")
            })?;

        let player = players::require_player(txn, player_id).await?;
        if !player.is_active() {
            return Err(DomainError::validation(
                ValidationKind::PlayerNotActive,
                format!("player {player_id} is {:?}", player.status),
            )
            .into());
        }

        if picks::find_by_player_and_round(txn, player_id, round.id)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyPicked,
                "Player already picked for this round",
            )
            .into());
        }

        let expires_at = now + self.ttl;
        match pick_tokens::find_by_player_and_round(txn, player_id, round.id).await? {
            Some(existing) if existing.is_used() => Err(DomainError::conflict(
                ConflictKind::AlreadyPicked,
                "Player already used their token for this round",
            )
            .into()),
            Some(existing) if !existing.is_expired(now) => {
                debug!(player_id, round_id = round.id, "reusing live pick token");
                Ok(TokenIssue::Reused(existing))
            }
            Some(expired) => {
                let code = unused_code(txn).await?;
                let token = pick_tokens::rotate_token(txn, expired.id, code, expires_at).await?;
                info!(player_id, round_id = round.id, "rotated expired pick token");
                Ok(TokenIssue::Minted(token))
            }
            None => {
                let code = unused_code(txn).await?;
                let token =
                    pick_tokens::create_token(txn, player_id, round.id, code, expires_at).await?;
                info!(
                    player_id,
                    round_id = round.id,
                    cycle_number = round.cycle_number,
                    "pick token minted"
                );
                Ok(TokenIssue::Minted(token))
            }
        }
    }
}

/// A fresh token string not already stored. Checked up front: a failed
/// insert would abort the surrounding Postgres transaction.
async fn unused_code(txn: &DatabaseTransaction) -> Result<String, AppError> {
    for _ in 0..MAX_TOKEN_ATTEMPTS {
        let code = generate_token();
        if pick_tokens::find_by_token(txn, &code).await?.is_none() {
            return Ok(code);
        }
    }
    Err(AppError::internal("could not generate a unique pick token"))
}
