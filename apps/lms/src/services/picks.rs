//! Pick submission through a pick token.

use sea_orm::DatabaseTransaction;
use time::OffsetDateTime;
use tracing::info;

use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::picks::{self, Pick};
use crate::repos::{pick_tokens, players};
use crate::services::lifecycle::RoundLifecycle;
use crate::services::selections::validate_selection;

#[derive(Debug, Default, Clone, Copy)]
pub struct PickService;

impl PickService {
    pub async fn submit_pick(
        &self,
        txn: &DatabaseTransaction,
        token: &str,
        selection: &str,
    ) -> Result<Pick, AppError> {
        self.submit_pick_at(txn, token, selection, OffsetDateTime::now_utc())
            .await
    }

    /// Record a pick and consume its token.
    pub async fn submit_pick_at(
        &self,
        txn: &DatabaseTransaction,
        token: &str,
        selection: &str,
        now: OffsetDateTime,
    ) -> Result<Pick, AppError> {
        let token = pick_tokens::require_by_token(txn, token.trim()).await?;
        if token.is_used() {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyPicked,
                "This pick link has already been used",
            )
            .into());
        }
        if token.is_expired(now) {
            return Err(
                DomainError::validation(ValidationKind::TokenExpired, "Pick link has expired")
                    .into(),
            );
        }

        let round = RoundLifecycle.lock_and_current(txn).await?.ok_or_else(|| {
            DomainError::validation(ValidationKind::NoActiveRound, "No round is currently open")
        })?;
        if token.round_id != round.id {
            return Err(DomainError::validation(
                ValidationKind::TokenStale,
                format!(
                    "token is for round {}, current round is {}",
                    token.round_id, round.id
                ),
            )
            .into());
        }

        let player = players::require_player(txn, token.player_id).await?;
        if !player.is_active() {
            return Err(DomainError::validation(
                ValidationKind::PlayerNotActive,
                format!("player {} is {:?}", player.id, player.status),
            )
            .into());
        }

        if let Some(deadline) = round.first_kickoff_at {
            if now >= deadline {
                return Err(DomainError::validation(
                    ValidationKind::DeadlinePassed,
                    "Picks closed at the first kickoff",
                )
                .into());
            }
        }

        let valid = validate_selection(txn, player.id, &round, selection).await?;
        let pick = picks::create_pick(txn, player.id, round.id, valid.fixture_id, &valid.team).await?;
        if !pick_tokens::mark_used(txn, token.id, now).await? {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyPicked,
                "This pick link has already been used",
            )
            .into());
        }

        info!(
            player_id = player.id,
            round_id = round.id,
            fixture_id = valid.fixture_id,
            "pick recorded"
        );
        Ok(pick)
    }
}
