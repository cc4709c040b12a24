//! Round lifecycle controller.
//!
//! The single owner of round status. Consumers ask [`RoundLifecycle::current_round`]
//! for "the" round; nothing else may look at which rounds are flagged active.
//! Every status change first takes the competition lock so concurrent
//! controllers serialize and re-resolve after acquiring it.

mod status_store;

use sea_orm::DatabaseTransaction;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::domain::{resolve, Resolution};
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::repos::fixtures::{self, NewFixture};
use crate::repos::players::{self, PlayerStatus};
use crate::repos::rounds::{self, Round, RoundStatus};
use crate::repos::{pick_tokens, picks, reminders};

/// How a resolved round was closed.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundClosure {
    /// At least two players survive; the cycle continues.
    Completed { round_id: i64 },
    /// Nobody picked. No rollover; the admin decides what happens next.
    EmptyRoundCompleted { round_id: i64 },
    /// Exactly one player survives and is declared winner.
    CycleWon { round_id: i64, winner_id: i64 },
    /// Every remaining player went out: players reinstated, next cycle opened.
    RolledOver {
        completed_round_id: i64,
        reinstated: Vec<i64>,
        new_round: Round,
    },
}

impl RoundClosure {
    pub fn round_id(&self) -> i64 {
        match self {
            RoundClosure::Completed { round_id }
            | RoundClosure::EmptyRoundCompleted { round_id }
            | RoundClosure::CycleWon { round_id, .. } => *round_id,
            RoundClosure::RolledOver {
                completed_round_id, ..
            } => *completed_round_id,
        }
    }
}

/// What [`RoundLifecycle::reset_competition`] removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionReset {
    pub rounds_deleted: u64,
    pub fixtures_deleted: u64,
    pub picks_deleted: u64,
    /// Eliminated players and winners set back to active.
    pub reinstated: Vec<i64>,
}

/// A round to append to the latest cycle.
#[derive(Debug, Clone, Default)]
pub struct NewRound {
    /// Pick deadline. Defaults to the earliest fixture kickoff.
    pub first_kickoff_at: Option<OffsetDateTime>,
    pub fixtures: Vec<NewFixture>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RoundLifecycle;

impl RoundLifecycle {
    /// The canonical current round, or `None` when no round is open.
    ///
    /// If several rounds are flagged active the stale ones are completed in
    /// this transaction before returning; callers never see the conflict.
    ///
    /// The competition lock is taken before the first read. On SQLite a
    /// transaction that has read cannot later upgrade to a write while
    /// another reader holds the database, so healing must start as a writer.
    pub async fn current_round(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<Option<Round>, AppError> {
        self.lock_and_current(txn).await
    }

    /// Take the competition lock, then resolve. For writers whose decision
    /// depends on the current round (token issuance, pick submission).
    pub(crate) async fn lock_and_current(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<Option<Round>, AppError> {
        status_store::lock_competition(txn).await?;
        self.resolve_and_heal(txn).await
    }

    async fn resolve_and_heal(&self, txn: &DatabaseTransaction) -> Result<Option<Round>, AppError> {
        let Resolution { current, stale } = resolve(status_store::find_active(txn).await?);
        if !stale.is_empty() {
            let stale_ids: Vec<i64> = stale.iter().map(|r| r.id).collect();
            warn!(
                event = "MultipleActiveRoundsDetected",
                current_round_id = current.as_ref().map(|r| r.id),
                current_cycle = current.as_ref().map(|r| r.cycle_number),
                stale_round_ids = ?stale_ids,
                "demoting stale active rounds"
            );
            status_store::mark_completed(txn, &stale_ids).await?;
        }
        Ok(current)
    }

    /// pending -> active, completing every other active round first.
    pub async fn activate(
        &self,
        txn: &DatabaseTransaction,
        round_id: i64,
    ) -> Result<Round, AppError> {
        status_store::lock_competition(txn).await?;

        let round = rounds::require_round(txn, round_id).await?;
        if round.status != RoundStatus::Pending {
            return Err(DomainError::validation(
                ValidationKind::InvalidTransition,
                format!(
                    "round {round_id} is {:?}, only pending rounds can be activated",
                    round.status
                ),
            )
            .into());
        }
        if let Some(latest) = status_store::latest_played_cycle(txn).await? {
            if round.cycle_number < latest {
                return Err(DomainError::validation(
                    ValidationKind::InvalidTransition,
                    format!(
                        "round {round_id} belongs to cycle {} but cycle {latest} has already started",
                        round.cycle_number
                    ),
                )
                .into());
            }
        }

        let others: Vec<i64> = status_store::find_active(txn)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if !others.is_empty() {
            info!(round_id, superseded = ?others, "completing superseded rounds");
            status_store::mark_completed(txn, &others).await?;
        }

        if status_store::mark_active(txn, round_id).await? != 1 {
            return Err(DomainError::validation(
                ValidationKind::InvalidTransition,
                format!("round {round_id} is no longer pending"),
            )
            .into());
        }

        info!(
            round_id,
            cycle_number = round.cycle_number,
            round_number = round.round_number,
            "round activated"
        );
        Ok(rounds::require_round(txn, round_id).await?)
    }

    /// Close a round whose results are complete.
    ///
    /// No survivors rolls the competition into the next cycle, one survivor
    /// wins it, more than one simply completes the round.
    pub async fn detect_and_trigger_rollover(
        &self,
        txn: &DatabaseTransaction,
        round_id: i64,
    ) -> Result<RoundClosure, AppError> {
        status_store::lock_competition(txn).await?;

        let round = rounds::require_round(txn, round_id).await?;
        if round.status != RoundStatus::Active {
            return Err(DomainError::validation(
                ValidationKind::InvalidTransition,
                format!(
                    "round {round_id} is {:?}, only the active round can close",
                    round.status
                ),
            )
            .into());
        }

        if picks::count_by_round(txn, round_id).await? == 0 {
            status_store::mark_completed(txn, &[round_id]).await?;
            info!(round_id, cycle_number = round.cycle_number, "round completed with no picks");
            return Ok(RoundClosure::EmptyRoundCompleted { round_id });
        }

        let survivors = players::active_player_ids(txn).await?;
        match survivors.as_slice() {
            [] => self.roll_over(txn, &round).await,
            [winner_id] => {
                players::mark_winner(txn, *winner_id).await?;
                status_store::mark_completed(txn, &[round_id]).await?;
                info!(
                    round_id,
                    cycle_number = round.cycle_number,
                    player_id = *winner_id,
                    "cycle won"
                );
                Ok(RoundClosure::CycleWon {
                    round_id,
                    winner_id: *winner_id,
                })
            }
            _ => {
                status_store::mark_completed(txn, &[round_id]).await?;
                info!(
                    round_id,
                    cycle_number = round.cycle_number,
                    survivors = survivors.len(),
                    "round completed"
                );
                Ok(RoundClosure::Completed { round_id })
            }
        }
    }

    async fn roll_over(
        &self,
        txn: &DatabaseTransaction,
        round: &Round,
    ) -> Result<RoundClosure, AppError> {
        status_store::mark_completed(txn, &[round.id]).await?;
        let reinstated = players::reinstate_eliminated_in_cycle(txn, round.cycle_number).await?;

        let next_cycle = round.cycle_number + 1;
        let pending = rounds::create_round(txn, next_cycle, 1, None).await?;
        let new_round = self.activate(txn, pending.id).await?;

        info!(
            completed_round_id = round.id,
            cycle_number = next_cycle,
            new_round_id = new_round.id,
            reinstated = reinstated.len(),
            "rollover: all players eliminated, new cycle started"
        );
        Ok(RoundClosure::RolledOver {
            completed_round_id: round.id,
            reinstated,
            new_round,
        })
    }

    /// Append a pending round (with fixtures) to the latest cycle.
    pub async fn create_next_round(
        &self,
        txn: &DatabaseTransaction,
        new_round: NewRound,
    ) -> Result<Round, AppError> {
        status_store::lock_competition(txn).await?;

        if players::count_by_status(txn, PlayerStatus::Winner).await? > 0 {
            return Err(DomainError::validation(
                ValidationKind::InvalidTransition,
                "the cycle has a winner; start the next cycle first",
            )
            .into());
        }

        let cycle_number = rounds::latest_cycle_number(txn).await?.unwrap_or(1);
        let round_number = rounds::max_round_number_in_cycle(txn, cycle_number)
            .await?
            .map_or(1, |n| n + 1);
        let first_kickoff_at = new_round
            .first_kickoff_at
            .or_else(|| new_round.fixtures.iter().filter_map(|f| f.kickoff_at).min());

        let round = rounds::create_round(txn, cycle_number, round_number, first_kickoff_at).await?;
        let fixture_count = new_round.fixtures.len();
        fixtures::add_fixtures(txn, round.id, new_round.fixtures).await?;

        info!(
            round_id = round.id,
            cycle_number,
            round_number,
            fixtures = fixture_count,
            "round created"
        );
        Ok(round)
    }

    /// Open the next cycle after a cycle has been won (or emptied).
    pub async fn start_next_cycle(&self, txn: &DatabaseTransaction) -> Result<Round, AppError> {
        status_store::lock_competition(txn).await?;

        if let Some(current) = self.resolve_and_heal(txn).await? {
            return Err(DomainError::validation(
                ValidationKind::CycleInProgress,
                format!("round {} is still active", current.id),
            )
            .into());
        }
        let winners = players::count_by_status(txn, PlayerStatus::Winner).await?;
        let active = players::count_by_status(txn, PlayerStatus::Active).await?;
        if winners == 0 && active > 0 {
            return Err(DomainError::validation(
                ValidationKind::CycleInProgress,
                format!("{active} players are still in the current cycle"),
            )
            .into());
        }

        let reinstated = players::reinstate_all(txn).await?;
        let cycle_number = rounds::latest_cycle_number(txn).await?.map_or(1, |c| c + 1);
        let round = rounds::create_round(txn, cycle_number, 1, None).await?;

        info!(
            round_id = round.id,
            cycle_number,
            reinstated = reinstated.len(),
            "next cycle started"
        );
        Ok(round)
    }

    /// Wipe every round and everything attached to it, keeping the players.
    ///
    /// All players end up active; the next round created starts cycle 1.
    pub async fn reset_competition(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<CompetitionReset, AppError> {
        status_store::lock_competition(txn).await?;

        let reinstated = players::reinstate_all(txn).await?;
        reminders::delete_all(txn).await?;
        pick_tokens::delete_all(txn).await?;
        let picks_deleted = picks::delete_all(txn).await?;
        let fixtures_deleted = fixtures::delete_all(txn).await?;
        let rounds_deleted = rounds::delete_all(txn).await?;

        warn!(
            rounds_deleted,
            fixtures_deleted,
            picks_deleted,
            reinstated = reinstated.len(),
            "competition reset"
        );
        Ok(CompetitionReset {
            rounds_deleted,
            fixtures_deleted,
            picks_deleted,
            reinstated,
        })
    }

    /// Rounds for display, ordered by cycle then round number.
    pub async fn round_history(
        &self,
        txn: &DatabaseTransaction,
        cycle_number: Option<i32>,
    ) -> Result<Vec<Round>, AppError> {
        Ok(rounds::list_history(txn, cycle_number).await?)
    }
}
