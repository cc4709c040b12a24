//! Elimination engine: grade picks from fixture results and knock out losers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use sea_orm::DatabaseTransaction;
use tracing::{debug, info};

use crate::domain::{absent_players, grade_pick, FixtureOutcome, Grade};
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::repos::picks::{self, PickOutcome};
use crate::repos::{fixtures, players, rounds};
use crate::services::lifecycle::{RoundClosure, RoundLifecycle};

/// What one `finalize_round` call did.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeReport {
    pub round_id: i64,
    /// Picks graded won or lost by this call.
    pub graded: usize,
    /// Players knocked out by this call, losers first, then absentees.
    pub eliminated: Vec<i64>,
    /// Picks whose fixture still has no result.
    pub pending_picks: usize,
    /// `None` until every fixture of the round has a result.
    pub closure: Option<RoundClosure>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EliminationEngine;

impl EliminationEngine {
    /// Apply `results` (fixture id -> outcome) to the current round.
    ///
    /// Losing picks eliminate their players immediately. Once every fixture
    /// has a result, active players without a pick are eliminated too and the
    /// lifecycle closes the round, exactly once per call.
    pub async fn finalize_round(
        &self,
        txn: &DatabaseTransaction,
        round_id: i64,
        results: &BTreeMap<i64, FixtureOutcome>,
    ) -> Result<FinalizeReport, AppError> {
        let lifecycle = RoundLifecycle;
        let current = lifecycle.lock_and_current(txn).await?;
        if current.as_ref().map(|r| r.id) != Some(round_id) {
            // Distinguish a missing round from one that is not open.
            rounds::require_round(txn, round_id).await?;
            return Err(DomainError::validation(
                ValidationKind::InvalidTransition,
                format!("round {round_id} is not the active round"),
            )
            .into());
        }

        let round_fixtures = fixtures::find_all_by_round(txn, round_id).await?;
        for fixture_id in results.keys() {
            if !round_fixtures.iter().any(|f| f.id == *fixture_id) {
                return Err(DomainError::validation(
                    ValidationKind::UnknownFixture,
                    format!("fixture {fixture_id} is not part of round {round_id}"),
                )
                .into());
            }
        }

        let mut outcomes: HashMap<i64, Option<FixtureOutcome>> = round_fixtures
            .into_iter()
            .map(|f| (f.id, f.result))
            .collect();
        for (fixture_id, outcome) in results {
            let recorded = fixtures::record_result(txn, *fixture_id, outcome).await?;
            outcomes.insert(recorded.id, recorded.result);
        }

        let round_picks = picks::find_all_by_round(txn, round_id).await?;
        let mut graded = 0;
        let mut pending_picks = 0;
        let mut losers = Vec::new();
        for pick in round_picks.iter().filter(|p| p.outcome == PickOutcome::Pending) {
            let Some(Some(outcome)) = outcomes.get(&pick.fixture_id) else {
                pending_picks += 1;
                continue;
            };
            let grade = grade_pick(&pick.selection, outcome);
            debug!(
                round_id,
                pick_id = pick.id,
                player_id = pick.player_id,
                grade = ?grade,
                "pick graded"
            );
            let outcome = match grade {
                Grade::Won => PickOutcome::Won,
                Grade::Lost => {
                    losers.push(pick.player_id);
                    PickOutcome::Lost
                }
            };
            picks::set_outcome(txn, pick.id, outcome).await?;
            graded += 1;
        }

        players::eliminate(txn, &losers, round_id).await?;
        let mut eliminated = losers;

        let resolved = outcomes.values().all(Option::is_some);
        if !resolved {
            info!(
                round_id,
                graded,
                pending_picks,
                eliminated = eliminated.len(),
                "round partially finalized"
            );
            return Ok(FinalizeReport {
                round_id,
                graded,
                eliminated,
                pending_picks,
                closure: None,
            });
        }

        // Absence is a loss, but only when somebody actually played the round.
        if !round_picks.is_empty() {
            let pickers: BTreeSet<i64> = round_picks.iter().map(|p| p.player_id).collect();
            let absentees = absent_players(&players::active_player_ids(txn).await?, &pickers);
            if !absentees.is_empty() {
                info!(round_id, absentees = ?absentees, "eliminating players without a pick");
                players::eliminate(txn, &absentees, round_id).await?;
                eliminated.extend(absentees);
            }
        }

        let closure = lifecycle.detect_and_trigger_rollover(txn, round_id).await?;
        info!(
            round_id,
            graded,
            eliminated = eliminated.len(),
            closure = ?closure,
            "round finalized"
        );
        Ok(FinalizeReport {
            round_id,
            graded,
            eliminated,
            pending_picks,
            closure: Some(closure),
        })
    }
}
