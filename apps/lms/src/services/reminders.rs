//! Reminder scheduling for players who have not picked yet.
//!
//! Schedules hang off the current round only; delivery belongs to the
//! messaging collaborator, which polls [`ReminderScheduler::due_reminders`].

use std::collections::BTreeSet;

use sea_orm::DatabaseTransaction;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::config::competition::CompetitionConfig;
use crate::error::AppError;
use crate::repos::reminders::{self, Reminder};
use crate::repos::{picks, players};
use crate::services::lifecycle::RoundLifecycle;

#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    offsets: Vec<Duration>,
}

impl ReminderScheduler {
    pub fn new(offsets: Vec<Duration>) -> Self {
        Self { offsets }
    }

    pub fn from_config(config: &CompetitionConfig) -> Self {
        Self::new(config.reminder_offsets.clone())
    }

    /// Create missing reminders for the current round. Idempotent.
    ///
    /// One reminder per active player without a pick and per offset whose
    /// send time is still ahead of `now`. Returns only the newly created ones.
    pub async fn schedule_for_current_round(
        &self,
        txn: &DatabaseTransaction,
        now: OffsetDateTime,
    ) -> Result<Vec<Reminder>, AppError> {
        let Some(round) = RoundLifecycle.current_round(txn).await? else {
            debug!("no current round; nothing to schedule");
            return Ok(Vec::new());
        };
        let Some(kickoff) = round.first_kickoff_at else {
            debug!(round_id = round.id, "round has no kickoff time; nothing to schedule");
            return Ok(Vec::new());
        };

        let pickers: BTreeSet<i64> = picks::find_all_by_round(txn, round.id)
            .await?
            .into_iter()
            .map(|p| p.player_id)
            .collect();
        let existing: BTreeSet<(i64, i64)> = reminders::find_all_by_round(txn, round.id)
            .await?
            .into_iter()
            .map(|r| (r.player_id, r.offset.whole_minutes()))
            .collect();

        let mut created = Vec::new();
        for player_id in players::active_player_ids(txn).await? {
            if pickers.contains(&player_id) {
                continue;
            }
            for offset in &self.offsets {
                let scheduled_at = kickoff - *offset;
                if scheduled_at <= now || existing.contains(&(player_id, offset.whole_minutes())) {
                    continue;
                }
                created.push(
                    reminders::create_reminder(txn, player_id, round.id, *offset, scheduled_at)
                        .await?,
                );
            }
        }

        info!(round_id = round.id, created = created.len(), "reminders scheduled");
        Ok(created)
    }

    /// Unsent reminders due by `now` for the current round, skipping players
    /// who have since picked or been knocked out.
    pub async fn due_reminders(
        &self,
        txn: &DatabaseTransaction,
        now: OffsetDateTime,
    ) -> Result<Vec<Reminder>, AppError> {
        let Some(round) = RoundLifecycle.current_round(txn).await? else {
            return Ok(Vec::new());
        };

        let pickers: BTreeSet<i64> = picks::find_all_by_round(txn, round.id)
            .await?
            .into_iter()
            .map(|p| p.player_id)
            .collect();
        let active: BTreeSet<i64> = players::active_player_ids(txn).await?.into_iter().collect();

        Ok(reminders::find_due(txn, round.id, now)
            .await?
            .into_iter()
            .filter(|r| active.contains(&r.player_id) && !pickers.contains(&r.player_id))
            .collect())
    }

    pub async fn mark_sent(
        &self,
        txn: &DatabaseTransaction,
        reminder_id: i64,
        now: OffsetDateTime,
    ) -> Result<Reminder, AppError> {
        Ok(reminders::mark_sent(txn, reminder_id, now).await?)
    }
}
