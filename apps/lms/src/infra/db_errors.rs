//! SeaORM -> DomainError translation.
//!
//! Adapters return `sea_orm::DbErr`; repos convert here so services only ever
//! see `DomainError` (and `AppError` via `From`).

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;

/// Prefix of structured not-found errors raised by adapters.
pub const NOT_FOUND_PREFIX: &str = "NOT_FOUND:";

#[derive(Debug, Serialize, Deserialize)]
struct NotFoundInfo {
    entity: String,
    id: i64,
}

/// Build the `DbErr` an adapter returns when a required row is missing.
pub fn not_found_err(entity: &str, id: i64) -> sea_orm::DbErr {
    let info = NotFoundInfo {
        entity: entity.to_string(),
        id,
    };
    let payload = serde_json::to_string(&info).unwrap_or_default();
    sea_orm::DbErr::Custom(format!("{NOT_FOUND_PREFIX}{payload}"))
}

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// SQLite: "UNIQUE constraint failed: picks.player_id, picks.round_id"
fn sqlite_unique_target(error_msg: &str) -> Option<&str> {
    const MARKER: &str = "UNIQUE constraint failed: ";
    let start = error_msg.find(MARKER)? + MARKER.len();
    error_msg[start..].split_whitespace().next()
}

fn conflict_for_table(table_column: &str) -> Option<(ConflictKind, &'static str)> {
    let table = table_column.split('.').next()?;
    let column = table_column
        .split('.')
        .nth(1)
        .map(|c| c.trim_end_matches(','));
    match (table, column) {
        ("picks", _) => Some((
            ConflictKind::AlreadyPicked,
            "Player already picked for this round",
        )),
        ("pick_tokens", Some("token")) => Some((
            ConflictKind::Other("TokenCollision".into()),
            "Generated token collided with an existing token",
        )),
        ("pick_tokens", _) => Some((
            ConflictKind::AlreadyHasToken,
            "Player already holds a token for this round",
        )),
        ("rounds", _) => Some((
            ConflictKind::DuplicateRound,
            "Round number already exists in this cycle",
        )),
        ("reminder_schedules", _) => Some((
            ConflictKind::Other("DuplicateReminder".into()),
            "Reminder already scheduled",
        )),
        _ => None,
    }
}

fn conflict_for_pg_constraint(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    let table_column = if error_msg.contains("ux_picks_player_round") {
        "picks.player_id"
    } else if error_msg.contains("ux_pick_tokens_token") {
        "pick_tokens.token"
    } else if error_msg.contains("ux_pick_tokens_player_round") {
        "pick_tokens.player_id"
    } else if error_msg.contains("ux_rounds_cycle_round") {
        "rounds.cycle_number"
    } else if error_msg.contains("ux_reminder_schedules_player_round_offset") {
        "reminder_schedules.player_id"
    } else {
        return None;
    };
    conflict_for_table(table_column)
}

fn not_found_kind(entity: &str) -> NotFoundKind {
    match entity {
        "round" => NotFoundKind::Round,
        "player" => NotFoundKind::Player,
        "fixture" => NotFoundKind::Fixture,
        "pick_token" => NotFoundKind::Token,
        "reminder" => NotFoundKind::Reminder,
        other => NotFoundKind::Other(other.to_string()),
    }
}

/// Translate a `DbErr` into a `DomainError` with PII-safe detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), "Record not found");
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(NOT_FOUND_PREFIX) => {
            let parsed = msg
                .strip_prefix(NOT_FOUND_PREFIX)
                .and_then(|json| serde_json::from_str::<NotFoundInfo>(json).ok());
            return match parsed {
                Some(info) => DomainError::not_found(
                    not_found_kind(&info.entity),
                    format!("{} {} not found", info.entity, info.id),
                ),
                None => {
                    warn!(raw_error = %Redacted(msg), "unparseable not-found payload");
                    DomainError::not_found(NotFoundKind::Other("Record".into()), "Record not found")
                }
            };
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %Redacted(&error_msg), "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %Redacted(&error_msg), "Unique constraint violation");

        if let Some((kind, detail)) = sqlite_unique_target(&error_msg)
            .and_then(conflict_for_table)
            .or_else(|| conflict_for_pg_constraint(&error_msg))
        {
            return DomainError::conflict(kind, detail);
        }

        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(raw_error = %Redacted(&error_msg), "Foreign key constraint violation");
        return DomainError::validation_other("Foreign key constraint violation");
    }

    if mentions_sqlstate(&error_msg, "23514") || error_msg.contains("CHECK constraint failed") {
        warn!(raw_error = %Redacted(&error_msg), "Check constraint violation");
        return DomainError::validation_other("Check constraint violation");
    }

    if error_msg.contains("timeout") || error_msg.contains("database is locked") {
        warn!(raw_error = %Redacted(&error_msg), "Database timeout or lock contention");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %Redacted(&error_msg), "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}
