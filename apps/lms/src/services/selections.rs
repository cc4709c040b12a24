//! Selection validation for pick submission.

use sea_orm::DatabaseTransaction;

use crate::domain::same_team;
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::repos::rounds::Round;
use crate::repos::{fixtures, picks};

/// A selection resolved to a fixture of the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSelection {
    pub fixture_id: i64,
    /// Team name as stored on the fixture.
    pub team: String,
}

/// The team must play in `round` and must not repeat a team the player
/// backed earlier in the same cycle.
pub async fn validate_selection(
    txn: &DatabaseTransaction,
    player_id: i64,
    round: &Round,
    selection: &str,
) -> Result<ValidSelection, AppError> {
    let selection = selection.trim();
    if selection.is_empty() {
        return Err(
            DomainError::validation(ValidationKind::InvalidSelection, "Selection is empty").into(),
        );
    }

    let round_fixtures = fixtures::find_all_by_round(txn, round.id).await?;
    let found = round_fixtures
        .iter()
        .find_map(|f| f.team_named(selection).map(|team| (f.id, team.to_string())));
    let Some((fixture_id, team)) = found else {
        return Err(DomainError::validation(
            ValidationKind::InvalidSelection,
            format!("'{selection}' does not play in round {}", round.round_number),
        )
        .into());
    };

    let earlier = picks::selections_in_cycle(txn, player_id, round.cycle_number, round.id).await?;
    if earlier.iter().any(|prev| same_team(prev, &team)) {
        return Err(DomainError::validation(
            ValidationKind::SelectionReused,
            format!("'{team}' was already picked this cycle"),
        )
        .into());
    }

    Ok(ValidSelection { fixture_id, team })
}
