//! Pick grading against fixture results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Final result of one fixture as reported by the results feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureOutcome {
    /// The named team won.
    Winner(String),
    /// A draw is a loss for pickers of either side.
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Won,
    Lost,
}

/// Team names compare trimmed and case-insensitively.
pub fn same_team(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub fn grade_pick(selection: &str, outcome: &FixtureOutcome) -> Grade {
    match outcome {
        FixtureOutcome::Winner(team) if same_team(team, selection) => Grade::Won,
        FixtureOutcome::Winner(_) | FixtureOutcome::Draw => Grade::Lost,
    }
}

/// Active players who did not pick: absence counts as a loss.
pub fn absent_players(active: &[i64], pickers: &BTreeSet<i64>) -> Vec<i64> {
    active
        .iter()
        .copied()
        .filter(|id| !pickers.contains(id))
        .collect()
}
