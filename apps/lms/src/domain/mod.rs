//! Domain layer: pure decision procedures with no storage access.

pub mod grading;
pub mod resolver;

#[cfg(test)]
mod tests_props_grading;

pub use grading::{absent_players, grade_pick, same_team, FixtureOutcome, Grade};
pub use resolver::{resolve, ActiveCandidate, Resolution};
