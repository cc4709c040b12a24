//! Property tests for pick grading.

use std::collections::BTreeSet;

use proptest::prelude::*;

use super::grading::{absent_players, grade_pick, FixtureOutcome, Grade};

fn team() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn draw_never_wins(selection in team()) {
        prop_assert_eq!(grade_pick(&selection, &FixtureOutcome::Draw), Grade::Lost);
    }

    #[test]
    fn winner_wins_in_any_case(winner in team()) {
        let outcome = FixtureOutcome::Winner(winner.clone());
        prop_assert_eq!(grade_pick(&winner.to_lowercase(), &outcome), Grade::Won);
        prop_assert_eq!(grade_pick(&winner.to_uppercase(), &outcome), Grade::Won);
    }

    #[test]
    fn other_teams_lose(winner in team(), other in team()) {
        prop_assume!(!winner.eq_ignore_ascii_case(&other));
        let outcome = FixtureOutcome::Winner(winner);
        prop_assert_eq!(grade_pick(&other, &outcome), Grade::Lost);
    }

    #[test]
    fn absentees_partition_active_players(
        active in prop::collection::btree_set(1i64..200, 0..30),
        pickers in prop::collection::btree_set(1i64..200, 0..30),
    ) {
        let active: Vec<i64> = active.into_iter().collect();
        let absent = absent_players(&active, &pickers);
        for id in &absent {
            prop_assert!(!pickers.contains(id));
        }
        let absent_set: BTreeSet<i64> = absent.iter().copied().collect();
        for id in &active {
            prop_assert!(pickers.contains(id) || absent_set.contains(id));
        }
    }
}
