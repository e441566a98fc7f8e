#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides which entities spawn in a round.
//!
//! Every [`EntityKind`] carries the round in which it first appears. A round
//! is decomposed greedily into those thresholds, largest first, so that the
//! thresholds of its entities sum to the round number. The threshold set
//! `{63, 31, 15, 7, 3, 1}` makes the greedy decomposition exact and canonical
//! for every round.

use fight_caves_core::{CoreError, EntityKind, Round};

/// Returns the entities spawning in `round`, highest threshold first.
pub fn compose(round: Round) -> Result<Vec<EntityKind>, CoreError> {
    let mut remainder = round.get();
    let mut entities = Vec::new();
    while remainder > 0 {
        let kind = largest_within(remainder).ok_or_else(|| CoreError::InvariantViolation {
            reason: format!("round {round} stalled with remainder {remainder}"),
        })?;
        entities.push(kind);
        remainder -= kind.first_appearance();
    }
    Ok(entities)
}

fn largest_within(remainder: u32) -> Option<EntityKind> {
    EntityKind::DESCENDING
        .iter()
        .copied()
        .find(|kind| kind.first_appearance() <= remainder)
}
