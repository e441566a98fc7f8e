use fight_caves_core::{Criteria, EntityKind, RecordOutcome, Round, RoundObservation, SpawnLocation};
use tracing::{debug, trace, warn};

/// Accumulates observations for the active session.
///
/// Every call touches a single location of a single round, so a rejected or
/// conflicting observation can never disturb entries recorded earlier.
#[derive(Clone, Debug, Default)]
pub struct CriteriaStore {
    criteria: Criteria,
}

impl CriteriaStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges an observation into the round.
    ///
    /// Repeating an identical observation is a no-op. A conflicting
    /// observation replaces the earlier one and is logged as a warning.
    pub fn record(
        &mut self,
        round: Round,
        location: SpawnLocation,
        observed: Option<EntityKind>,
    ) -> RecordOutcome {
        let outcome = self.criteria.record(round, location, observed);
        match outcome {
            RecordOutcome::Inserted => debug!(
                round = round.get(),
                location = %location,
                observed = ?observed,
                "recorded observation"
            ),
            RecordOutcome::Unchanged => trace!(
                round = round.get(),
                location = %location,
                "observation already recorded"
            ),
            RecordOutcome::Overwritten { previous } => warn!(
                round = round.get(),
                location = %location,
                previous = ?previous,
                observed = ?observed,
                "conflicting observation replaced an earlier one"
            ),
        }
        outcome
    }

    /// Observations recorded for the round; empty when the round is unseen.
    #[must_use]
    pub fn get(&self, round: Round) -> RoundObservation {
        self.criteria
            .observation(round)
            .cloned()
            .unwrap_or_default()
    }

    /// Every observation recorded so far.
    #[must_use]
    pub fn all(&self) -> &Criteria {
        &self.criteria
    }

    /// Replaces the stored observations, used when resuming a session.
    pub fn replace(&mut self, criteria: Criteria) {
        self.criteria = criteria;
    }

    /// Discards every observation.
    pub fn clear(&mut self) {
        self.criteria.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_round_is_empty() {
        let store = CriteriaStore::new();
        assert!(store.get(Round::FIRST).is_empty());
        assert!(store.all().is_empty());
    }

    #[test]
    fn conflicting_observation_only_touches_its_location() {
        let mut store = CriteriaStore::new();
        let round = Round::new(9).expect("round");
        let _ = store.record(round, SpawnLocation::South, Some(EntityKind::TokXil));
        let _ = store.record(round, SpawnLocation::Center, None);

        let outcome = store.record(round, SpawnLocation::South, Some(EntityKind::TzKih));
        assert_eq!(
            outcome,
            RecordOutcome::Overwritten {
                previous: Some(EntityKind::TokXil)
            }
        );

        let observation = store.get(round);
        assert_eq!(
            observation.get(SpawnLocation::South),
            Some(Some(EntityKind::TzKih))
        );
        assert_eq!(observation.get(SpawnLocation::Center), Some(None));
        assert_eq!(observation.len(), 2);
    }

    #[test]
    fn identical_observation_is_idempotent() {
        let mut store = CriteriaStore::new();
        let _ = store.record(Round::LAST, SpawnLocation::NorthWest, None);
        let before = store.all().clone();
        assert_eq!(
            store.record(Round::LAST, SpawnLocation::NorthWest, None),
            RecordOutcome::Unchanged
        );
        assert_eq!(store.all(), &before);
    }
}
