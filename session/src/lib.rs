#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for the Fight Caves route oracle.
//!
//! A [`Session`] owns everything that changes while a player works through
//! the arena: the observations gathered so far, the current round and the
//! solved route once only one candidate remains. Adapters mutate it solely
//! through [`apply`] and read it through [`query`]; the route table itself is
//! shared and never changes.

mod criteria;
mod transfer;

use std::sync::Arc;

use fight_caves_core::{
    Command, DiscardReason, EntityKind, Event, RecordOutcome, Round, Route, RouteIndex,
    SpawnLocation,
};
use fight_caves_system_route_matching::{solve, Solution};
use tracing::{debug, error, info, warn};

pub use criteria::CriteriaStore;
pub use transfer::{
    dump_criteria, load_criteria, SessionSnapshot, TransferError, SNAPSHOT_HEADER,
};

/// Mutable state of one play session.
#[derive(Debug)]
pub struct Session {
    routes: Arc<[Route]>,
    criteria: CriteriaStore,
    current_round: Option<Round>,
    last_round: Option<Round>,
    last_reported: usize,
    solved: Option<RouteIndex>,
    paused: bool,
}

impl Session {
    /// Creates a session whose candidates are the provided routes.
    #[must_use]
    pub fn new(routes: Arc<[Route]>) -> Self {
        let last_reported = routes.len();
        Self {
            routes,
            criteria: CriteriaStore::new(),
            current_round: None,
            last_round: None,
            last_reported,
            solved: None,
            paused: false,
        }
    }

    fn reset(&mut self) {
        self.criteria.clear();
        self.current_round = None;
        self.last_round = None;
        self.last_reported = self.routes.len();
        self.solved = None;
        self.paused = false;
    }

    fn store(
        &mut self,
        round: Round,
        location: SpawnLocation,
        observed: Option<EntityKind>,
        out_events: &mut Vec<Event>,
    ) -> bool {
        match self.criteria.record(round, location, observed) {
            RecordOutcome::Inserted => {
                out_events.push(Event::ObservationRecorded {
                    round,
                    location,
                    observed,
                });
                true
            }
            RecordOutcome::Unchanged => false,
            RecordOutcome::Overwritten { previous } => {
                out_events.push(Event::ObservationConflicted {
                    round,
                    location,
                    previous,
                    observed,
                });
                true
            }
        }
    }

    fn rematch(&mut self, out_events: &mut Vec<Event>) {
        if self.solved.is_some() {
            return;
        }

        match solve(&self.routes, self.criteria.all()) {
            Solution::Solved(route) => {
                let index = route.index();
                info!(route = index.get(), "spawn route solved");
                self.solved = Some(index);
                self.last_reported = 1;
                out_events.push(Event::RouteSolved { route: index });
            }
            Solution::Unsolved { candidates: 0 } => {
                if self.last_reported != 0 {
                    warn!(
                        observations = self.criteria.all().observation_count(),
                        "no spawn route matches the recorded observations"
                    );
                    out_events.push(Event::NoMatchingRoute);
                }
                self.last_reported = 0;
            }
            Solution::Unsolved { candidates } => {
                if candidates < self.last_reported {
                    info!(remaining = candidates, "candidate routes narrowed");
                    out_events.push(Event::CandidatesNarrowed {
                        remaining: candidates,
                    });
                }
                self.last_reported = candidates;
            }
        }
    }

    fn discard(reason: DiscardReason, out_events: &mut Vec<Event>) {
        out_events.push(Event::ObservationDiscarded { reason });
    }
}

/// Applies the provided command to the session, emitting resulting events.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => {
            session.reset();
            debug!(candidates = session.routes.len(), "session started");
            out_events.push(Event::SessionStarted {
                candidates: session.routes.len(),
            });
        }
        Command::StartRound { round } => {
            session.current_round = Some(round);
            session.last_round = Some(round);
            session.paused = false;
            out_events.push(Event::RoundStarted { round });
        }
        Command::RecordObservation {
            round,
            location,
            observed,
        } => {
            if session.store(round, location, observed, out_events) {
                session.rematch(out_events);
            }
        }
        Command::RecordSighting { location, level } => {
            let Some(round) = session.current_round else {
                warn!(level, location = %location, "sighting arrived before any round started");
                Session::discard(DiscardReason::NoActiveRound, out_events);
                return;
            };
            match EntityKind::from_level(level) {
                Ok(kind) => {
                    if session.store(round, location, Some(kind), out_events) {
                        session.rematch(out_events);
                    }
                }
                Err(error) => {
                    if error.is_recoverable() {
                        warn!(%error, round = round.get(), "discarding sighting");
                    } else {
                        error!(%error, round = round.get(), "sighting could not be resolved");
                    }
                    Session::discard(DiscardReason::UnknownLevel { level }, out_events);
                }
            }
        }
        Command::ConfirmVisible { locations } => {
            let Some(round) = session.current_round else {
                Session::discard(DiscardReason::NoActiveRound, out_events);
                return;
            };
            let seen = session.criteria.get(round);
            let mut changed = false;
            for location in locations {
                if !seen.contains(location) {
                    changed |= session.store(round, location, None, out_events);
                }
            }
            if changed {
                session.rematch(out_events);
            }
        }
        Command::Pause => {
            session.paused = true;
            out_events.push(Event::Paused {
                round: session.last_round,
            });
        }
        Command::EndSession => {
            session.reset();
            debug!("session ended");
            out_events.push(Event::SessionEnded);
        }
    }
}

/// Restores a session from a snapshot and re-matches its criteria.
///
/// A paused snapshot resumes at the saved round. Otherwise the saved round
/// will be announced again once play continues, so the session resumes one
/// round earlier.
pub fn restore(session: &mut Session, snapshot: SessionSnapshot, out_events: &mut Vec<Event>) {
    session.reset();
    session.last_round = snapshot.last_round;
    session.current_round = if snapshot.paused {
        snapshot.last_round
    } else {
        snapshot.last_round.and_then(Round::previous)
    };
    session.criteria.replace(snapshot.criteria);

    info!(
        observations = session.criteria.all().observation_count(),
        round = ?session.current_round,
        paused = snapshot.paused,
        "session restored"
    );
    out_events.push(Event::SessionStarted {
        candidates: session.routes.len(),
    });
    if !session.criteria.all().is_empty() {
        session.rematch(out_events);
    }
}

/// Query functions that expose read-only session state.
pub mod query {
    use fight_caves_core::{Criteria, Round, RoundSpawnMap, Route};
    use fight_caves_system_route_matching::{find_matching, predict, solve, Solution};

    use super::{Session, SessionSnapshot};

    /// Round most recently started, adjusted when resuming.
    #[must_use]
    pub fn current_round(session: &Session) -> Option<Round> {
        session.current_round
    }

    /// Reports whether the session was paused since the last round began.
    #[must_use]
    pub fn is_paused(session: &Session) -> bool {
        session.paused
    }

    /// Observations recorded so far.
    #[must_use]
    pub fn criteria(session: &Session) -> &Criteria {
        session.criteria.all()
    }

    /// Every route the session was created with.
    #[must_use]
    pub fn routes(session: &Session) -> &[Route] {
        &session.routes
    }

    /// Route cached once exactly one candidate remained.
    #[must_use]
    pub fn solved_route(session: &Session) -> Option<&Route> {
        let index = session.solved?;
        session.routes.iter().find(|route| route.index() == index)
    }

    /// Routes still consistent with the recorded observations.
    #[must_use]
    pub fn candidates(session: &Session) -> Vec<&Route> {
        match solved_route(session) {
            Some(route) => vec![route],
            None => find_matching(&session.routes, session.criteria.all()),
        }
    }

    /// Current solution, reusing the cached route once solved.
    #[must_use]
    pub fn solution(session: &Session) -> Solution<'_> {
        match solved_route(session) {
            Some(route) => Solution::Solved(route),
            None => solve(&session.routes, session.criteria.all()),
        }
    }

    /// Predicted spawns for `round`, available once solved.
    #[must_use]
    pub fn prediction(session: &Session, round: Round) -> Option<&RoundSpawnMap> {
        solved_route(session).map(|route| predict(route, round))
    }

    /// Predicted spawns of the round after the current one.
    ///
    /// Nothing is predicted before the first round starts or after the last.
    #[must_use]
    pub fn next_spawns(session: &Session) -> Option<&RoundSpawnMap> {
        let next = session.current_round?.next()?;
        prediction(session, next)
    }

    /// Captures the persistable part of the session.
    #[must_use]
    pub fn snapshot(session: &Session) -> SessionSnapshot {
        SessionSnapshot {
            criteria: session.criteria.all().clone(),
            last_round: session.last_round,
            paused: session.paused,
        }
    }
}
