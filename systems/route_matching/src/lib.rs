#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that filters routes against accumulated criteria.
//!
//! Criteria only ever remove candidates: a route survives when every
//! recorded spawn appears in it with the same kind and every location
//! recorded as empty spawns nothing in it. Adding consistent observations
//! therefore never grows the candidate set.

use fight_caves_core::{Criteria, Round, RoundSpawnMap, Route};

/// Outcome of matching the route table against criteria.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Solution<'a> {
    /// Zero or several routes remain consistent.
    Unsolved {
        /// Number of routes still consistent with the criteria.
        candidates: usize,
    },
    /// Exactly one route remains consistent.
    Solved(&'a Route),
}

impl<'a> Solution<'a> {
    /// Solved route, if any.
    #[must_use]
    pub const fn route(&self) -> Option<&'a Route> {
        match self {
            Self::Solved(route) => Some(*route),
            Self::Unsolved { .. } => None,
        }
    }

    /// Number of routes still consistent with the criteria.
    #[must_use]
    pub const fn candidates(&self) -> usize {
        match self {
            Self::Solved(_) => 1,
            Self::Unsolved { candidates } => *candidates,
        }
    }
}

/// Reports whether `route` agrees with every observation in `criteria`.
#[must_use]
pub fn matches(route: &Route, criteria: &Criteria) -> bool {
    criteria.iter().all(|(round, observation)| {
        let spawns = route.round(round);
        observation
            .iter()
            .all(|(location, observed)| match observed {
                Some(kind) => spawns.get(location) == Some(kind),
                None => !spawns.contains(location),
            })
    })
}

/// Routes consistent with `criteria`, in route index order.
#[must_use]
pub fn find_matching<'a>(routes: &'a [Route], criteria: &Criteria) -> Vec<&'a Route> {
    routes
        .iter()
        .filter(|route| matches(route, criteria))
        .collect()
}

/// Narrows the route table and reports whether a single route remains.
#[must_use]
pub fn solve<'a>(routes: &'a [Route], criteria: &Criteria) -> Solution<'a> {
    match find_matching(routes, criteria).as_slice() {
        [route] => Solution::Solved(*route),
        candidates => Solution::Unsolved {
            candidates: candidates.len(),
        },
    }
}

/// Spawns predicted by `route` for `round`.
#[must_use]
pub fn predict(route: &Route, round: Round) -> &RoundSpawnMap {
    route.round(round)
}
