#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that expands rotation offsets into complete spawn routes.
//!
//! A route pairs the composition of every round with the locations handed
//! out by a [`LocationRotator`] started at the route's offset. The rotator
//! never repeats a table slot within a round because no round spawns more
//! entities than the table holds. The table does repeat locations, so two
//! entities of one round can land on the same location; the later, lower
//! threshold entity then takes the location.

use std::sync::{Arc, OnceLock};

use fight_caves_core::{
    validate_thresholds, CoreError, Round, RoundSpawnMap, Route, RouteIndex, ROUND_COUNT,
    ROUTE_COUNT,
};
use fight_caves_system_rotation::{validate_table, LocationRotator};
use fight_caves_system_wave_composition::compose;
use tracing::{debug, trace};

static ROUTES: OnceLock<Arc<[Route]>> = OnceLock::new();

/// Builds the complete route for one rotation offset.
pub fn build(index: RouteIndex) -> Result<Route, CoreError> {
    let mut rotator = LocationRotator::new(index);
    let mut rounds = Vec::with_capacity(usize::from(ROUND_COUNT));

    for round in Round::all() {
        let entities = compose(round)?;
        let locations = rotator.advance(entities.len())?;
        let spawns = RoundSpawnMap::from_pairs(locations.into_iter().zip(entities.iter().copied()));
        if spawns.len() < entities.len() {
            trace!(
                route = index.get(),
                round = round.get(),
                entities = entities.len(),
                locations = spawns.len(),
                "rotation window names a location twice"
            );
        }
        rounds.push(spawns);
    }

    Route::new(index, rounds)
}

/// Builds every route, one per rotation offset, in index order.
///
/// The constant tables are validated first so a malformed build fails here
/// rather than producing inconsistent routes.
pub fn generate_all() -> Result<Vec<Route>, CoreError> {
    validate_thresholds()?;
    validate_table()?;

    let routes = RouteIndex::all()
        .map(build)
        .collect::<Result<Vec<_>, _>>()?;
    if routes.len() != usize::from(ROUTE_COUNT) {
        return Err(CoreError::InvariantViolation {
            reason: format!("generated {} routes, expected {ROUTE_COUNT}", routes.len()),
        });
    }

    debug!(routes = routes.len(), "generated spawn routes");
    Ok(routes)
}

/// Returns the process-wide route table, generating it on first use.
///
/// Routes never depend on observations, so every session shares one copy.
pub fn cached_routes() -> Result<Arc<[Route]>, CoreError> {
    if let Some(routes) = ROUTES.get() {
        return Ok(Arc::clone(routes));
    }

    let generated: Arc<[Route]> = generate_all()?.into();
    Ok(Arc::clone(ROUTES.get_or_init(|| generated)))
}
