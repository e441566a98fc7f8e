#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic rotation of spawn locations across rounds.
//!
//! Spawn locations are drawn from [`ROTATION_TABLE`] treated as a circular
//! array. Each round reads a window starting at the cursor, one slot per
//! entity, and then moves the cursor forward by a single slot. Windows of
//! consecutive rounds therefore overlap.

use fight_caves_core::{CoreError, RouteIndex, SpawnLocation, ROUTE_COUNT};

use SpawnLocation::{Center, NorthWest, South, SouthEast, SouthWest};

/// Circular table of spawn locations; its length equals the route count.
pub const ROTATION_TABLE: [SpawnLocation; ROUTE_COUNT as usize] = [
    SouthEast, SouthWest, Center, NorthWest, SouthWest, SouthEast, South, NorthWest, Center,
    SouthEast, SouthWest, South, NorthWest, Center, South,
];

/// Checks that every spawn location is reachable through the rotation.
pub fn validate_table() -> Result<(), CoreError> {
    let missing: Vec<SpawnLocation> = SpawnLocation::ALL
        .into_iter()
        .filter(|location| !ROTATION_TABLE.contains(location))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Configuration {
            reason: format!("rotation table never visits {missing:?}"),
        })
    }
}

/// Location stored at `index`, wrapping around the table.
#[must_use]
pub const fn location_at(index: usize) -> SpawnLocation {
    ROTATION_TABLE[index % ROTATION_TABLE.len()]
}

/// Stateful cursor over [`ROTATION_TABLE`].
#[derive(Clone, Debug)]
pub struct LocationRotator {
    cursor: usize,
}

impl LocationRotator {
    /// Creates a rotator whose cursor starts at the route's offset.
    #[must_use]
    pub fn new(offset: RouteIndex) -> Self {
        Self {
            cursor: offset.get() as usize,
        }
    }

    /// Table index the next window starts from.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns `count` consecutive locations and moves the cursor by one.
    ///
    /// A window longer than the table would revisit a table index, so it is
    /// rejected without moving the cursor.
    pub fn advance(&mut self, count: usize) -> Result<Vec<SpawnLocation>, CoreError> {
        if count > ROTATION_TABLE.len() {
            return Err(CoreError::InvariantViolation {
                reason: format!(
                    "rotation window of {count} exceeds the {} table slots",
                    ROTATION_TABLE.len()
                ),
            });
        }

        let start = self.cursor;
        self.cursor = (self.cursor + 1) % ROTATION_TABLE.len();
        Ok((start..start + count).map(location_at).collect())
    }
}
