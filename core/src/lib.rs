#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Fight Caves route oracle.
//!
//! This crate defines the data model and the message surface that connects
//! perception adapters, the authoritative session and the pure systems.
//! Adapters submit [`Command`] values describing what was observed, the
//! session executes them via its `apply` entry point and then broadcasts
//! [`Event`] values describing how the set of candidate routes changed.
//! Systems never mutate shared state: they compose waves, rotate spawn
//! locations, build [`Route`] values and filter them against [`Criteria`].

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rounds in a full run of the arena.
pub const ROUND_COUNT: u8 = 63;

/// Number of distinct routes, one per rotation offset.
pub const ROUTE_COUNT: u8 = 15;

/// Errors raised by the route oracle.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A constant table failed validation at startup.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of the malformed table.
        reason: String,
    },
    /// No entity kind carries the provided combat level.
    #[error("no entity kind has combat level {level}")]
    UnknownLevel {
        /// Level reported by the perception collaborator.
        level: u32,
    },
    /// No spawn location answers to the provided name.
    #[error("unknown spawn location `{name}`")]
    UnknownLocation {
        /// Name reported by the perception collaborator.
        name: String,
    },
    /// An internal invariant of route construction was broken.
    #[error("invariant violated: {reason}")]
    InvariantViolation {
        /// Description of the broken invariant.
        reason: String,
    },
    /// A round number fell outside `1..=63`.
    #[error("round {value} is outside 1..=63")]
    RoundOutOfRange {
        /// Rejected round number.
        value: u32,
    },
    /// A route index fell outside `0..=14`.
    #[error("route index {value} is outside 0..=14")]
    RouteIndexOutOfRange {
        /// Rejected route index.
        value: u32,
    },
}

impl CoreError {
    /// Reports whether the caller may drop the offending input and continue.
    ///
    /// Configuration and invariant errors indicate a broken build and are
    /// fatal; lookup and range errors only invalidate a single observation.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::UnknownLevel { .. }
            | Self::UnknownLocation { .. }
            | Self::RoundOutOfRange { .. }
            | Self::RouteIndexOutOfRange { .. } => true,
            Self::Configuration { .. } | Self::InvariantViolation { .. } => false,
        }
    }
}

/// Kinds of entity that spawn at the start of a round.
///
/// Variants are declared in descending order of first appearance; the
/// declaration order is part of the contract because wave composition walks
/// [`EntityKind::DESCENDING`] greedily.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EntityKind {
    /// Level 702, first appears in round 63.
    TzTokJad,
    /// Level 360, first appears in round 31.
    KetZek,
    /// Level 180, first appears in round 15.
    YtMejKot,
    /// Level 90, first appears in round 7.
    TokXil,
    /// Level 45, first appears in round 3.
    TzKek,
    /// Level 22, first appears in round 1.
    TzKih,
}

impl EntityKind {
    /// All kinds ordered by descending first appearance.
    pub const DESCENDING: [Self; 6] = [
        Self::TzTokJad,
        Self::KetZek,
        Self::YtMejKot,
        Self::TokXil,
        Self::TzKek,
        Self::TzKih,
    ];

    /// Round in which the kind first spawns; doubles as its wave weight.
    #[must_use]
    pub const fn first_appearance(self) -> u32 {
        match self {
            Self::TzTokJad => 63,
            Self::KetZek => 31,
            Self::YtMejKot => 15,
            Self::TokXil => 7,
            Self::TzKek => 3,
            Self::TzKih => 1,
        }
    }

    /// Combat level used by perception to identify the kind.
    #[must_use]
    pub const fn level(self) -> u32 {
        match self {
            Self::TzTokJad => 702,
            Self::KetZek => 360,
            Self::YtMejKot => 180,
            Self::TokXil => 90,
            Self::TzKek => 45,
            Self::TzKih => 22,
        }
    }

    /// Resolves a kind from its combat level.
    pub fn from_level(level: u32) -> Result<Self, CoreError> {
        Self::DESCENDING
            .iter()
            .copied()
            .find(|kind| kind.level() == level)
            .ok_or(CoreError::UnknownLevel { level })
    }

    /// Lower-case display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TzTokJad => "tztok-jad",
            Self::KetZek => "ket-zek",
            Self::YtMejKot => "yt-mejkot",
            Self::TokXil => "tok-xil",
            Self::TzKek => "tz-kek",
            Self::TzKih => "tz-kih",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checks that the threshold table can decompose every round exactly.
///
/// Thresholds must be strictly descending and end at one, otherwise the
/// greedy decomposition could stall with a positive remainder.
pub fn validate_thresholds() -> Result<(), CoreError> {
    let thresholds = EntityKind::DESCENDING.map(EntityKind::first_appearance);
    if thresholds.windows(2).any(|pair| pair[0] <= pair[1]) {
        return Err(CoreError::Configuration {
            reason: format!("thresholds {thresholds:?} are not strictly descending"),
        });
    }
    if thresholds.last() != Some(&1) {
        return Err(CoreError::Configuration {
            reason: format!("thresholds {thresholds:?} do not end at 1"),
        });
    }
    if thresholds.first() != Some(&u32::from(ROUND_COUNT)) {
        return Err(CoreError::Configuration {
            reason: format!("thresholds {thresholds:?} do not start at {ROUND_COUNT}"),
        });
    }
    Ok(())
}

/// Named positions where entities may spawn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SpawnLocation {
    /// South-eastern spawn area.
    SouthEast,
    /// South-western spawn area.
    SouthWest,
    /// Central spawn area.
    Center,
    /// North-western spawn area.
    NorthWest,
    /// Southern spawn area.
    South,
}

impl SpawnLocation {
    /// Every spawn location in declaration order.
    pub const ALL: [Self; 5] = [
        Self::SouthEast,
        Self::SouthWest,
        Self::Center,
        Self::NorthWest,
        Self::South,
    ];

    /// Lower-case display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SouthEast => "south-east",
            Self::SouthWest => "south-west",
            Self::Center => "center",
            Self::NorthWest => "north-west",
            Self::South => "south",
        }
    }
}

impl fmt::Display for SpawnLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpawnLocation {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace('_', "-");
        let compact = normalised.replace('-', "");
        Self::ALL
            .iter()
            .copied()
            .find(|location| {
                location.name() == normalised || location.name().replace('-', "") == compact
            })
            .ok_or_else(|| CoreError::UnknownLocation {
                name: value.to_owned(),
            })
    }
}

/// One-based round number within `1..=63`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Round(u8);

impl Round {
    /// Opening round.
    pub const FIRST: Self = Self(1);
    /// Final round.
    pub const LAST: Self = Self(ROUND_COUNT);

    /// Creates a round, rejecting values outside `1..=63`.
    pub fn new(value: u32) -> Result<Self, CoreError> {
        u8::try_from(value)
            .ok()
            .filter(|round| (1..=ROUND_COUNT).contains(round))
            .map(Self)
            .ok_or(CoreError::RoundOutOfRange { value })
    }

    /// Numeric round number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0 as u32
    }

    /// Zero-based position of the round within a route.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Round that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        (self.0 < ROUND_COUNT).then(|| Self(self.0 + 1))
    }

    /// Round that precedes this one, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }

    /// Iterates over every round in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=ROUND_COUNT).map(Self)
    }
}

impl TryFrom<u8> for Round {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(u32::from(value))
    }
}

impl From<Round> for u8 {
    fn from(round: Round) -> Self {
        round.0
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rotation offset that identifies a route, within `0..=14`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteIndex(u8);

impl RouteIndex {
    /// Creates a route index, rejecting values outside `0..=14`.
    pub fn new(value: u32) -> Result<Self, CoreError> {
        u8::try_from(value)
            .ok()
            .filter(|index| *index < ROUTE_COUNT)
            .map(Self)
            .ok_or(CoreError::RouteIndexOutOfRange { value })
    }

    /// Numeric route index.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0 as u32
    }

    /// Iterates over every route index in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..ROUTE_COUNT).map(Self)
    }
}

impl fmt::Display for RouteIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entities spawning at each location during one round.
///
/// Locations that spawn nothing are absent; an entry always denotes a spawn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundSpawnMap {
    spawns: BTreeMap<SpawnLocation, EntityKind>,
}

impl RoundSpawnMap {
    /// Builds a map from location/kind pairs applied in order.
    ///
    /// A later pair naming an already assigned location replaces it.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (SpawnLocation, EntityKind)>) -> Self {
        let mut spawns = BTreeMap::new();
        for (location, kind) in pairs {
            let _ = spawns.insert(location, kind);
        }
        Self { spawns }
    }

    /// Kind spawning at the location, if any.
    #[must_use]
    pub fn get(&self, location: SpawnLocation) -> Option<EntityKind> {
        self.spawns.get(&location).copied()
    }

    /// Reports whether anything spawns at the location.
    #[must_use]
    pub fn contains(&self, location: SpawnLocation) -> bool {
        self.spawns.contains_key(&location)
    }

    /// Iterates over the spawns in location order.
    pub fn iter(&self) -> impl Iterator<Item = (SpawnLocation, EntityKind)> + '_ {
        self.spawns.iter().map(|(location, kind)| (*location, *kind))
    }

    /// Number of locations spawning this round.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spawns.len()
    }

    /// Reports whether nothing spawns this round.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}

/// Complete spawn assignment for one rotation offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    index: RouteIndex,
    rounds: Vec<RoundSpawnMap>,
}

impl Route {
    /// Creates a route from one spawn map per round, round 1 first.
    pub fn new(index: RouteIndex, rounds: Vec<RoundSpawnMap>) -> Result<Self, CoreError> {
        if rounds.len() != usize::from(ROUND_COUNT) {
            return Err(CoreError::InvariantViolation {
                reason: format!(
                    "route {index} holds {} rounds, expected {ROUND_COUNT}",
                    rounds.len()
                ),
            });
        }
        Ok(Self { index, rounds })
    }

    /// Rotation offset the route was built from.
    #[must_use]
    pub const fn index(&self) -> RouteIndex {
        self.index
    }

    /// Spawns of the provided round.
    #[must_use]
    pub fn round(&self, round: Round) -> &RoundSpawnMap {
        &self.rounds[round.index()]
    }

    /// Iterates over every round together with its spawns.
    pub fn iter(&self) -> impl Iterator<Item = (Round, &RoundSpawnMap)> {
        Round::all().zip(self.rounds.iter())
    }
}

/// Result of merging one observation into a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The location had no prior observation.
    Inserted,
    /// The location already held the identical observation.
    Unchanged,
    /// The location held a different observation that was replaced.
    Overwritten {
        /// Observation that was replaced.
        previous: Option<EntityKind>,
    },
}

/// Confirmed spawns and confirmed empty locations for one round.
///
/// `Some(kind)` confirms a spawn of that kind, `None` confirms that nothing
/// spawned at the location.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundObservation {
    observed: BTreeMap<SpawnLocation, Option<EntityKind>>,
}

impl RoundObservation {
    /// Observation recorded for the location; `None` when never observed.
    #[must_use]
    pub fn get(&self, location: SpawnLocation) -> Option<Option<EntityKind>> {
        self.observed.get(&location).copied()
    }

    /// Reports whether the location has been observed.
    #[must_use]
    pub fn contains(&self, location: SpawnLocation) -> bool {
        self.observed.contains_key(&location)
    }

    /// Merges an observation, replacing a conflicting one.
    pub fn record(
        &mut self,
        location: SpawnLocation,
        observed: Option<EntityKind>,
    ) -> RecordOutcome {
        match self.observed.insert(location, observed) {
            None => RecordOutcome::Inserted,
            Some(previous) if previous == observed => RecordOutcome::Unchanged,
            Some(previous) => RecordOutcome::Overwritten { previous },
        }
    }

    /// Iterates over the observations in location order.
    pub fn iter(&self) -> impl Iterator<Item = (SpawnLocation, Option<EntityKind>)> + '_ {
        self.observed
            .iter()
            .map(|(location, observed)| (*location, *observed))
    }

    /// Number of observed locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// Reports whether nothing has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}

/// Observations accumulated over a session, keyed by round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria {
    rounds: BTreeMap<Round, RoundObservation>,
}

impl Criteria {
    /// Creates empty criteria.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observations recorded for the round, if any.
    #[must_use]
    pub fn observation(&self, round: Round) -> Option<&RoundObservation> {
        self.rounds.get(&round)
    }

    /// Merges an observation into the round.
    pub fn record(
        &mut self,
        round: Round,
        location: SpawnLocation,
        observed: Option<EntityKind>,
    ) -> RecordOutcome {
        self.rounds.entry(round).or_default().record(location, observed)
    }

    /// Iterates over observed rounds in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Round, &RoundObservation)> {
        self.rounds.iter().map(|(round, observation)| (*round, observation))
    }

    /// Total number of location observations across all rounds.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.rounds.values().map(RoundObservation::len).sum()
    }

    /// Reports whether no observation has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.values().all(RoundObservation::is_empty)
    }

    /// Removes every observation.
    pub fn clear(&mut self) {
        self.rounds.clear();
    }
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Begins a fresh session with every route as a candidate.
    StartSession,
    /// Announces that a round has begun.
    StartRound {
        /// Round that started.
        round: Round,
    },
    /// Records a confirmed spawn or confirmed empty location.
    RecordObservation {
        /// Round the observation belongs to.
        round: Round,
        /// Location that was observed.
        location: SpawnLocation,
        /// Kind that spawned, or `None` when nothing spawned.
        observed: Option<EntityKind>,
    },
    /// Reports an entity identified by level spawning in the current round.
    RecordSighting {
        /// Location the entity spawned at.
        location: SpawnLocation,
        /// Combat level reported by perception.
        level: u32,
    },
    /// Reports the locations visible at the start of the current round.
    ///
    /// Visible locations without a recorded spawn are confirmed empty.
    ConfirmVisible {
        /// Locations in view of the player.
        locations: Vec<SpawnLocation>,
    },
    /// Marks the session as paused so a resume restores the same round.
    Pause,
    /// Ends the session and discards all observations.
    EndSession,
}

/// Reasons an observation may be discarded by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardReason {
    /// No entity kind carries the reported level.
    UnknownLevel {
        /// Level that failed to resolve.
        level: u32,
    },
    /// A round-relative observation arrived before any round started.
    NoActiveRound,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A session began with the provided number of candidate routes.
    SessionStarted {
        /// Number of candidate routes.
        candidates: usize,
    },
    /// A round became the current round.
    RoundStarted {
        /// Round that started.
        round: Round,
    },
    /// A new observation was stored.
    ObservationRecorded {
        /// Round of the observation.
        round: Round,
        /// Location observed.
        location: SpawnLocation,
        /// Observed kind, `None` for a confirmed empty location.
        observed: Option<EntityKind>,
    },
    /// An observation replaced a conflicting earlier one.
    ObservationConflicted {
        /// Round of the observation.
        round: Round,
        /// Location observed.
        location: SpawnLocation,
        /// Observation that was replaced.
        previous: Option<EntityKind>,
        /// Observation now stored.
        observed: Option<EntityKind>,
    },
    /// An observation was dropped without touching the criteria.
    ObservationDiscarded {
        /// Why the observation was dropped.
        reason: DiscardReason,
    },
    /// The candidate set shrank below the last reported size.
    CandidatesNarrowed {
        /// Number of routes still consistent with the criteria.
        remaining: usize,
    },
    /// No route is consistent with the recorded criteria.
    NoMatchingRoute,
    /// Exactly one route remains.
    RouteSolved {
        /// Index of the solved route.
        route: RouteIndex,
    },
    /// The session was paused.
    Paused {
        /// Round that was current when pausing.
        round: Option<Round>,
    },
    /// The session ended and its observations were discarded.
    SessionEnded,
}
