//! Human-readable rendering of routes, predictions and session events.

use std::fmt::Write as _;

use fight_caves_core::{DiscardReason, EntityKind, Event, Round, RoundSpawnMap, Route};
use fight_caves_session::{query, Session};

/// Renders one round of spawns, e.g. `tz-kek in the south-east`.
pub(crate) fn format_spawns(spawns: &RoundSpawnMap) -> String {
    if spawns.is_empty() {
        return "nothing".to_owned();
    }
    spawns
        .iter()
        .map(|(location, kind)| format!("{kind} in the {location}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders every round of a route, one line per round.
pub(crate) fn format_route(route: &Route) -> String {
    let mut rendered = format!("spawn pattern {}\n", route.index());
    for (round, spawns) in route.iter() {
        let _ = writeln!(rendered, "  wave {:>2}: {}", round.get(), format_spawns(spawns));
    }
    rendered
}

/// Renders the predicted spawns of an upcoming round.
pub(crate) fn format_prediction(round: Round, spawns: &RoundSpawnMap) -> String {
    format!("Wave {round} will spawn {}.", format_spawns(spawns))
}

fn describe(observed: Option<EntityKind>) -> String {
    observed.map_or_else(|| "nothing".to_owned(), |kind| kind.to_string())
}

/// Turns a session event into a chat-style message.
pub(crate) fn narrate(event: &Event) -> String {
    match event {
        Event::SessionStarted { candidates } => {
            format!("Entering the fight caves, {candidates} spawn patterns are possible.")
        }
        Event::RoundStarted { round } => format!("Wave {round} has begun."),
        Event::ObservationRecorded {
            location,
            observed: Some(kind),
            ..
        } => format!("I saw a {kind} in the {location}..."),
        Event::ObservationRecorded {
            location,
            observed: None,
            ..
        } => format!("I can see that there is nothing in the {location}..."),
        Event::ObservationConflicted {
            round,
            location,
            previous,
            observed,
        } => format!(
            "Wave {round} {location} was recorded as {}, replacing it with {}.",
            describe(*previous),
            describe(*observed)
        ),
        Event::ObservationDiscarded {
            reason: DiscardReason::UnknownLevel { level },
        } => format!("Ignoring a level {level} monster, it never spawns here."),
        Event::ObservationDiscarded {
            reason: DiscardReason::NoActiveRound,
        } => "Ignoring an observation made before the first wave.".to_owned(),
        Event::CandidatesNarrowed { remaining } => {
            format!("Narrowed down to {remaining} possible spawn patterns, not long now...")
        }
        Event::NoMatchingRoute => {
            "No spawn pattern matches what I have seen, one of the observations is wrong."
                .to_owned()
        }
        Event::RouteSolved { route } => format!(
            "Solved! This is spawn pattern {route}, upcoming spawns will be shown from now on."
        ),
        Event::Paused { round: Some(round) } => {
            format!("The fight caves are paused at wave {round}.")
        }
        Event::Paused { round: None } => "The fight caves are paused.".to_owned(),
        Event::SessionEnded => "Leaving the fight caves.".to_owned(),
    }
}

/// Narrates each event, then the upcoming spawns when a round starts or the
/// route becomes known.
pub(crate) fn session_report(session: &Session, events: &[Event]) -> Vec<String> {
    let mut lines: Vec<String> = events.iter().map(narrate).collect();
    let announce = events
        .iter()
        .any(|event| matches!(event, Event::RoundStarted { .. } | Event::RouteSolved { .. }));
    if announce {
        let next = query::current_round(session).and_then(Round::next);
        if let (Some(round), Some(spawns)) = (next, query::next_spawns(session)) {
            lines.push(format_prediction(round, spawns));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use fight_caves_core::{Command, RouteIndex, SpawnLocation};
    use fight_caves_session as session;
    use fight_caves_system_route_generation::cached_routes;

    fn apply(session: &mut Session, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        session::apply(session, command, &mut events);
        events
    }

    fn round(value: u32) -> Round {
        Round::new(value).expect("round")
    }

    #[test]
    fn spawns_render_in_location_order() {
        let spawns = RoundSpawnMap::from_pairs([
            (SpawnLocation::South, EntityKind::TzKih),
            (SpawnLocation::SouthEast, EntityKind::TzKek),
        ]);
        assert_eq!(
            format_spawns(&spawns),
            "tz-kek in the south-east, tz-kih in the south"
        );
        assert_eq!(format_spawns(&RoundSpawnMap::default()), "nothing");
    }

    #[test]
    fn narrates_sightings_and_progress() {
        assert_eq!(
            narrate(&Event::ObservationRecorded {
                round: Round::FIRST,
                location: SpawnLocation::NorthWest,
                observed: Some(EntityKind::TzKih),
            }),
            "I saw a tz-kih in the north-west..."
        );
        assert_eq!(
            narrate(&Event::CandidatesNarrowed { remaining: 3 }),
            "Narrowed down to 3 possible spawn patterns, not long now..."
        );
        assert!(narrate(&Event::RouteSolved {
            route: RouteIndex::new(3).expect("index"),
        })
        .starts_with("Solved! This is spawn pattern 3"));
    }

    #[test]
    fn narrates_conflicts_with_both_values() {
        let message = narrate(&Event::ObservationConflicted {
            round: Round::LAST,
            location: SpawnLocation::Center,
            previous: None,
            observed: Some(EntityKind::TzTokJad),
        });
        assert_eq!(
            message,
            "Wave 63 center was recorded as nothing, replacing it with tztok-jad."
        );
    }

    #[test]
    fn report_predicts_next_round_once_solved() {
        let mut session = Session::new(cached_routes().expect("routes generate"));
        let _ = apply(&mut session, Command::StartSession);
        let _ = apply(&mut session, Command::StartRound { round: round(1) });

        let events = apply(
            &mut session,
            Command::RecordSighting {
                location: SpawnLocation::NorthWest,
                level: EntityKind::TzKih.level(),
            },
        );
        assert_eq!(
            session_report(&session, &events),
            vec![
                "I saw a tz-kih in the north-west...".to_owned(),
                "Narrowed down to 3 possible spawn patterns, not long now...".to_owned(),
            ]
        );

        let _ = apply(
            &mut session,
            Command::ConfirmVisible {
                locations: vec![SpawnLocation::SouthEast, SpawnLocation::South],
            },
        );
        let started = apply(&mut session, Command::StartRound { round: round(2) });
        assert_eq!(
            session_report(&session, &started),
            vec!["Wave 2 has begun.".to_owned()],
            "nothing is predicted before the route is known"
        );

        let events = apply(
            &mut session,
            Command::RecordSighting {
                location: SpawnLocation::SouthWest,
                level: EntityKind::TzKih.level(),
            },
        );
        let lines = session_report(&session, &events);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Solved! This is spawn pattern 3"));
        assert_eq!(lines[2], "Wave 3 will spawn tz-kek in the south-east.");

        let started = apply(&mut session, Command::StartRound { round: round(3) });
        let lines = session_report(&session, &started);
        assert_eq!(lines[0], "Wave 3 has begun.");
        assert!(lines[1].starts_with("Wave 4 will spawn"));
    }

    #[test]
    fn report_has_no_prediction_after_last_round() {
        let routes = cached_routes().expect("routes generate");
        let mut session = Session::new(routes.clone());
        let _ = apply(&mut session, Command::StartSession);
        for location in SpawnLocation::ALL {
            let _ = apply(
                &mut session,
                Command::RecordObservation {
                    round: Round::FIRST,
                    location,
                    observed: routes[3].round(Round::FIRST).get(location),
                },
            );
        }
        let _ = apply(
            &mut session,
            Command::RecordObservation {
                round: round(2),
                location: SpawnLocation::SouthWest,
                observed: Some(EntityKind::TzKih),
            },
        );
        assert!(query::solved_route(&session).is_some());

        let started = apply(&mut session, Command::StartRound { round: Round::LAST });
        assert_eq!(
            session_report(&session, &started),
            vec!["Wave 63 has begun.".to_owned()]
        );
    }
}
