use fight_caves_core::{
    Command, DiscardReason, EntityKind, Event, Round, RouteIndex, SpawnLocation,
};
use fight_caves_session::{self as session, query, Session, SessionSnapshot};
use fight_caves_system_route_generation::cached_routes;
use fight_caves_system_route_matching::Solution;

use SpawnLocation::{Center, NorthWest, South, SouthEast, SouthWest};

fn round(value: u32) -> Round {
    Round::new(value).expect("valid round")
}

fn new_session() -> Session {
    Session::new(cached_routes().expect("routes generate"))
}

fn run(session: &mut Session, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    session::apply(session, command, &mut events);
    events
}

fn sighting(location: SpawnLocation, kind: EntityKind) -> Command {
    Command::RecordSighting {
        location,
        level: kind.level(),
    }
}

/// Plays the first two rounds of route three while watching from the west.
fn play_route_three(session: &mut Session) -> Vec<Event> {
    let mut events = Vec::new();
    for command in [
        Command::StartSession,
        Command::StartRound { round: round(1) },
        sighting(NorthWest, EntityKind::TzKih),
        Command::ConfirmVisible {
            locations: vec![SouthEast, NorthWest, South],
        },
        Command::StartRound { round: round(2) },
        sighting(SouthWest, EntityKind::TzKih),
    ] {
        session::apply(session, command, &mut events);
    }
    events
}

#[test]
fn start_session_reports_all_candidates() {
    let mut session = new_session();
    assert_eq!(
        run(&mut session, Command::StartSession),
        vec![Event::SessionStarted { candidates: 15 }]
    );
    assert_eq!(query::candidates(&session).len(), 15);
    assert_eq!(query::routes(&session).len(), 15);
    assert_eq!(
        query::solution(&session),
        Solution::Unsolved { candidates: 15 }
    );
    assert!(query::solved_route(&session).is_none());
}

#[test]
fn sightings_narrow_then_solve() {
    let mut session = new_session();
    let events = play_route_three(&mut session);

    assert_eq!(
        events,
        vec![
            Event::SessionStarted { candidates: 15 },
            Event::RoundStarted { round: round(1) },
            Event::ObservationRecorded {
                round: round(1),
                location: NorthWest,
                observed: Some(EntityKind::TzKih),
            },
            Event::CandidatesNarrowed { remaining: 3 },
            Event::ObservationRecorded {
                round: round(1),
                location: SouthEast,
                observed: None,
            },
            Event::ObservationRecorded {
                round: round(1),
                location: South,
                observed: None,
            },
            Event::RoundStarted { round: round(2) },
            Event::ObservationRecorded {
                round: round(2),
                location: SouthWest,
                observed: Some(EntityKind::TzKih),
            },
            Event::RouteSolved {
                route: RouteIndex::new(3).expect("index"),
            },
        ]
    );

    let solved = query::solved_route(&session).expect("route solved");
    assert_eq!(solved.index().get(), 3);
    assert_eq!(query::candidates(&session).len(), 1);
    assert_eq!(query::solution(&session), Solution::Solved(solved));
    assert!(std::ptr::eq(solved, &query::routes(&session)[3]));
}

#[test]
fn next_spawns_follow_solved_route() {
    let mut session = new_session();
    let _ = play_route_three(&mut session);

    let next = query::next_spawns(&session).expect("prediction available");
    assert_eq!(next.iter().collect::<Vec<_>>(), vec![(SouthEast, EntityKind::TzKek)]);

    let _ = run(&mut session, Command::StartRound { round: Round::LAST });
    assert!(query::next_spawns(&session).is_none(), "nothing follows round 63");
    assert_eq!(
        query::prediction(&session, Round::LAST)
            .expect("prediction available")
            .get(SouthEast),
        Some(EntityKind::TzTokJad)
    );
}

#[test]
fn solved_state_is_terminal() {
    let mut session = new_session();
    let _ = play_route_three(&mut session);

    let events = run(&mut session, sighting(Center, EntityKind::TzKih));
    assert_eq!(
        events,
        vec![Event::ObservationRecorded {
            round: round(2),
            location: Center,
            observed: Some(EntityKind::TzKih),
        }],
        "solved sessions record but do not re-match"
    );
    assert_eq!(
        query::solved_route(&session).map(|route| route.index().get()),
        Some(3)
    );
}

#[test]
fn unknown_level_is_discarded_without_touching_criteria() {
    let mut session = new_session();
    let _ = run(&mut session, Command::StartSession);
    let _ = run(&mut session, Command::StartRound { round: round(4) });
    let _ = run(&mut session, sighting(South, EntityKind::TzKek));
    let before = query::criteria(&session).clone();

    let events = run(
        &mut session,
        Command::RecordSighting {
            location: Center,
            level: 23,
        },
    );
    assert_eq!(
        events,
        vec![Event::ObservationDiscarded {
            reason: DiscardReason::UnknownLevel { level: 23 },
        }]
    );
    assert_eq!(query::criteria(&session), &before);
}

#[test]
fn sighting_before_first_round_is_discarded() {
    let mut session = new_session();
    let _ = run(&mut session, Command::StartSession);
    assert_eq!(
        run(&mut session, sighting(South, EntityKind::TzKih)),
        vec![Event::ObservationDiscarded {
            reason: DiscardReason::NoActiveRound,
        }]
    );
    assert_eq!(
        run(&mut session, Command::ConfirmVisible { locations: vec![South] }),
        vec![Event::ObservationDiscarded {
            reason: DiscardReason::NoActiveRound,
        }]
    );
    assert!(query::criteria(&session).is_empty());
}

#[test]
fn repeated_observation_emits_nothing() {
    let mut session = new_session();
    let _ = run(&mut session, Command::StartSession);
    let observation = Command::RecordObservation {
        round: round(5),
        location: Center,
        observed: None,
    };
    assert_eq!(run(&mut session, observation.clone()).len(), 2);
    let before = query::candidates(&session).len();

    assert!(run(&mut session, observation).is_empty());
    assert_eq!(query::candidates(&session).len(), before);
}

#[test]
fn conflicting_observation_is_reported_and_overwrites() {
    let mut session = new_session();
    let _ = run(&mut session, Command::StartSession);
    let _ = run(&mut session, Command::StartRound { round: round(1) });
    let _ = run(&mut session, sighting(NorthWest, EntityKind::TzKih));

    let events = run(&mut session, sighting(NorthWest, EntityKind::TzKek));
    assert_eq!(
        events,
        vec![
            Event::ObservationConflicted {
                round: round(1),
                location: NorthWest,
                previous: Some(EntityKind::TzKih),
                observed: Some(EntityKind::TzKek),
            },
            Event::NoMatchingRoute,
        ]
    );
    assert_eq!(
        query::criteria(&session)
            .observation(round(1))
            .and_then(|observation| observation.get(NorthWest)),
        Some(Some(EntityKind::TzKek))
    );
}

#[test]
fn confirm_visible_keeps_recorded_spawns() {
    let mut session = new_session();
    let _ = run(&mut session, Command::StartSession);
    let _ = run(&mut session, Command::StartRound { round: round(1) });
    let _ = run(&mut session, sighting(SouthEast, EntityKind::TzKih));
    let _ = run(
        &mut session,
        Command::ConfirmVisible {
            locations: vec![SouthEast, Center],
        },
    );

    let observation = query::criteria(&session)
        .observation(round(1))
        .cloned()
        .expect("round observed");
    assert_eq!(observation.get(SouthEast), Some(Some(EntityKind::TzKih)));
    assert_eq!(observation.get(Center), Some(None));
}

#[test]
fn paused_snapshot_resumes_at_saved_round() {
    let mut session = new_session();
    let _ = play_route_three(&mut session);
    let events = run(&mut session, Command::Pause);
    assert_eq!(events, vec![Event::Paused { round: Some(round(2)) }]);

    let snapshot = query::snapshot(&session);
    assert!(snapshot.paused);
    let encoded = snapshot.encode().expect("snapshot encodes");

    let mut resumed = new_session();
    let mut events = Vec::new();
    session::restore(
        &mut resumed,
        SessionSnapshot::decode(&encoded).expect("snapshot decodes"),
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::SessionStarted { candidates: 15 },
            Event::RouteSolved {
                route: RouteIndex::new(3).expect("index"),
            },
        ]
    );
    assert_eq!(query::current_round(&resumed), Some(round(2)));
    assert!(!query::is_paused(&resumed));
    assert_eq!(query::criteria(&resumed), query::criteria(&session));
}

#[test]
fn unpaused_snapshot_resumes_one_round_earlier() {
    let mut session = new_session();
    let _ = run(&mut session, Command::StartSession);
    let _ = run(&mut session, Command::StartRound { round: round(1) });
    let _ = run(&mut session, sighting(NorthWest, EntityKind::TzKih));
    let _ = run(&mut session, Command::StartRound { round: round(2) });

    let mut resumed = new_session();
    let mut events = Vec::new();
    session::restore(&mut resumed, query::snapshot(&session), &mut events);

    assert_eq!(
        events,
        vec![
            Event::SessionStarted { candidates: 15 },
            Event::CandidatesNarrowed { remaining: 3 },
        ]
    );
    assert_eq!(query::current_round(&resumed), Some(round(1)));
    assert_eq!(query::snapshot(&resumed).last_round, Some(round(2)));
}

#[test]
fn end_session_discards_everything() {
    let mut session = new_session();
    let _ = play_route_three(&mut session);

    assert_eq!(run(&mut session, Command::EndSession), vec![Event::SessionEnded]);
    assert!(query::criteria(&session).is_empty());
    assert!(query::solved_route(&session).is_none());
    assert_eq!(query::current_round(&session), None);
    assert_eq!(query::candidates(&session).len(), 15);
}
