use fight_caves_core::{EntityKind, Round};
use fight_caves_system_wave_composition::compose;

fn round(value: u32) -> Round {
    Round::new(value).expect("valid round")
}

#[test]
fn thresholds_sum_to_round_number() {
    for round in Round::all() {
        let entities = compose(round).expect("composition succeeds");
        let total: u32 = entities.iter().map(|kind| kind.first_appearance()).sum();
        assert_eq!(total, round.get(), "round {round} composed as {entities:?}");
    }
}

#[test]
fn entities_are_ordered_by_descending_threshold() {
    for round in Round::all() {
        let entities = compose(round).expect("composition succeeds");
        assert!(
            entities
                .windows(2)
                .all(|pair| pair[0].first_appearance() >= pair[1].first_appearance()),
            "round {round} composed out of order: {entities:?}",
        );
    }
}

#[test]
fn final_round_is_a_single_jad() {
    assert_eq!(compose(Round::LAST), Ok(vec![EntityKind::TzTokJad]));
}

#[test]
fn opening_round_is_a_single_tz_kih() {
    assert_eq!(compose(Round::FIRST), Ok(vec![EntityKind::TzKih]));
}

#[test]
fn round_twenty_two_splits_into_fifteen_and_seven() {
    assert_eq!(
        compose(round(22)),
        Ok(vec![EntityKind::YtMejKot, EntityKind::TokXil])
    );
}

#[test]
fn repeated_thresholds_are_allowed() {
    assert_eq!(
        compose(round(62)),
        Ok(vec![EntityKind::KetZek, EntityKind::KetZek])
    );
    assert_eq!(
        compose(round(58)),
        Ok(vec![
            EntityKind::KetZek,
            EntityKind::YtMejKot,
            EntityKind::TokXil,
            EntityKind::TzKek,
            EntityKind::TzKih,
            EntityKind::TzKih,
        ])
    );
}

#[test]
fn no_round_spawns_more_than_six_entities() {
    let largest = Round::all()
        .map(|round| compose(round).expect("composition succeeds").len())
        .max();
    assert_eq!(largest, Some(6));
}
