//! Line-oriented observation script read by the `session` subcommand.

use anyhow::{bail, Context, Result};
use fight_caves_core::{Command, EntityKind, Round, SpawnLocation};

const EMPTY_TOKEN: &str = "empty";

/// Parses one script line into a session command.
///
/// Blank lines and lines starting with `#` yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Ok(None);
    };
    let arguments: Vec<&str> = tokens.collect();

    let command = match (keyword.to_ascii_lowercase().as_str(), arguments.as_slice()) {
        ("start", []) => Command::StartSession,
        ("round", [round]) => Command::StartRound {
            round: parse_round(round)?,
        },
        ("saw", [location, level]) => Command::RecordSighting {
            location: parse_location(location)?,
            level: level
                .parse()
                .with_context(|| format!("invalid level '{level}'"))?,
        },
        ("empty", [location]) => Command::ConfirmVisible {
            locations: vec![parse_location(location)?],
        },
        ("visible", locations) if !locations.is_empty() => Command::ConfirmVisible {
            locations: locations
                .iter()
                .map(|location| parse_location(location))
                .collect::<Result<_>>()?,
        },
        ("observe", [round, location, observed]) => Command::RecordObservation {
            round: parse_round(round)?,
            location: parse_location(location)?,
            observed: parse_observed(observed)?,
        },
        ("pause", []) => Command::Pause,
        ("exit", []) => Command::EndSession,
        _ => bail!("unrecognised script line '{line}'"),
    };

    Ok(Some(command))
}

fn parse_round(value: &str) -> Result<Round> {
    let number: u32 = value
        .parse()
        .with_context(|| format!("invalid round '{value}'"))?;
    Ok(Round::new(number)?)
}

fn parse_location(value: &str) -> Result<SpawnLocation> {
    Ok(value.parse::<SpawnLocation>()?)
}

fn parse_observed(value: &str) -> Result<Option<EntityKind>> {
    if value.eq_ignore_ascii_case(EMPTY_TOKEN) {
        return Ok(None);
    }
    let level: u32 = value
        .parse()
        .with_context(|| format!("expected a level or '{EMPTY_TOKEN}', found '{value}'"))?;
    Ok(Some(EntityKind::from_level(level)?))
}
