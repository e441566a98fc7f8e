#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the Fight Caves route oracle.

mod config;
mod persistence;
mod report;
mod script;

use std::{
    io::{self, BufRead},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fight_caves_core::{Command, Event, Round, Route, RouteIndex};
use fight_caves_session::{self as session, query, Session};
use fight_caves_system_route_generation::cached_routes;
use fight_caves_system_route_matching::{predict, solve, Solution};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "fight-caves",
    about = "Predicts Fight Caves spawns from partial observations"
)]
struct Cli {
    /// Configuration file; defaults to `fight-caves.toml` when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Tracing filter overriding the configured default.
    #[arg(long, global = true, value_name = "FILTER")]
    log: Option<String>,
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Prints every spawn pattern, or a single one.
    Routes {
        /// Spawn pattern index in `0..=14`.
        #[arg(long)]
        route: Option<u32>,
    },
    /// Prints the spawns of one round of one spawn pattern.
    Predict {
        /// Spawn pattern index in `0..=14`.
        #[arg(long)]
        route: u32,
        /// Round number in `1..=63`.
        #[arg(long)]
        round: u32,
    },
    /// Reads observations from standard input and narrates progress.
    Session {
        /// File the session is persisted to between runs.
        #[arg(long, value_name = "PATH")]
        snapshot: Option<PathBuf>,
        /// Ignores any persisted session and starts afresh.
        #[arg(long)]
        fresh: bool,
    },
    /// Solves an encoded session or criteria string, or a file holding one.
    Solve {
        /// Encoded snapshot string or path to a file containing it.
        snapshot: String,
    },
}

/// Entry point for the Fight Caves command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(cli.log.as_deref().unwrap_or(&config.log_filter));

    match cli.action {
        Action::Routes { route } => print_routes(route),
        Action::Predict { route, round } => print_prediction(route, round),
        Action::Session { snapshot, fresh } => {
            let path = snapshot.or(config.snapshot_path);
            run_session(path.as_deref(), fresh)
        }
        Action::Solve { snapshot } => print_solution(&snapshot),
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("failed to install tracing subscriber: {error}");
    }
}

fn load_routes() -> Result<Arc<[Route]>> {
    cached_routes().context("failed to generate spawn patterns")
}

fn find_route(routes: &[Route], index: u32) -> Result<&Route> {
    let index = RouteIndex::new(index)?;
    routes
        .iter()
        .find(|route| route.index() == index)
        .with_context(|| format!("spawn pattern {index} was not generated"))
}

fn print_routes(route: Option<u32>) -> Result<()> {
    let routes = load_routes()?;
    match route {
        Some(index) => print!("{}", report::format_route(find_route(&routes, index)?)),
        None => {
            for route in routes.iter() {
                print!("{}", report::format_route(route));
            }
        }
    }
    Ok(())
}

fn print_prediction(route: u32, round: u32) -> Result<()> {
    let routes = load_routes()?;
    let route = find_route(&routes, route)?;
    let round = Round::new(round)?;
    println!("{}", report::format_prediction(round, predict(route, round)));
    Ok(())
}

fn print_solution(argument: &str) -> Result<()> {
    let criteria = persistence::decode_criteria(argument)?;
    debug!(observations = criteria.observation_count(), "solving criteria");

    let routes = load_routes()?;
    match solve(&routes, &criteria) {
        Solution::Solved(route) => print!("{}", report::format_route(route)),
        Solution::Unsolved { candidates: 0 } => {
            println!("{}", report::narrate(&Event::NoMatchingRoute));
        }
        Solution::Unsolved { candidates } => {
            println!("{candidates} spawn patterns still match.");
        }
    }
    Ok(())
}

fn run_session(snapshot_path: Option<&Path>, fresh: bool) -> Result<()> {
    let mut session = Session::new(load_routes()?);
    let mut events = Vec::new();

    let persisted = match snapshot_path {
        Some(path) if !fresh => persistence::load_snapshot(path)?,
        _ => None,
    };
    match persisted {
        Some(snapshot) => session::restore(&mut session, snapshot, &mut events),
        None => session::apply(&mut session, Command::StartSession, &mut events),
    }
    emit(&session, &mut events);

    for (number, line) in io::stdin().lock().lines().enumerate() {
        let line = line.context("failed to read from standard input")?;
        let command = match script::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                warn!(line = number + 1, %error, "skipping script line");
                continue;
            }
        };

        let ending = command == Command::EndSession;
        session::apply(&mut session, command, &mut events);
        emit(&session, &mut events);

        if let Some(path) = snapshot_path {
            if ending {
                persistence::clear_snapshot(path)?;
            } else {
                persistence::save_snapshot(path, &query::snapshot(&session))?;
            }
        }
        if ending {
            break;
        }
    }

    info!(
        observations = query::criteria(&session).observation_count(),
        "session input finished"
    );
    Ok(())
}

/// Prints and drains the narration for the pending events.
fn emit(session: &Session, events: &mut Vec<Event>) {
    for line in report::session_report(session, events) {
        println!("{line}");
    }
    events.clear();
}
