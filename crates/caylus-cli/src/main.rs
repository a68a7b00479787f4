//! Caylus Magna Carta in the terminal.
//!
//! Usage: caylus [--version standard] [--seed 42] red=human blue=random

use anyhow::Context;
use caylus_core::{Color, Game, GameData, RandomBot, Seat, Version};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod human;
mod render;

use human::Human;
use render::TracingSink;

/// Who decides for a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeatKind {
    Human,
    Random,
}

/// A `<color>[=human|random]` seat argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SeatArg {
    color: Color,
    kind: SeatKind,
}

#[derive(Debug, Error)]
enum SeatArgError {
    #[error(transparent)]
    Color(#[from] caylus_core::player::ParseColorError),

    #[error("unknown player kind `{0}` (expected human or random)")]
    Kind(String),
}

impl FromStr for SeatArg {
    type Err = SeatArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (color, kind) = s.split_once('=').unwrap_or((s, "human"));
        let kind = match kind.to_ascii_lowercase().as_str() {
            "human" => SeatKind::Human,
            "random" => SeatKind::Random,
            other => return Err(SeatArgError::Kind(other.to_string())),
        };
        Ok(Self {
            color: color.parse()?,
            kind,
        })
    }
}

/// Play Caylus Magna Carta against humans and random bots
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// Seats in playing order, e.g. `red=human blue=random`
    #[arg(required = true, num_args = 2..=4)]
    seats: Vec<SeatArg>,

    /// Game data file (defaults to the bundled rules)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Rules version: beginner or standard
    #[arg(long, default_value_t = Version::Standard)]
    version: Version,

    /// Random seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Write every game event as JSON to this file
    #[arg(long)]
    events: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .init();

    let args = Args::parse();

    let data = match &args.data {
        Some(path) => GameData::from_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => GameData::standard().context("loading bundled game data")?,
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(version = %args.version, seed, "starting {}", data.name);

    let seats = args
        .seats
        .iter()
        .enumerate()
        .map(|(i, seat)| match seat.kind {
            SeatKind::Human => Seat::new(seat.color, Human::stdin()),
            SeatKind::Random => Seat::new(seat.color, RandomBot::with_seed(seed.wrapping_add(i as u64 + 1))),
        })
        .collect();

    let game = Game::new(&data, args.version, seats, seed).context("setting up the game")?;
    let sink = TracingSink::new(game.state());
    let mut game = game.with_sink(sink);
    let outcome = game.run()?;

    println!();
    println!("Final scores:");
    for (player, score) in &outcome.scores {
        let color = game.state().players[*player as usize].color.name();
        let mark = if outcome.winners.contains(player) { " *" } else { "" };
        println!("  {color:<7} {score:>3}{mark}");
    }

    if let Some(path) = &args.events {
        let json = serde_json::to_string_pretty(game.events())?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
