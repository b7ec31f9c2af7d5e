mod game;
mod input;
mod render;
mod snake;
mod state;
mod term;

use std::{fs::File, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{Config, WriteLogger};

pub type TermInt = u16;
pub type TermCoords = (u16, u16);

/// One square of the board. (0, 0) is the center, y grows upward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

/// Cells run from -GRID_RADIUS to GRID_RADIUS on both axes.
pub const GRID_RADIUS: i32 = 10;
pub const GRID_SIZE: i32 = 2 * GRID_RADIUS + 1;

/// Seconds between two moves.
pub const MOVE_INTERVAL: f64 = 0.1;
pub const SPAWN_CELL: Cell = Cell { x: 0, y: -2 };
pub const FRUIT_START: Cell = Cell { x: 0, y: 0 };

#[derive(Parser)]
#[command(name = "gridsnake")]
#[command(version, about = "Snake on a 21x21 grid in your terminal")]
struct Cli {
    /// Pause between frames, in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Seed for fruit placement (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Where log output goes
    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the game, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)
        .context("Failed to initialize logger")?;

    info!("Starting gridsnake (frame pause {} ms, seed {:?})", cli.frame_ms, cli.seed);

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut term = term::TermManager::new()?;
    info!("Terminal size {:?}", term.get_terminal_size());
    term.setup()?;

    let mut game = game::SnakeGame::new(
        term,
        game::SystemClock::new(),
        rng,
        Duration::from_millis(cli.frame_ms),
    );
    let result = game.play();
    info!("Final length {}", game.state().snake().len());

    // Always hand the terminal back, even if the loop failed
    let restored = game.into_frontend().restore();
    if let Err(e) = &result {
        error!("Game loop failed: {:#}", e);
    }
    result?;
    restored?;

    info!("Bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["gridsnake"]);
        assert_eq!(cli.frame_ms, 16);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.log_file, PathBuf::from("snake.log"));
        assert_eq!(cli.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["gridsnake", "--seed", "42", "--log-level", "debug", "--frame-ms", "5"]);
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.log_level, LevelFilter::Debug);
        assert_eq!(cli.frame_ms, 5);
    }

    #[test]
    fn test_grid_constants() {
        assert_eq!(GRID_SIZE, 21);
        assert!(SPAWN_CELL.in_bounds());
    }
}
