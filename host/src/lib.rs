//! Maze game host
//!
//! Everything around the maze itself: the game session with its agents and
//! turns, periodic regeneration, save files, drawing, the timers and the
//! event loop that ties them together.
//!
//! # Example
//! ```no_run
//! use host::{GameConfig, ModeKind, Session, Direction, MoveResult};
//!
//! let config = GameConfig::headless(10, 10, ModeKind::Solo, 2918957128);
//! let mut session = Session::new(&config).unwrap();
//! session.start();
//!
//! for direction in session.request_full_solution().unwrap() {
//!     if let MoveResult::Won(outcome) = session.submit_move(direction) {
//!         println!("{}", outcome.summary());
//!     }
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod persistence;
pub mod regeneration;
pub mod render;
pub mod scheduler;
pub mod session;

pub use command::Command;
pub use config::{Difficulty, GameConfig, ModeKind};
pub use error::GameError;
pub use game_loop::{Frontend, GameEvent, GameLoop, SceneFrontend};
pub use maze_core::{Direction, Maze, Position};
pub use persistence::SavedGame;
pub use regeneration::Regeneration;
pub use render::{ascii_board, draw_scene, format_time, Color, DrawCommand, Renderer};
pub use scheduler::Scheduler;
pub use session::{Agent, AiTurn, Mode, MoveResult, Outcome, Session, SessionState, Turn, Winner};

/// Seconds between maze regenerations
pub const REGENERATION_INTERVAL_SECS: u64 = 180;

/// Longest regeneration interval a config may ask for: one day
pub const MAX_REGENERATION_INTERVAL_SECS: u64 = 86_400;

/// Length of the `next` preview, in moves
pub const NEXT_STEPS: usize = 10;

/// Smallest cell that can still be drawn, in pixels
pub const MIN_CELL_SIZE: u32 = 10;

pub const DEFAULT_CELL_SIZE: u32 = 20;

/// Pause before the AI answers, in milliseconds
pub const AI_MOVE_DELAY_MS: u64 = 500;

pub const DEFAULT_SAVE_FILE: &str = "savegame.json";
