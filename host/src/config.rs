use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::{
    AI_MOVE_DELAY_MS, DEFAULT_CELL_SIZE, DEFAULT_SAVE_FILE, MAX_REGENERATION_INTERVAL_SECS,
    MIN_CELL_SIZE, REGENERATION_INTERVAL_SECS,
};

/// Environment variable overriding the save file location
pub const SAVE_FILE_ENV: &str = "MAZE_SAVE_FILE";

/// Environment variable overriding the regeneration interval, in seconds
pub const REGENERATION_SECS_ENV: &str = "MAZE_REGENERATION_SECS";

/// Preset maze sizes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 10x10
    #[default]
    Easy,
    /// 20x20
    Medium,
    /// 30x30
    Hard,
}

impl Difficulty {
    /// Side length of the square maze, in cells
    pub fn size(self) -> usize {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 30,
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" | "1" => Ok(Difficulty::Easy),
            "medium" | "2" => Ok(Difficulty::Medium),
            "hard" | "3" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Invalid difficulty: '{}'. Must be 'easy', 'medium', or 'hard'",
                s
            )),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Who plays: the human alone, or the human against the AI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    #[default]
    Solo,
    Competitive,
}

impl std::str::FromStr for ModeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solo" | "single" | "1" => Ok(ModeKind::Solo),
            "competitive" | "ai" | "2" => Ok(ModeKind::Competitive),
            _ => Err(format!(
                "Invalid mode: '{}'. Must be 'solo' or 'competitive'",
                s
            )),
        }
    }
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModeKind::Solo => write!(f, "solo"),
            ModeKind::Competitive => write!(f, "competitive"),
        }
    }
}

/// Everything needed to set up a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Pixel size of one cell for drawing
    pub cell_size: u32,
    pub mode: ModeKind,
    /// `None` seeds the random source from the clock
    pub seed: Option<u32>,
    /// Period of the elapsed-time tick
    pub tick_interval: Duration,
    /// Period between maze regenerations
    pub regeneration_interval: Duration,
    /// Pause before the AI answers a human move
    pub ai_delay: Duration,
    pub save_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::default(), ModeKind::default())
    }
}

impl GameConfig {
    pub fn from_difficulty(difficulty: Difficulty, mode: ModeKind) -> Self {
        Self {
            width: difficulty.size(),
            height: difficulty.size(),
            cell_size: DEFAULT_CELL_SIZE,
            mode,
            seed: None,
            tick_interval: Duration::from_secs(1),
            regeneration_interval: Duration::from_secs(REGENERATION_INTERVAL_SECS),
            ai_delay: Duration::from_millis(AI_MOVE_DELAY_MS),
            save_path: PathBuf::from(DEFAULT_SAVE_FILE),
        }
    }

    /// Seeded configuration without AI pacing, for tests and scripted play
    pub fn headless(width: usize, height: usize, mode: ModeKind, seed: u32) -> Self {
        Self {
            width,
            height,
            mode,
            seed: Some(seed),
            ai_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Reject settings the game cannot run with
    pub fn validate(&self) -> Result<(), GameError> {
        if self.width < maze_core::MIN_SIZE || self.height < maze_core::MIN_SIZE {
            return Err(GameError::InvalidConfig(format!(
                "maze must be at least {0}x{0}, got {1}x{2}",
                maze_core::MIN_SIZE,
                self.width,
                self.height
            )));
        }
        if self.cell_size < MIN_CELL_SIZE {
            return Err(GameError::InvalidConfig(format!(
                "cell size must be at least {}px, got {}",
                MIN_CELL_SIZE, self.cell_size
            )));
        }
        if self.tick_interval.is_zero() || self.regeneration_interval.is_zero() {
            return Err(GameError::InvalidConfig(
                "tick and regeneration intervals must be non-zero".to_string(),
            ));
        }
        if self.regeneration_interval > Duration::from_secs(MAX_REGENERATION_INTERVAL_SECS) {
            return Err(GameError::InvalidConfig(format!(
                "regeneration interval must be at most {}s, got {}s",
                MAX_REGENERATION_INTERVAL_SECS,
                self.regeneration_interval.as_secs()
            )));
        }
        Ok(())
    }

    /// Apply `MAZE_SAVE_FILE` and `MAZE_REGENERATION_SECS` from the environment
    pub fn with_env_overrides(self) -> Result<Self, GameError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, GameError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(SAVE_FILE_ENV) {
            self.save_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup(REGENERATION_SECS_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                GameError::InvalidConfig(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    REGENERATION_SECS_ENV, secs
                ))
            })?;
            self.regeneration_interval = Duration::from_secs(secs);
        }
        self.validate()?;
        Ok(self)
    }
}
