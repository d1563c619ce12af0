//! Save files
//!
//! A save is a single pretty-printed JSON document. Loading validates the whole
//! document before the running session is touched, so a bad file never leaves
//! a half-restored game behind.

use std::fs;
use std::path::Path;

use maze_core::{Grid, Maze, Opening, Position};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::session::{Agent, Mode, Session, SessionState, Turn};
use crate::MIN_CELL_SIZE;

/// Longest play time a save may record
const MAX_ELAPSED_SECS: u64 = u32::MAX as u64;

/// Everything needed to resume a game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedGame {
    pub width: usize,
    pub height: usize,
    pub cell_size: u32,
    pub grid: Grid,
    pub player: Position,
    /// Present only in competitive games
    pub ai_player: Option<Position>,
    pub entrance: Opening,
    pub exit: Opening,
    pub human_moves: u32,
    pub ai_moves: u32,
    pub elapsed_secs: u64,
    pub competitive: bool,
    pub human_turn: bool,
    pub seconds_until_regeneration: u64,
}

impl SavedGame {
    pub fn from_session(session: &Session) -> Self {
        let maze = session.maze();
        let mode = session.mode();
        Self {
            width: maze.width(),
            height: maze.height(),
            cell_size: session.cell_size(),
            grid: maze.grid().clone(),
            player: mode.human().position(),
            ai_player: mode.ai().map(Agent::position),
            entrance: maze.entrance_opening(),
            exit: maze.exit_opening(),
            human_moves: mode.human().moves(),
            ai_moves: mode.ai().map_or(0, Agent::moves),
            elapsed_secs: session.elapsed_secs(),
            competitive: mode.ai().is_some(),
            human_turn: mode.turn() != Some(Turn::Ai),
            seconds_until_regeneration: session.seconds_until_regeneration(),
        }
    }

    /// Check the save and rebuild the maze and agents from it
    fn into_parts(self) -> Result<(Maze, Mode), GameError> {
        if self.grid.width() != self.width || self.grid.height() != self.height {
            return Err(GameError::CorruptSave(format!(
                "header says {}x{} but grid is {}x{}",
                self.width,
                self.height,
                self.grid.width(),
                self.grid.height()
            )));
        }
        if self.elapsed_secs > MAX_ELAPSED_SECS {
            return Err(GameError::CorruptSave(format!(
                "elapsed time {}s is beyond {}s",
                self.elapsed_secs, MAX_ELAPSED_SECS
            )));
        }
        if self.cell_size < MIN_CELL_SIZE {
            return Err(GameError::CorruptSave(format!(
                "cell size {} is below {}",
                self.cell_size, MIN_CELL_SIZE
            )));
        }

        let maze = Maze::from_parts(self.grid, self.entrance, self.exit)?;

        let mode = match (self.competitive, self.ai_player) {
            (false, None) => Mode::Solo {
                player: Agent::new(self.player, self.human_moves),
            },
            (true, Some(ai)) => Mode::Competitive {
                human: Agent::new(self.player, self.human_moves),
                ai: Agent::new(ai, self.ai_moves),
                turn: if self.human_turn { Turn::Human } else { Turn::Ai },
                plan: Default::default(),
            },
            (competitive, ai) => {
                return Err(GameError::CorruptSave(format!(
                    "competitive flag is {} but AI position is {:?}",
                    competitive, ai
                )))
            }
        };

        for position in mode.positions() {
            if !maze.grid().contains(position) {
                return Err(GameError::CorruptSave(format!(
                    "agent at ({}, {}) is outside the maze",
                    position.x, position.y
                )));
            }
            if position == maze.exit() {
                return Err(GameError::CorruptSave(
                    "game is already finished".to_string(),
                ));
            }
            if !maze.exit_reachable_from(position)? {
                return Err(GameError::CorruptSave(format!(
                    "agent at ({}, {}) cannot reach the exit",
                    position.x, position.y
                )));
            }
        }

        Ok((maze, mode))
    }
}

impl Session {
    /// The session as a save document
    pub fn serialize_state(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(&SavedGame::from_session(self))?)
    }

    /// Replace this session's game with the one in `blob`
    ///
    /// Nothing changes unless the whole document is valid. The restored game
    /// is running and the AI plan is worked out again from scratch.
    pub fn restore_state(&mut self, blob: &str) -> Result<(), GameError> {
        let saved: SavedGame = serde_json::from_str(blob)?;
        let cell_size = saved.cell_size;
        let elapsed_secs = saved.elapsed_secs;
        let until_regeneration = saved
            .seconds_until_regeneration
            .clamp(1, self.regeneration_interval_secs);

        let (maze, mode) = saved.into_parts()?;
        let regeneration_due_at = elapsed_secs
            .checked_add(until_regeneration)
            .ok_or_else(|| GameError::CorruptSave("elapsed time overflows".to_string()))?;

        self.maze = maze;
        self.mode = mode;
        self.cell_size = cell_size;
        self.elapsed_secs = elapsed_secs;
        self.regeneration_due_at = regeneration_due_at;
        self.regenerating = false;
        self.outcome = None;
        self.state = SessionState::Running;
        self.replan_ai();

        tracing::info!(
            "restored {}x{} {} game at {}s",
            self.maze.width(),
            self.maze.height(),
            self.mode.kind(),
            self.elapsed_secs
        );
        Ok(())
    }

    /// Write the save document to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let json = self.serialize_state()?;
        fs::write(path.as_ref(), json)?;
        tracing::info!("game saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Replace this session's game with the one saved at `path`
    pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let blob = fs::read_to_string(path.as_ref())?;
        self.restore_state(&blob)
    }

    /// Resume the game saved at `path`
    pub fn load(path: impl AsRef<Path>, config: &GameConfig) -> Result<Self, GameError> {
        let mut session = Session::new(config)?;
        session.load_from(path)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModeKind;
    use crate::session::MoveResult;
    use serde_json::Value;

    fn played(mode: ModeKind) -> Session {
        let mut session = Session::new(&GameConfig::headless(8, 8, mode, 2024)).unwrap();
        session.start();
        let first = session.request_full_solution().unwrap()[0];
        assert!(matches!(session.submit_move(first), MoveResult::Moved(_)));
        for _ in 0..42 {
            session.tick();
        }
        session
    }

    fn assert_untouched(session: &Session, other: &Session) {
        assert_eq!(session.maze(), other.maze());
        assert_eq!(session.mode(), other.mode());
        assert_eq!(session.elapsed_secs(), other.elapsed_secs());
        assert_eq!(session.state(), other.state());
    }

    #[test]
    fn test_round_trip_restores_competitive_game() {
        let source = played(ModeKind::Competitive);
        assert_eq!(source.mode().turn(), Some(Turn::Ai));
        let blob = source.serialize_state().unwrap();

        let mut restored = Session::new(&GameConfig::headless(3, 3, ModeKind::Solo, 5)).unwrap();
        restored.restore_state(&blob).unwrap();

        assert_eq!(restored.state(), SessionState::Running);
        assert_eq!(restored.maze(), source.maze());
        assert_eq!(restored.elapsed_secs(), 42);
        assert_eq!(restored.seconds_until_regeneration(), 180 - 42);
        assert_eq!(restored.mode().human(), source.mode().human());
        assert_eq!(restored.mode().ai(), source.mode().ai());
        assert_eq!(restored.mode().turn(), Some(Turn::Ai));

        // The plan is recomputed from the AI position
        let ai = restored.mode().ai().unwrap().position();
        let plan: Vec<_> = restored.mode().plan().unwrap().iter().copied().collect();
        assert_eq!(plan, restored.maze().solve(ai).unwrap());
    }

    #[test]
    fn test_save_document_fields() {
        let session = played(ModeKind::Solo);
        let value: Value = serde_json::from_str(&session.serialize_state().unwrap()).unwrap();

        assert_eq!(value["width"], 8);
        assert_eq!(value["competitive"], false);
        assert_eq!(value["human_turn"], true);
        assert_eq!(value["ai_player"], Value::Null);
        assert_eq!(value["human_moves"], 1);
        assert_eq!(value["seconds_until_regeneration"], 138);
        assert_eq!(value["grid"]["walls"].as_array().unwrap().len(), 64);
        assert!(value["grid"].get("visited").is_none());
    }

    #[test]
    fn test_garbage_leaves_session_unchanged() {
        let mut session = played(ModeKind::Solo);
        let before = session.clone();

        let result = session.restore_state("{ not json");
        assert!(matches!(result, Err(GameError::Serialization(_))));
        assert_untouched(&session, &before);
    }

    #[test]
    fn test_inconsistent_walls_rejected() {
        let mut session = played(ModeKind::Solo);
        let before = session.clone();

        let mut value: Value = serde_json::from_str(&session.serialize_state().unwrap()).unwrap();
        let wall = value["grid"]["walls"][0][1].as_bool().unwrap();
        value["grid"]["walls"][0][1] = Value::Bool(!wall);

        assert!(session.restore_state(&value.to_string()).is_err());
        assert_untouched(&session, &before);
    }

    #[test]
    fn test_agent_outside_maze_rejected() {
        let mut session = played(ModeKind::Solo);
        let before = session.clone();

        let mut value: Value = serde_json::from_str(&session.serialize_state().unwrap()).unwrap();
        value["player"]["x"] = Value::from(50);

        assert!(matches!(
            session.restore_state(&value.to_string()),
            Err(GameError::CorruptSave(_))
        ));
        assert_untouched(&session, &before);
    }

    #[test]
    fn test_absurd_elapsed_time_rejected() {
        let mut session = played(ModeKind::Competitive);
        let before = session.clone();

        let mut value: Value = serde_json::from_str(&session.serialize_state().unwrap()).unwrap();
        value["elapsed_secs"] = Value::from(u64::MAX);

        assert!(matches!(
            session.restore_state(&value.to_string()),
            Err(GameError::CorruptSave(_))
        ));
        assert_untouched(&session, &before);
    }

    #[test]
    fn test_overflowing_grid_rejected() {
        let mut session = played(ModeKind::Solo);
        let before = session.clone();

        let mut value: Value = serde_json::from_str(&session.serialize_state().unwrap()).unwrap();
        value["width"] = Value::from(u64::MAX / 2);
        value["grid"]["width"] = Value::from(u64::MAX / 2);
        value["grid"]["height"] = Value::from(4);

        assert!(matches!(
            session.restore_state(&value.to_string()),
            Err(GameError::Serialization(_))
        ));
        assert_untouched(&session, &before);
    }

    #[test]
    fn test_mode_mismatch_rejected() {
        let mut session = played(ModeKind::Solo);
        let mut value: Value = serde_json::from_str(&session.serialize_state().unwrap()).unwrap();
        value["competitive"] = Value::Bool(true);

        assert!(matches!(
            session.restore_state(&value.to_string()),
            Err(GameError::CorruptSave(_))
        ));
        assert_eq!(session.mode().kind(), ModeKind::Solo);
    }

    #[test]
    fn test_finished_game_rejected() {
        let mut session = played(ModeKind::Solo);
        let mut value: Value = serde_json::from_str(&session.serialize_state().unwrap()).unwrap();
        value["player"] = serde_json::to_value(session.maze().exit()).unwrap();

        assert!(matches!(
            session.restore_state(&value.to_string()),
            Err(GameError::CorruptSave(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let mut session = played(ModeKind::Solo);
        let result = session.load_from("/nonexistent/dir/savegame.json");
        assert!(matches!(result, Err(GameError::Io(_))));
        assert_eq!(session.state(), SessionState::Running);
    }
}
