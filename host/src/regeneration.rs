//! Periodic re-carving of a running game's maze
//!
//! Agents keep their coordinates across a regeneration. The new layout is
//! only kept if every agent can still reach the exit; otherwise the previous
//! maze is put back exactly as it was. An agent the new exit lands on has
//! reached it and wins.

use maze_core::{Maze, MazeError, SimpleLCG};

use crate::session::{Outcome, Session, SessionState, Winner};

/// What a regeneration request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regeneration {
    /// Session not running, or a regeneration already under way
    Skipped,
    Regenerated,
    /// The new layout stranded an agent; the old one was restored
    RolledBack,
    /// The new exit is under an agent. The human wins if both stand there.
    Won(Outcome),
}

impl Session {
    /// Re-carve the maze with the session's random source
    pub fn regenerate(&mut self) -> Regeneration {
        self.regenerate_with(|maze, rng| maze.regenerate(rng))
    }

    /// Run a regeneration with a caller-supplied carving step
    pub fn regenerate_with<F>(&mut self, carve: F) -> Regeneration
    where
        F: FnOnce(&mut Maze, &mut SimpleLCG) -> Result<(), MazeError>,
    {
        if self.regenerating || self.state != SessionState::Running {
            tracing::debug!("regeneration skipped");
            return Regeneration::Skipped;
        }
        self.regenerating = true;

        let snapshot = self.maze.clone();
        let agents = self.mode.positions();

        let result = match carve(&mut self.maze, &mut self.rng) {
            Ok(()) if self.maze.width() != snapshot.width()
                || self.maze.height() != snapshot.height() =>
            {
                tracing::warn!("regeneration changed the maze size, restoring previous layout");
                self.maze = snapshot;
                Regeneration::RolledBack
            }
            Ok(()) => {
                let stranded = agents
                    .iter()
                    .copied()
                    .find(|&position| !matches!(self.maze.exit_reachable_from(position), Ok(true)));
                match stranded {
                    None => Regeneration::Regenerated,
                    Some(position) => {
                        tracing::warn!(
                            "agent at {:?} cannot reach the new exit, restoring previous layout",
                            position
                        );
                        self.maze = snapshot;
                        Regeneration::RolledBack
                    }
                }
            }
            Err(e) => {
                tracing::warn!("regeneration failed: {}, restoring previous layout", e);
                self.maze = snapshot;
                Regeneration::RolledBack
            }
        };

        self.replan_ai();
        self.regenerating = false;
        self.regeneration_due_at = self
            .elapsed_secs
            .saturating_add(self.regeneration_interval_secs);

        if result != Regeneration::Regenerated {
            return result;
        }
        tracing::info!("maze regenerated at {}s", self.elapsed_secs);

        let exit = self.maze.exit();
        if self.mode.human().position() == exit {
            return Regeneration::Won(self.finish(Winner::Human));
        }
        if self.mode.ai().is_some_and(|ai| ai.position() == exit) {
            return Regeneration::Won(self.finish(Winner::Ai));
        }
        Regeneration::Regenerated
    }
}
