//! Game state machine
//!
//! A session owns the maze, the shared random source and the agents. It moves
//! `NotStarted -> Running -> Stopped` and never back; every mutating call is a
//! no-op outside `Running`. Illegal moves are reported, not treated as errors.

use std::collections::VecDeque;

use maze_core::{Direction, Maze, MazeError, Path, Position, SimpleLCG};

use crate::config::{GameConfig, ModeKind};
use crate::error::GameError;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Stopped,
}

/// Whose move it is in competitive mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Human,
    Ai,
}

/// A position plus the number of moves made to get there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    position: Position,
    moves: u32,
}

impl Agent {
    pub(crate) fn new(position: Position, moves: u32) -> Self {
        Self { position, moves }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Step in `direction` if the maze allows it
    fn try_move(&mut self, maze: &Maze, direction: Direction) -> bool {
        if !maze.grid().can_move(self.position, direction) {
            return false;
        }
        match self.position.step(direction) {
            Some(next) => {
                self.position = next;
                self.moves = self.moves.saturating_add(1);
                true
            }
            None => false,
        }
    }
}

/// Players in the session, fixed at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Solo {
        player: Agent,
    },
    Competitive {
        human: Agent,
        ai: Agent,
        turn: Turn,
        /// Moves the AI still intends to make
        plan: VecDeque<Direction>,
    },
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Solo { .. } => ModeKind::Solo,
            Mode::Competitive { .. } => ModeKind::Competitive,
        }
    }

    pub fn human(&self) -> &Agent {
        match self {
            Mode::Solo { player } => player,
            Mode::Competitive { human, .. } => human,
        }
    }

    pub fn ai(&self) -> Option<&Agent> {
        match self {
            Mode::Solo { .. } => None,
            Mode::Competitive { ai, .. } => Some(ai),
        }
    }

    pub fn turn(&self) -> Option<Turn> {
        match self {
            Mode::Solo { .. } => None,
            Mode::Competitive { turn, .. } => Some(*turn),
        }
    }

    pub fn plan(&self) -> Option<&VecDeque<Direction>> {
        match self {
            Mode::Solo { .. } => None,
            Mode::Competitive { plan, .. } => Some(plan),
        }
    }

    /// Positions of every agent on the board
    pub fn positions(&self) -> Vec<Position> {
        match self {
            Mode::Solo { player } => vec![player.position],
            Mode::Competitive { human, ai, .. } => vec![human.position, ai.position],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Human,
    Ai,
}

/// How a finished game ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub winner: Winner,
    pub elapsed_secs: u64,
    pub human_moves: u32,
    /// `None` in solo games
    pub ai_moves: Option<u32>,
}

impl Outcome {
    pub fn summary(&self) -> String {
        match (self.winner, self.ai_moves) {
            (Winner::Human, None) => format!(
                "Congratulations! You completed the maze in {} seconds.",
                self.elapsed_secs
            ),
            (Winner::Human, Some(ai_moves)) => format!(
                "Game Over! You win in {} moves!\nTime elapsed: {} seconds\nAI moves: {}",
                self.human_moves, self.elapsed_secs, ai_moves
            ),
            (Winner::Ai, ai_moves) => format!(
                "Game Over! AI wins in {} moves!\nTime elapsed: {} seconds\nYour moves: {}",
                ai_moves.unwrap_or(0),
                self.elapsed_secs,
                self.human_moves
            ),
        }
    }
}

/// Result of a human move request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    Moved(Position),
    /// Wall or grid edge in the way; nothing changed
    Blocked,
    /// Competitive game waiting for the AI
    NotYourTurn,
    /// Session not running
    Inactive,
    Won(Outcome),
}

/// Result of an AI turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiTurn {
    Moved(Direction),
    /// Nothing planned, or the planned move was not legal; the turn still passes
    Idle,
    Won(Outcome),
    NotAiTurn,
    Inactive,
}

/// One game from setup to outcome
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) maze: Maze,
    pub(crate) rng: SimpleLCG,
    pub(crate) mode: Mode,
    pub(crate) state: SessionState,
    pub(crate) elapsed_secs: u64,
    pub(crate) cell_size: u32,
    pub(crate) regeneration_interval_secs: u64,
    /// Elapsed second at which the next regeneration is due
    pub(crate) regeneration_due_at: u64,
    pub(crate) regenerating: bool,
    pub(crate) outcome: Option<Outcome>,
}

impl Session {
    /// Generate a maze and place every agent at its entrance
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => SimpleLCG::new(seed),
            None => SimpleLCG::from_time(),
        };
        let maze = Maze::generate(config.width, config.height, &mut rng)?;
        let entrance = maze.entrance();

        let mode = match config.mode {
            ModeKind::Solo => Mode::Solo {
                player: Agent::new(entrance, 0),
            },
            ModeKind::Competitive => Mode::Competitive {
                human: Agent::new(entrance, 0),
                ai: Agent::new(entrance, 0),
                turn: Turn::Human,
                plan: VecDeque::new(),
            },
        };

        let regeneration_interval_secs = config.regeneration_interval.as_secs().max(1);
        let mut session = Self {
            maze,
            rng,
            mode,
            state: SessionState::NotStarted,
            elapsed_secs: 0,
            cell_size: config.cell_size,
            regeneration_interval_secs,
            regeneration_due_at: regeneration_interval_secs,
            regenerating: false,
            outcome: None,
        };
        session.replan_ai();

        tracing::info!(
            "new {} game on a {}x{} maze",
            config.mode,
            config.width,
            config.height
        );
        Ok(session)
    }

    /// Begin play. A human already standing on the exit wins on the spot.
    pub fn start(&mut self) -> Option<Outcome> {
        if self.state != SessionState::NotStarted {
            return None;
        }
        self.state = SessionState::Running;
        tracing::info!("game started");

        if self.mode.human().position == self.maze.exit() {
            return Some(self.finish(Winner::Human));
        }
        None
    }

    /// Move the human one cell
    pub fn submit_move(&mut self, direction: Direction) -> MoveResult {
        if self.state != SessionState::Running {
            return MoveResult::Inactive;
        }

        let maze = &self.maze;
        let moved = match &mut self.mode {
            Mode::Solo { player } => player.try_move(maze, direction),
            Mode::Competitive { human, turn, .. } => {
                if *turn != Turn::Human {
                    return MoveResult::NotYourTurn;
                }
                human.try_move(maze, direction)
            }
        };
        if !moved {
            tracing::debug!("move {:?} blocked", direction);
            return MoveResult::Blocked;
        }

        let position = self.mode.human().position;
        if position == self.maze.exit() {
            return MoveResult::Won(self.finish(Winner::Human));
        }
        if let Mode::Competitive { turn, .. } = &mut self.mode {
            *turn = Turn::Ai;
        }
        MoveResult::Moved(position)
    }

    /// Play the AI's next planned move. The turn goes back to the human either way.
    pub fn take_ai_turn(&mut self) -> AiTurn {
        if self.state != SessionState::Running {
            return AiTurn::Inactive;
        }

        let maze = &self.maze;
        match &mut self.mode {
            Mode::Competitive { ai, turn, plan, .. } if *turn == Turn::Ai => {
                *turn = Turn::Human;
                let Some(direction) = plan.pop_front() else {
                    return AiTurn::Idle;
                };
                if !ai.try_move(maze, direction) {
                    tracing::warn!("AI plan step {:?} is blocked, dropping plan", direction);
                    plan.clear();
                    return AiTurn::Idle;
                }
                if ai.position != maze.exit() {
                    return AiTurn::Moved(direction);
                }
            }
            _ => return AiTurn::NotAiTurn,
        }

        AiTurn::Won(self.finish(Winner::Ai))
    }

    /// Count one second of play
    pub fn tick(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        true
    }

    /// End the game without a winner. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state != SessionState::Stopped {
            tracing::info!("game stopped after {} seconds", self.elapsed_secs);
        }
        self.state = SessionState::Stopped;
        if let Mode::Competitive { plan, .. } = &mut self.mode {
            plan.clear();
        }
    }

    /// Stop and zero the clock; positions and move counters stay
    pub fn reset(&mut self) {
        self.stop();
        self.elapsed_secs = 0;
        self.regeneration_due_at = self.regeneration_interval_secs;
    }

    /// Full path from the human's position to the exit
    pub fn request_full_solution(&self) -> Result<Path, MazeError> {
        let start = self.mode.human().position;
        let path = self.maze.solve(start)?;
        self.warn_if_unsolved(start, &path, 1);
        Ok(path)
    }

    /// The first `steps` moves of the full solution
    pub fn request_partial_solution(&self, steps: usize) -> Result<Path, MazeError> {
        let start = self.mode.human().position;
        let path = self.maze.first_steps(start, steps)?;
        self.warn_if_unsolved(start, &path, steps);
        Ok(path)
    }

    fn warn_if_unsolved(&self, start: Position, path: &[Direction], steps: usize) {
        if path.is_empty() && steps > 0 && start != self.maze.exit() {
            tracing::warn!("No solution found from {:?}; maze is not connected", start);
        }
    }

    /// Point the AI's plan at the exit from where it stands now
    pub(crate) fn replan_ai(&mut self) {
        let maze = &self.maze;
        if let Mode::Competitive { ai, plan, .. } = &mut self.mode {
            plan.clear();
            match maze.solve(ai.position) {
                Ok(path) => plan.extend(path),
                Err(e) => tracing::warn!("could not plan AI path: {}", e),
            }
        }
    }

    pub(crate) fn finish(&mut self, winner: Winner) -> Outcome {
        let outcome = Outcome {
            winner,
            elapsed_secs: self.elapsed_secs,
            human_moves: self.mode.human().moves,
            ai_moves: self.mode.ai().map(Agent::moves),
        };
        self.stop();
        tracing::info!("game won by {:?}", winner);
        self.outcome = Some(outcome.clone());
        outcome
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_regenerating(&self) -> bool {
        self.regenerating
    }

    pub fn regeneration_interval_secs(&self) -> u64 {
        self.regeneration_interval_secs
    }

    pub fn seconds_until_regeneration(&self) -> u64 {
        self.regeneration_due_at.saturating_sub(self.elapsed_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(mode: ModeKind) -> Session {
        let mut session = Session::new(&GameConfig::headless(10, 10, mode, 2918957128)).unwrap();
        assert_eq!(session.start(), None);
        session
    }

    fn blocked_direction(session: &Session) -> Direction {
        let here = session.mode().human().position();
        Direction::ALL
            .into_iter()
            .find(|&dir| !session.maze().grid().can_move(here, dir))
            .unwrap()
    }

    #[test]
    fn test_new_session_waits_at_entrance() {
        let mut session = Session::new(&GameConfig::headless(6, 4, ModeKind::Competitive, 7)).unwrap();

        assert_eq!(session.state(), SessionState::NotStarted);
        assert_eq!(session.mode().human().position(), session.maze().entrance());
        assert_eq!(session.mode().ai().unwrap().position(), session.maze().entrance());
        assert_eq!(session.mode().turn(), Some(Turn::Human));
        assert!(!session.mode().plan().unwrap().is_empty());

        assert_eq!(session.submit_move(Direction::Up), MoveResult::Inactive);
        assert!(!session.tick());
    }

    #[test]
    fn test_solo_follow_solution_wins() {
        let mut session = session(ModeKind::Solo);
        let path = session.request_full_solution().unwrap();
        assert!(!path.is_empty());

        session.tick();
        session.tick();
        let (last, rest) = path.split_last().unwrap();
        for &dir in rest {
            assert!(matches!(session.submit_move(dir), MoveResult::Moved(_)));
        }

        let outcome = match session.submit_move(*last) {
            MoveResult::Won(outcome) => outcome,
            other => panic!("expected a win, got {:?}", other),
        };
        assert_eq!(outcome.winner, Winner::Human);
        assert_eq!(outcome.human_moves as usize, path.len());
        assert_eq!(outcome.ai_moves, None);
        assert_eq!(outcome.elapsed_secs, 2);
        assert_eq!(
            outcome.summary(),
            "Congratulations! You completed the maze in 2 seconds."
        );
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(session.outcome(), Some(&outcome));

        // Finished games ignore further input
        assert_eq!(session.submit_move(path[0].opposite()), MoveResult::Inactive);
    }

    #[test]
    fn test_blocked_move_changes_nothing() {
        let mut session = session(ModeKind::Solo);
        let before = session.mode().clone();

        assert_eq!(
            session.submit_move(blocked_direction(&session)),
            MoveResult::Blocked
        );
        assert_eq!(session.mode(), &before);
    }

    #[test]
    fn test_competitive_turns_alternate() {
        let mut session = session(ModeKind::Competitive);
        let first = session.request_full_solution().unwrap()[0];

        assert_eq!(session.take_ai_turn(), AiTurn::NotAiTurn);
        assert!(matches!(session.submit_move(first), MoveResult::Moved(_)));
        assert_eq!(session.mode().turn(), Some(Turn::Ai));
        assert_eq!(session.submit_move(first.opposite()), MoveResult::NotYourTurn);

        assert!(matches!(session.take_ai_turn(), AiTurn::Moved(_)));
        assert_eq!(session.mode().turn(), Some(Turn::Human));
        assert_eq!(session.mode().ai().unwrap().moves(), 1);
    }

    #[test]
    fn test_illegal_competitive_move_keeps_the_turn() {
        let mut session = session(ModeKind::Competitive);
        assert_eq!(
            session.submit_move(blocked_direction(&session)),
            MoveResult::Blocked
        );
        assert_eq!(session.mode().turn(), Some(Turn::Human));
        assert_eq!(session.mode().human().moves(), 0);
    }

    #[test]
    fn test_empty_plan_still_passes_turn() {
        let mut session = session(ModeKind::Competitive);
        let first = session.request_full_solution().unwrap()[0];
        if let Mode::Competitive { plan, .. } = &mut session.mode {
            plan.clear();
        }

        session.submit_move(first);
        assert_eq!(session.take_ai_turn(), AiTurn::Idle);
        assert_eq!(session.mode().turn(), Some(Turn::Human));
        assert_eq!(session.mode().ai().unwrap().moves(), 0);
    }

    #[test]
    fn test_ai_wins_race() {
        let mut session = session(ModeKind::Competitive);
        let path = session.request_full_solution().unwrap();
        assert!(path.len() > 2);

        // The human shuffles back and forth while the AI follows its plan
        let mut ai_turns = 0;
        let outcome = loop {
            let dir = if ai_turns % 2 == 0 { path[0] } else { path[0].opposite() };
            assert!(matches!(session.submit_move(dir), MoveResult::Moved(_)));
            ai_turns += 1;
            match session.take_ai_turn() {
                AiTurn::Moved(_) => continue,
                AiTurn::Won(outcome) => break outcome,
                other => panic!("unexpected AI turn {:?}", other),
            }
        };

        assert_eq!(ai_turns, path.len());
        assert_eq!(outcome.winner, Winner::Ai);
        assert_eq!(outcome.ai_moves, Some(path.len() as u32));
        assert_eq!(outcome.human_moves, path.len() as u32);
        assert!(outcome.summary().starts_with("Game Over! AI wins in"));
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.mode().plan().unwrap().is_empty());
    }

    #[test]
    fn test_single_cell_game_is_won_at_start() {
        let mut session = Session::new(&GameConfig::headless(1, 1, ModeKind::Solo, 3)).unwrap();
        let outcome = session.start().unwrap();

        assert_eq!(outcome.winner, Winner::Human);
        assert_eq!(outcome.human_moves, 0);
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.request_full_solution().unwrap().is_empty());
    }

    #[test]
    fn test_tick_stop_and_reset() {
        let mut session = session(ModeKind::Solo);
        let first = session.request_full_solution().unwrap()[0];
        session.submit_move(first);
        for _ in 0..5 {
            assert!(session.tick());
        }
        assert_eq!(session.elapsed_secs(), 5);
        assert_eq!(session.seconds_until_regeneration(), 175);

        session.stop();
        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(!session.tick());
        assert_eq!(session.elapsed_secs(), 5);

        session.reset();
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.mode().human().moves(), 1);
        assert_eq!(session.start(), None);
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn test_partial_solution_is_prefix() {
        let session = session(ModeKind::Solo);
        let full = session.request_full_solution().unwrap();

        let next = session.request_partial_solution(crate::NEXT_STEPS).unwrap();
        assert_eq!(next.len(), full.len().min(crate::NEXT_STEPS));
        assert_eq!(next[..], full[..next.len()]);

        let all = session.request_partial_solution(full.len() + 3).unwrap();
        assert_eq!(all, full);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig::headless(0, 5, ModeKind::Solo, 1);
        assert!(matches!(
            Session::new(&config),
            Err(GameError::InvalidConfig(_))
        ));
    }
}
