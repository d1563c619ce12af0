//! Event loop
//!
//! Owns the session and applies every event to it one at a time: timer ticks,
//! regenerations and player commands all arrive through the same channel, so
//! nothing else ever mutates game state.

use std::time::Duration;

use maze_core::Direction;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::command::Command;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::regeneration::Regeneration;
use crate::render::{draw_scene, Renderer};
use crate::scheduler::Scheduler;
use crate::session::{AiTurn, MoveResult, Outcome, Session, SessionState, Turn};
use crate::NEXT_STEPS;

/// Something for the loop to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// One tick of the elapsed-time clock
    Tick,
    /// The regeneration timer fired
    Regenerate,
    Command(Command),
    /// No more input will arrive
    InputClosed,
}

/// Where the loop shows the game
pub trait Frontend {
    /// Redraw the board, optionally with a path drawn from the human
    fn redraw(&mut self, session: &Session, overlay: Option<&[Direction]>);

    /// Show a line of text to the player
    fn message(&mut self, text: &str);
}

impl<F: Frontend + ?Sized> Frontend for &mut F {
    fn redraw(&mut self, session: &Session, overlay: Option<&[Direction]>) {
        (**self).redraw(session, overlay);
    }

    fn message(&mut self, text: &str) {
        (**self).message(text);
    }
}

/// Frontend drawing through a [`Renderer`] and keeping every message
pub struct SceneFrontend<R> {
    renderer: R,
    messages: Vec<String>,
}

impl<R: Renderer> SceneFrontend<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            messages: Vec::new(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl<R: Renderer> Frontend for SceneFrontend<R> {
    fn redraw(&mut self, session: &Session, overlay: Option<&[Direction]>) {
        draw_scene(session, overlay, &mut self.renderer);
    }

    fn message(&mut self, text: &str) {
        tracing::debug!("{}", text);
        self.messages.push(text.to_string());
    }
}

/// Runs one session to completion
pub struct GameLoop<F: Frontend> {
    session: Session,
    config: GameConfig,
    frontend: F,
    events_tx: UnboundedSender<GameEvent>,
    events_rx: UnboundedReceiver<GameEvent>,
    scheduler: Option<Scheduler>,
}

impl<F: Frontend> GameLoop<F> {
    pub fn new(session: Session, config: GameConfig, frontend: F) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session,
            config,
            frontend,
            events_tx,
            events_rx,
            scheduler: None,
        }
    }

    /// A handle for posting events into the loop
    pub fn sender(&self) -> UnboundedSender<GameEvent> {
        self.events_tx.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Play until the session stops
    ///
    /// # Returns
    /// * `Ok(Some(outcome))` - Someone reached the exit
    /// * `Ok(None)` - The game was quit or input ran out
    /// * `Err` - The maze broke an invariant while solving
    pub async fn run(&mut self) -> Result<Option<Outcome>, GameError> {
        if self.session.state() == SessionState::NotStarted {
            if let Some(outcome) = self.session.start() {
                self.frontend.redraw(&self.session, None);
                self.frontend.message(&outcome.summary());
                return Ok(Some(outcome));
            }
        }

        if self.session.mode().ai().is_some() {
            self.frontend.message("Competitive Mode! Take turns moving.");
            self.frontend.message("Use WASD keys to move, 'q' to quit.");
        }
        self.restart_scheduler();
        self.frontend.redraw(&self.session, None);
        self.play_ai_turn().await;

        while self.session.is_running() {
            let Some(event) = self.events_rx.recv().await else {
                break;
            };
            if let Err(e) = self.handle(event).await {
                self.stop_scheduler();
                self.session.stop();
                return Err(e);
            }
        }

        self.stop_scheduler();
        Ok(self.session.outcome().cloned())
    }

    async fn handle(&mut self, event: GameEvent) -> Result<(), GameError> {
        match event {
            GameEvent::Tick => {
                self.session.tick();
            }
            GameEvent::Regenerate => match self.session.regenerate() {
                Regeneration::Regenerated => {
                    self.frontend.redraw(&self.session, None);
                    self.frontend.message("Maze regenerated! Keep going!");
                }
                Regeneration::RolledBack => {
                    self.frontend.redraw(&self.session, None);
                    self.frontend
                        .message("Maze regeneration undone; the current layout stays.");
                }
                Regeneration::Won(outcome) => {
                    self.frontend.redraw(&self.session, None);
                    self.frontend.message(&outcome.summary());
                }
                Regeneration::Skipped => {}
            },
            GameEvent::Command(command) => self.handle_command(command).await?,
            GameEvent::InputClosed => {
                tracing::info!("input closed");
                self.session.stop();
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: Command) -> Result<(), GameError> {
        match command {
            Command::Move(direction) => match self.session.submit_move(direction) {
                MoveResult::Moved(_) => {
                    self.frontend.redraw(&self.session, None);
                    if self.session.mode().ai().is_some() {
                        let line = self.moves_line();
                        self.frontend.message(&line);
                        self.play_ai_turn().await;
                    }
                }
                MoveResult::Won(outcome) => {
                    self.frontend.redraw(&self.session, None);
                    self.frontend.message(&outcome.summary());
                }
                MoveResult::Blocked => self.frontend.message("You can't move that way."),
                MoveResult::NotYourTurn => self.frontend.message("Wait for the AI to move."),
                MoveResult::Inactive => {}
            },
            Command::Solve => {
                if self.hints_refused() {
                    return Ok(());
                }
                let path = self.session.request_full_solution()?;
                self.show_path(&path, "Showing full path in green...");
            }
            Command::Next => {
                if self.hints_refused() {
                    return Ok(());
                }
                let path = self.session.request_partial_solution(NEXT_STEPS)?;
                self.show_path(&path, "Showing next 10 steps in green...");
            }
            Command::Save => match self.session.save(&self.config.save_path) {
                Ok(()) => self.frontend.message("Game saved successfully."),
                Err(e) => self.frontend.message(&format!("Error saving game: {}", e)),
            },
            Command::Load => match self.session.load_from(&self.config.save_path) {
                Ok(()) => {
                    self.frontend.message("Game loaded successfully.");
                    self.restart_scheduler();
                    self.frontend.redraw(&self.session, None);
                    self.play_ai_turn().await;
                }
                Err(e) => self.frontend.message(&format!("Error loading game: {}", e)),
            },
            Command::Quit => {
                self.session.stop();
                self.frontend.message("Game stopped.");
            }
        }
        Ok(())
    }

    /// Answer on the AI's behalf after the pacing delay, if it is its turn
    async fn play_ai_turn(&mut self) {
        if !self.session.is_running() || self.session.mode().turn() != Some(Turn::Ai) {
            return;
        }
        self.frontend.message("AI's turn...");
        if self.config.ai_delay > Duration::ZERO {
            tokio::time::sleep(self.config.ai_delay).await;
        }

        match self.session.take_ai_turn() {
            AiTurn::Moved(_) | AiTurn::Idle => {
                self.frontend.redraw(&self.session, None);
                let line = self.moves_line();
                self.frontend.message(&line);
            }
            AiTurn::Won(outcome) => {
                self.frontend.redraw(&self.session, None);
                self.frontend.message(&outcome.summary());
            }
            AiTurn::NotAiTurn | AiTurn::Inactive => {}
        }
    }

    fn hints_refused(&mut self) -> bool {
        let refused = self.session.mode().ai().is_some();
        if refused {
            self.frontend
                .message("Hints are not available in competitive mode.");
        }
        refused
    }

    fn show_path(&mut self, path: &[Direction], label: &str) {
        if path.is_empty() {
            self.frontend.message("No solution found!");
            return;
        }
        self.frontend.message(label);
        self.frontend.redraw(&self.session, Some(path));
    }

    fn moves_line(&self) -> String {
        let mode = self.session.mode();
        format!(
            "Moves - You: {}, AI: {}",
            mode.human().moves(),
            mode.ai().map_or(0, |ai| ai.moves())
        )
    }

    /// The regeneration period comes from the session, so the timer fires
    /// when `seconds_until_regeneration` says it will.
    fn restart_scheduler(&mut self) {
        self.stop_scheduler();
        let first = Duration::from_secs(self.session.seconds_until_regeneration());
        let every = Duration::from_secs(self.session.regeneration_interval_secs());
        self.scheduler = Some(Scheduler::start(
            self.events_tx.clone(),
            self.config.tick_interval,
            every,
            first,
        ));
    }

    fn stop_scheduler(&mut self) {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModeKind;
    use crate::render::{Color, DrawCommand};

    type Recorder = SceneFrontend<Vec<DrawCommand>>;

    fn game(mode: ModeKind) -> GameLoop<Recorder> {
        let config = GameConfig::headless(8, 8, mode, 77);
        let session = Session::new(&config).unwrap();
        GameLoop::new(session, config, SceneFrontend::new(Vec::new()))
    }

    fn send(game: &GameLoop<Recorder>, commands: &[Command]) {
        let tx = game.sender();
        for &command in commands {
            tx.send(GameEvent::Command(command)).unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_stops_without_outcome() {
        let mut game = game(ModeKind::Solo);
        send(&game, &[Command::Quit]);

        assert_eq!(game.run().await.unwrap(), None);
        assert_eq!(game.session().state(), SessionState::Stopped);
        assert_eq!(game.frontend().messages().last().unwrap(), "Game stopped.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_closed_stops() {
        let mut game = game(ModeKind::Solo);
        game.sender().send(GameEvent::InputClosed).unwrap();
        assert_eq!(game.run().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hints_refused_in_competitive() {
        let mut game = game(ModeKind::Competitive);
        send(&game, &[Command::Solve, Command::Next, Command::Quit]);
        game.run().await.unwrap();

        let refused = game
            .frontend()
            .messages()
            .iter()
            .filter(|m| m.contains("not available"))
            .count();
        assert_eq!(refused, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_draws_overlay() {
        let mut game = game(ModeKind::Solo);
        send(&game, &[Command::Next, Command::Quit]);
        game.run().await.unwrap();

        assert!(game
            .frontend()
            .messages()
            .iter()
            .any(|m| m == "Showing next 10 steps in green..."));
        // Entrance and path share a colour
        let green = game
            .frontend()
            .renderer()
            .iter()
            .filter(|c| **c == DrawCommand::SetColor { color: Color::PATH })
            .count();
        assert_eq!(green, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_and_regeneration_reach_session() {
        let mut game = game(ModeKind::Solo);
        let tx = game.sender();
        tx.send(GameEvent::Tick).unwrap();
        tx.send(GameEvent::Tick).unwrap();
        tx.send(GameEvent::Regenerate).unwrap();
        tx.send(GameEvent::Command(Command::Quit)).unwrap();
        tx.send(GameEvent::Tick).unwrap();

        game.run().await.unwrap();

        assert_eq!(game.session().elapsed_secs(), 2);
        assert!(game
            .frontend()
            .messages()
            .iter()
            .any(|m| m == "Maze regenerated! Keep going!"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_drive_the_clock() {
        let mut game = game(ModeKind::Solo);
        let tx = game.sender();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3500)).await;
            let _ = tx.send(GameEvent::Command(Command::Quit));
        });

        game.run().await.unwrap();
        assert_eq!(game.session().elapsed_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regeneration_timer_follows_session_interval() {
        let mut config = GameConfig::headless(8, 8, ModeKind::Solo, 77);
        config.regeneration_interval = Duration::from_secs(3);
        let session = Session::new(&config).unwrap();
        let mut game = GameLoop::new(session, config, SceneFrontend::new(Vec::new()));
        let tx = game.sender();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(7500)).await;
            let _ = tx.send(GameEvent::Command(Command::Quit));
        });

        let outcome = game.run().await.unwrap();
        let regenerated = game
            .frontend()
            .messages()
            .iter()
            .filter(|m| *m == "Maze regenerated! Keep going!")
            .count();

        // A regeneration can end the game by putting the exit under the player
        if outcome.is_none() {
            assert_eq!(regenerated, 2);
            assert_eq!(game.session().elapsed_secs(), 7);
            assert!((1..=3).contains(&game.session().seconds_until_regeneration()));
        } else {
            assert!(regenerated <= 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_competitive_move_triggers_ai_turn() {
        let mut game = game(ModeKind::Competitive);
        let first = game.session().request_full_solution().unwrap()[0];
        send(&game, &[Command::Move(first), Command::Quit]);
        game.run().await.unwrap();

        let mode = game.session().mode();
        assert_eq!(mode.human().moves(), 1);
        assert_eq!(mode.ai().unwrap().moves(), 1);
        assert_eq!(mode.turn(), Some(Turn::Human));
        assert!(game
            .frontend()
            .messages()
            .iter()
            .any(|m| m == "Moves - You: 1, AI: 1"));
    }
}
