//! Timers feeding the game loop
//!
//! Two tasks: one posts `Tick` every tick interval, the other posts
//! `Regenerate` on the regeneration schedule. They only send events; the loop
//! that owns the session decides what to do with them.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::game_loop::GameEvent;

/// Running timer tasks; stopped on drop
pub struct Scheduler {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn both timers. Must be called from inside a tokio runtime.
    ///
    /// # Arguments
    /// * `events` - Channel into the game loop
    /// * `tick_every` - Elapsed-time tick period
    /// * `regenerate_every` - Period between regenerations
    /// * `first_regeneration` - Delay before the first regeneration, so a
    ///   resumed game keeps its schedule
    pub fn start(
        events: UnboundedSender<GameEvent>,
        tick_every: Duration,
        regenerate_every: Duration,
        first_regeneration: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let handles = vec![
            spawn_timer(
                token.clone(),
                events.clone(),
                tick_every,
                tick_every,
                GameEvent::Tick,
            ),
            spawn_timer(
                token.clone(),
                events,
                first_regeneration,
                regenerate_every,
                GameEvent::Regenerate,
            ),
        ];
        tracing::debug!(
            "scheduler started: tick every {:?}, first regeneration in {:?}",
            tick_every,
            first_regeneration
        );

        Self { token, handles }
    }

    /// Cancel both timers. Events already queued stay in the channel.
    pub fn stop(&mut self) {
        self.token.cancel();
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_timer(
    token: CancellationToken,
    events: UnboundedSender<GameEvent>,
    first: Duration,
    period: Duration,
    event: GameEvent,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval_at(Instant::now() + first, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = timer.tick() => {
                    if events.send(event.clone()).is_err() {
                        // Loop is gone
                        break;
                    }
                }
            }
        }
    })
}
