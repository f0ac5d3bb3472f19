//! Command player
//!
//! Re-enqueues a recorded session at the pacing it was recorded with.

use std::time::{Duration, Instant};

use super::RecordedSession;
use crate::command::{Command, CommandSink};

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Playback speed multiplier (1.0 = normal)
    pub speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

/// Player state
#[derive(Debug, Default)]
pub struct Player {
    /// Private copy of the session being played
    commands: Vec<Command>,
    config: PlayerConfig,
    started_at: Option<Instant>,
    cursor: usize,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config: PlayerConfig {
                speed: config.speed.clamp(0.1, 10.0),
            },
            ..Self::default()
        }
    }

    /// Start playing `session` now. Returns `false` if it is empty.
    pub fn start(&mut self, session: &RecordedSession) -> bool {
        self.start_at(session, Instant::now())
    }

    pub fn start_at(&mut self, session: &RecordedSession, now: Instant) -> bool {
        if session.is_empty() {
            tracing::info!("No recorded commands to play back");
            return false;
        }

        self.commands = session.commands().to_vec();
        self.cursor = 0;
        self.started_at = Some(now);
        tracing::info!(commands = self.commands.len(), "Playback started");
        true
    }

    /// Stop playback and drop the copied session
    pub fn stop(&mut self) {
        self.commands.clear();
        self.cursor = 0;
        self.started_at = None;
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Enqueue every command that is due. Returns how many were enqueued.
    pub fn update(&mut self, sink: &mut dyn CommandSink) -> usize {
        self.update_at(Instant::now(), sink)
    }

    pub fn update_at(&mut self, now: Instant, sink: &mut dyn CommandSink) -> usize {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let Some(first) = self.commands.first().map(Command::timestamp) else {
            self.stop();
            return 0;
        };

        let elapsed = self.scaled(now.saturating_duration_since(started_at));
        let mut queued = 0;
        while let Some(command) = self.commands.get(self.cursor) {
            if command.timestamp().saturating_duration_since(first) > elapsed {
                break;
            }
            sink.queue_command(command.clone());
            self.cursor += 1;
            queued += 1;
        }

        if self.cursor >= self.commands.len() {
            tracing::info!("Playback finished");
            self.stop();
        }
        queued
    }

    fn scaled(&self, elapsed: Duration) -> Duration {
        if self.config.speed == 1.0 {
            elapsed
        } else {
            elapsed.mul_f32(self.config.speed)
        }
    }

    /// Commands already enqueued
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get playback progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.commands.is_empty() {
            return 0.0;
        }
        self.cursor as f32 / self.commands.len() as f32
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Set the playback speed
    pub fn set_speed(&mut self, speed: f32) {
        self.config.speed = speed.clamp(0.1, 10.0);
    }
}
