//! Command recorder
//!
//! Captures executed commands for later playback.

use super::RecordedSession;
use crate::command::Command;

/// Recorder state
#[derive(Debug, Default)]
pub struct Recorder {
    session: RecordedSession,
    recording: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording, discarding the previous session
    pub fn start(&mut self) {
        self.session.clear();
        self.recording = true;
    }

    /// Stop recording. The session stays available.
    pub fn stop(&mut self) {
        self.recording = false;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Record an executed command. Ignored when not recording or when the
    /// command is not replayable.
    pub fn record(&mut self, command: &Command) {
        if self.recording && command.is_replayable() {
            self.session.push(command.clone());
        }
    }

    pub fn session(&self) -> &RecordedSession {
        &self.session
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.session.is_empty()
    }
}
