//! Recorded command sequences

use std::time::Duration;

use crate::command::Command;

/// Commands in execution order, each keeping its original timestamp
#[derive(Debug, Clone, Default)]
pub struct RecordedSession {
    commands: Vec<Command>,
}

impl RecordedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Offset of command `index` from the first command
    pub fn offset(&self, index: usize) -> Option<Duration> {
        let first = self.commands.first()?;
        let command = self.commands.get(index)?;
        Some(command.timestamp().saturating_duration_since(first.timestamp()))
    }

    /// Time between the first and last command
    pub fn span(&self) -> Duration {
        self.commands
            .len()
            .checked_sub(1)
            .and_then(|last| self.offset(last))
            .unwrap_or_default()
    }
}

impl FromIterator<Command> for RecordedSession {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}
