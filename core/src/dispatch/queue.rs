//! FIFO of pending commands

use std::collections::VecDeque;

use crate::command::{Command, CommandSink};

/// Strict FIFO drained once per tick
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Names of the queued commands, front first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(Command::name)
    }
}

impl CommandSink for CommandQueue {
    fn queue_command(&mut self, command: Command) {
        self.push(command);
    }
}
