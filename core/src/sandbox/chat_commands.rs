//! Chat commands understood by the sandbox

use funhouse_shared::Material;

use super::commands::{self, stamp};
use super::state::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::chat::{ChatCommand, ChatCommandAdapter};
use crate::command::Command;

/// Names registered by [`register_builtin_commands`]
pub const BUILTIN_COMMANDS: &[&str] = &[
    "air", "brush", "clear", "help", "sand", "spawn", "stone", "water",
];

/// Register `!sand`, `!water`, `!stone`, `!air`, `!clear`, `!brush`,
/// `!spawn` and `!help`.
pub fn register_builtin_commands(adapter: &mut ChatCommandAdapter) {
    for material in Material::ALL {
        adapter.register_command_handler(material.name(), move |chat| {
            Some(chat_command(chat, commands::select_material(material)))
        });
    }

    adapter.register_command_handler("clear", |chat| {
        Some(chat_command(chat, commands::clear_world()))
    });
    adapter.register_command_handler("brush", brush_command);
    adapter.register_command_handler("spawn", spawn_command);

    adapter.register_command_callback("help", |_, user, _, _| {
        let commands = BUILTIN_COMMANDS
            .iter()
            .map(|name| format!("!{name}"))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(user, "Chat commands: {commands}");
    });
}

/// Wrap a local command so it carries the chat metadata and timestamp
fn chat_command(chat: &ChatCommand, inner: Command) -> Command {
    Command::from_chat(chat, move |ctx| inner.execute(ctx))
}

/// `!brush <size>`
fn brush_command(chat: &ChatCommand) -> Option<Command> {
    let Ok(size) = chat.parameters.trim().parse::<i32>() else {
        tracing::warn!(
            user = %chat.username,
            parameters = %chat.parameters,
            "Usage: !brush <{MIN_BRUSH_SIZE}-{MAX_BRUSH_SIZE}>"
        );
        return None;
    };

    Some(Command::from_chat(chat, move |ctx| {
        let size = ctx.state_mut().set_brush_size(size);
        tracing::info!(size, "Brush size");
    }))
}

/// `!spawn <material> <x> <y>`: a brush-sized blob at grid cell `(x, y)`
fn spawn_command(chat: &ChatCommand) -> Option<Command> {
    let Some((material, x, y)) = parse_spawn(&chat.parameters) else {
        tracing::warn!(
            user = %chat.username,
            parameters = %chat.parameters,
            "Usage: !spawn <material> <x> <y>"
        );
        return None;
    };

    Some(Command::from_chat(chat, move |ctx| {
        let brush_size = ctx.state().brush_size;
        if let Some(grid) = ctx.grid() {
            stamp(grid, x, y, brush_size, material);
        }
    }))
}

fn parse_spawn(parameters: &str) -> Option<(Material, i32, i32)> {
    let mut parts = parameters.split_whitespace();
    let material = parts.next()?.parse().ok()?;
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((material, x, y))
}
