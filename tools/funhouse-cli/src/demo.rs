//! Demo command - scripted sandbox session on an in-memory grid
//!
//! Draws two strokes while recording, clears the grid, then replays the
//! recording. Joins chat when it is enabled so viewers can add to the grid.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use funhouse_core::config;
use funhouse_core::input::{InputEvent, KeyCode, Modifiers, MouseButton};
use funhouse_core::sandbox::Sandbox;
use funhouse_shared::{Material, VecGrid};

const TICK_RATE: u32 = 30;

/// Arguments for the demo command
#[derive(Args)]
pub struct DemoArgs {
    /// Session length in seconds
    #[arg(short, long, default_value_t = 10)]
    pub seconds: u64,

    /// Grid width in cells
    #[arg(long, default_value_t = 200)]
    pub width: i32,

    /// Grid height in cells
    #[arg(long, default_value_t = 150)]
    pub height: i32,

    /// Route commands from the configured chat channel even when
    /// `chat.enabled` is off
    #[arg(long)]
    pub chat: bool,
}

/// Scripted input for a single tick
fn script(sandbox: &mut Sandbox, tick: u32, scale: f64, bounds: (i32, i32)) {
    let (width, height) = (f64::from(bounds.0) * scale, f64::from(bounds.1) * scale);
    let key = |sandbox: &mut Sandbox, code: KeyCode| {
        sandbox.process_event(&InputEvent::key_down(code));
        sandbox.process_event(&InputEvent::key_up(code));
    };
    let button = |sandbox: &mut Sandbox, down: bool, x: f64, y: f64| {
        let (button, modifiers) = (MouseButton::Left, Modifiers::empty());
        let event = if down {
            InputEvent::MouseButtonDown { button, modifiers, x, y }
        } else {
            InputEvent::MouseButtonUp { button, modifiers, x, y }
        };
        sandbox.process_event(&event);
    };

    match tick {
        0 => key(sandbox, KeyCode::KeyR),
        1 => {
            key(sandbox, KeyCode::Digit2);
            button(sandbox, true, width * 0.1, height * 0.3);
        }
        2..=30 => {
            let t = f64::from(tick) / 30.0;
            sandbox.process_event(&InputEvent::MouseMotion {
                x: width * (0.1 + 0.8 * t),
                y: height * 0.3,
            });
        }
        31 => {
            button(sandbox, false, width * 0.9, height * 0.3);
            key(sandbox, KeyCode::Digit3);
            key(sandbox, KeyCode::Equal);
            button(sandbox, true, width * 0.5, height * 0.1);
        }
        32..=60 => {
            let t = f64::from(tick - 31) / 30.0;
            sandbox.process_event(&InputEvent::MouseMotion {
                x: width * 0.5,
                y: height * (0.1 + 0.8 * t),
            });
        }
        61 => {
            button(sandbox, false, width * 0.5, height * 0.9);
            key(sandbox, KeyCode::KeyR);
        }
        62 => key(sandbox, KeyCode::KeyC),
        63 => key(sandbox, KeyCode::KeyP),
        _ => {}
    }
}

pub fn execute(args: DemoArgs) -> Result<()> {
    let config = config::load();
    let scale = f64::from(config.input.world_scale.max(1));
    let bounds = (args.width, args.height);

    let mut sandbox = Sandbox::new(&config);
    let mut grid = VecGrid::new(args.width, args.height);

    if args.chat || config.chat.enabled {
        sandbox
            .enable_chat_integration(config.chat.clone())
            .context("Failed to enable chat integration")?;
    }

    let tick_length = Duration::from_secs(1) / TICK_RATE;
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut tick = 0;
    let mut executed = 0;

    while Instant::now() < deadline {
        let started = Instant::now();

        sandbox.update();
        script(&mut sandbox, tick, scale, bounds);
        sandbox.draw_from_mouse(bounds);
        executed += sandbox.execute_commands(Some(&mut grid));

        if tick == 62 {
            tracing::info!(
                sand = grid.count(Material::Sand),
                water = grid.count(Material::Water),
                "Before clear"
            );
        }

        tick += 1;
        if let Some(rest) = tick_length.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    let stats = sandbox.stats();
    sandbox.disable_chat_integration();

    println!("Ran {tick} ticks, executed {executed} commands");
    println!("  Recorded:   {} commands", stats.recorded_commands);
    println!(
        "  Playback:   {} ({:.0}%)",
        if stats.is_playing_back { "running" } else { "idle" },
        stats.playback_progress * 100.0
    );
    println!("  Material:   {}", stats.selected_material);
    println!("  Brush:      {}", stats.brush_size);
    for material in Material::ALL {
        println!("  {:<10}  {} cells", material, grid.count(material));
    }
    if let Some(chat) = stats.chat {
        println!(
            "  Chat:       {} ({} commands)",
            chat.state, chat.commands_received
        );
    }
    Ok(())
}
