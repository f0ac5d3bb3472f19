//! Chat command - connect to a channel and log what arrives

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use funhouse_core::chat::{ChatClient, ChatStats};
use funhouse_core::config;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STATS_INTERVAL: Duration = Duration::from_secs(30);

/// Arguments for the chat command
#[derive(Args)]
pub struct ChatArgs {
    /// Channel to join (defaults to the configured channel)
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Chat server host
    #[arg(long)]
    pub server: Option<String>,

    /// Chat server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Stop after this many seconds (runs until killed if omitted)
    #[arg(short, long)]
    pub duration: Option<u64>,
}

pub fn execute(args: ChatArgs) -> Result<()> {
    let mut chat_config = config::load().chat;
    if let Some(channel) = args.channel {
        chat_config.channel = channel;
    }
    if let Some(server) = args.server {
        chat_config.server = server;
    }
    if let Some(port) = args.port {
        chat_config.port = port;
    }

    println!(
        "Joining {} on {}:{}",
        chat_config.channel_name(),
        chat_config.server,
        chat_config.port
    );

    let mut client = ChatClient::new(chat_config);
    client.start().context("Failed to start chat client")?;

    let deadline = args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut next_stats = Instant::now() + STATS_INTERVAL;

    while deadline.is_none_or(|deadline| Instant::now() < deadline) {
        for command in client.command_buffer().get_new_commands() {
            println!(
                "[{}] {}: !{} {}",
                chrono::Local::now().format("%H:%M:%S"),
                command.username,
                command.command,
                command.parameters
            );
        }

        if Instant::now() >= next_stats {
            print_stats(&client.stats());
            next_stats += STATS_INTERVAL;
        }

        thread::sleep(POLL_INTERVAL);
    }

    client.stop();
    print_stats(&client.stats());
    Ok(())
}

fn print_stats(stats: &ChatStats) {
    println!("Chat: {}", stats.state);
    if let Some(connected_at) = stats.connected_at {
        println!("  Connected at:     {}", connected_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!("  Messages:         {}", stats.messages_received);
    println!("  Commands:         {}", stats.commands_received);
    println!("  Reconnections:    {}", stats.reconnection_count);
    println!("  Failed connects:  {}", stats.failed_connects);
    if stats.commands_evicted > 0 {
        println!("  Commands dropped: {}", stats.commands_evicted);
    }
}
