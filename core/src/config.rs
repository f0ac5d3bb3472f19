//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for application settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use funhouse_shared::Material;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::chat::DEFAULT_BUFFER_CAPACITY;
use crate::chat::protocol::normalize_channel;
use crate::input::InputConfig;
use crate::input::keycode_serde::keycode_to_string;

const CONFIG_FILE: &str = "config.toml";

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not determine the config directory")]
    NoConfigDir,
}

/// Application configuration.
///
/// Every section falls back to its defaults when missing, so partial files
/// are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat integration settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Input settings and key bindings
    #[serde(default)]
    pub input: InputConfig,
    /// Initial sandbox tool settings
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

/// Chat connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Connect on startup (default: false)
    #[serde(default)]
    pub enabled: bool,
    /// Channel to join, with or without the leading `#`
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login name; `justinfan*` names log in anonymously
    #[serde(default = "default_nickname")]
    pub nickname: String,
    /// Character that marks a chat message as a command (default: '!')
    #[serde(default = "default_command_prefix")]
    pub command_prefix: char,
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_seconds: u64,
    /// Silence after which the connection is considered dead
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Chat commands retained between ticks
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

/// Initial tool settings for the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default = "default_material")]
    pub material: Material,
    /// Brush diameter in cells (default: 5, range: 1-50)
    #[serde(default = "default_brush_size")]
    pub brush_size: i32,
}

fn default_channel() -> String {
    "funhouse".to_string()
}
fn default_server() -> String {
    "irc.chat.twitch.tv".to_string()
}
fn default_port() -> u16 {
    6667
}
fn default_nickname() -> String {
    "justinfan12345".to_string()
}
fn default_command_prefix() -> char {
    '!'
}
fn default_true() -> bool {
    true
}
fn default_reconnect_delay() -> u64 {
    5
}
fn default_ping_timeout() -> u64 {
    300
}
fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_material() -> Material {
    Material::Sand
}
fn default_brush_size() -> i32 {
    5
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: default_channel(),
            server: default_server(),
            port: default_port(),
            nickname: default_nickname(),
            command_prefix: default_command_prefix(),
            auto_reconnect: default_true(),
            reconnect_delay_seconds: default_reconnect_delay(),
            ping_timeout_seconds: default_ping_timeout(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl ChatConfig {
    /// Channel name carrying the `#` prefix
    pub fn channel_name(&self) -> String {
        normalize_channel(&self.channel)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_seconds)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_seconds)
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            material: default_material(),
            brush_size: default_brush_size(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Funhouse\config`
/// On macOS: `~/Library/Application Support/io.funhouse.Funhouse`
/// On Linux: `~/.config/funhouse`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.funhouse", "", "Funhouse")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Full path of `config.toml` in the platform config directory
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Loads the configuration from disk.
///
/// Returns defaults if the file doesn't exist or cannot be parsed. A file that
/// exists but is invalid is reported with a warning.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    match load_from(&path) {
        Ok(config) => config,
        Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            Config::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Using default config");
            Config::default()
        }
    }
}

/// Load and parse a config file
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Saves the configuration to the platform config directory.
///
/// Returns the path written.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(&path, config)?;
    Ok(path)
}

/// Write `config` to `path`, creating parent directories as needed
pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(write_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(write_err)?;
    Ok(())
}

/// Validate that no keybindings conflict with each other.
///
/// Returns a list of warning messages for any conflicts found.
pub fn validate_keybindings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut used = HashMap::new();

    for (name, key) in config.input.bindings.entries() {
        if let Some(previous) = used.insert(key, name) {
            warnings.push(format!(
                "input.bindings.{name} key '{}' conflicts with input.bindings.{previous}",
                keycode_to_string(key)
            ));
        }
    }

    warnings
}
