//! Runtime configuration.
//!
//! Every value has a compile-time default and can be overridden through a
//! dedicated environment variable. The data directory resolves as:
//! 1. `DEBUT_DATA_DIR` environment variable
//! 2. `~/.config/debut/data`
//! 3. `./data` (development fallback)

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_DIR: &str = ".config/debut/data";
const DEV_DATA_DIR: &str = "./data";

/// Delay between auto-played plies, in milliseconds.
const DEFAULT_AUTOPLAY_DELAY_MS: u64 = 400;

/// Bounded capacity of a session's command queue.
const DEFAULT_COMMAND_CAPACITY: usize = 32;

/// Capacity of a session's event broadcast before subscribers lag.
const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Smallest auto-play delay; a tokio interval cannot have a zero period.
pub const MIN_AUTO_PLAY_DELAY: Duration = Duration::from_millis(1);

/// Get the data directory for persisted openings.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DEBUT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}

/// Get the directory log files are written to.
///
/// Priority:
/// 1. `DEBUT_LOG_DIR` env variable if set
/// 2. `<data_dir>/logs`
pub fn get_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DEBUT_LOG_DIR") {
        return PathBuf::from(dir);
    }

    get_data_dir().join("logs")
}

/// Get the auto-play delay in milliseconds.
///
/// `DEBUT_AUTOPLAY_DELAY_MS` overrides the default of 400 ms; values that do
/// not parse as a `u64` fall back to the default. Zero is bumped to 1 ms
/// since a tokio interval cannot have a zero period.
pub fn get_autoplay_delay_ms() -> u64 {
    std::env::var("DEBUT_AUTOPLAY_DELAY_MS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_AUTOPLAY_DELAY_MS)
        .max(1)
}

/// Tunables for session actors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeConfig {
    pub auto_play_delay: Duration,
    pub command_capacity: usize,
    pub event_capacity: usize,
}

impl PracticeConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self {
            auto_play_delay: Duration::from_millis(get_autoplay_delay_ms()),
            ..Self::default()
        }
    }

    pub fn with_auto_play_delay(mut self, delay: Duration) -> Self {
        self.auto_play_delay = delay.max(MIN_AUTO_PLAY_DELAY);
        self
    }
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            auto_play_delay: Duration::from_millis(DEFAULT_AUTOPLAY_DELAY_MS),
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
