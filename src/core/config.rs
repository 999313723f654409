use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::core::error::{AppError, AppResult};

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Log file path
/// Read from LOG_FILE environment variable, defaults to "grabbot.log"
pub static LOG_FILE_PATH: Lazy<String> = Lazy::new(|| env::var("LOG_FILE").unwrap_or_else(|_| "grabbot.log".to_string()));

/// Bot configuration loaded from the config file at startup.
///
/// The file is JSON with a required `BOT_TOKEN` key; a missing or malformed
/// file is fatal. `DOWNLOAD_DIR` is optional and supports `~` expansion.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Telegram bot API token
    #[serde(rename = "BOT_TOKEN")]
    pub bot_token: String,

    /// Directory downloaded files are written to before delivery
    #[serde(rename = "DOWNLOAD_DIR", default = "default_download_dir")]
    pub download_dir: String,
}

fn default_download_dir() -> String {
    "downloads".to_string()
}

impl Config {
    /// Loads the configuration from the given JSON file.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the file cannot be read, is not valid
    /// JSON, or the token is empty. Callers treat this as fatal.
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("failed to parse {}: {}", path.display(), e)))?;

        if config.bot_token.trim().is_empty() {
            return Err(AppError::Config(format!("BOT_TOKEN is empty in {}", path.display())));
        }

        Ok(config)
    }

    /// Downloads directory with `~` expanded.
    pub fn download_dir(&self) -> String {
        shellexpand::tilde(&self.download_dir).into_owned()
    }
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for the interactive title fetch (in seconds). The download
    /// itself is not bounded; whatever yt-dlp defaults to applies there.
    pub const TITLE_FETCH_TIMEOUT_SECS: u64 = 120;

    /// Maximum media-title length used when templating output file names
    pub const MAX_TITLE_LEN: usize = 100;

    /// Title fetch timeout duration
    pub fn title_fetch_timeout() -> Duration {
        Duration::from_secs(TITLE_FETCH_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    /// Long enough that large video uploads do not trip the client timeout
    pub const REQUEST_TIMEOUT_SECS: u64 = 900;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
