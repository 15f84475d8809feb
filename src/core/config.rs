use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;
use teloxide::types::ChatId;

use crate::core::error::{AppError, AppResult};

/// Default Bot API base URL
pub const DEFAULT_BOT_API_URL: &str = "https://api.telegram.org";

/// Proof upload configuration
pub mod proof {
    use super::Duration;

    /// Maximum proof photo size (5 MiB in bytes)
    pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

    /// Declared MIME types accepted for proof photos
    pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

    /// Pause between reaching 100% and the completion alert (in milliseconds)
    pub const COMPLETION_DELAY_MS: u64 = 1000;

    /// Completion delay duration
    pub fn completion_delay() -> Duration {
        Duration::from_millis(COMPLETION_DELAY_MS)
    }
}

/// Progress indicator checkpoints for proof submission
pub mod progress {
    /// Upload to the bot has started
    pub const UPLOADING_PERCENT: u8 = 30;

    /// Upload accepted, admin is being notified
    pub const NOTIFYING_PERCENT: u8 = 70;

    /// Submission finished
    pub const DONE_PERCENT: u8 = 100;
}

/// Referral code format
pub mod referral {
    /// Fixed prefix of every generated code
    pub const PREFIX: &str = "DV";

    /// Number of random characters after the prefix
    pub const RANDOM_LEN: usize = 6;

    /// Alphabet for the random part
    pub const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Longest referral parameter accepted from an entry URL
    pub const MAX_ENTRY_CODE_LEN: usize = 32;
}

/// Channel verification gate
pub mod verification {
    use super::Duration;

    /// Local storage key holding the verification flag
    pub const STORAGE_KEY: &str = "channels_verified";

    /// Simulated membership check (in milliseconds)
    pub const SIMULATED_CHECK_MS: u64 = 1500;

    /// Simulated check duration
    pub fn simulated_check() -> Duration {
        Duration::from_millis(SIMULATED_CHECK_MS)
    }
}

/// Document store layout
pub mod storage {
    /// Collection holding user accounts
    pub const USERS_COLLECTION: &str = "users";

    /// Collection holding pending referral hand-offs
    pub const REFERRALS_COLLECTION: &str = "referrals";

    /// Maximum number of pooled SQLite connections
    pub const POOL_MAX_SIZE: u32 = 4;
}

/// Init data validation
pub mod init_data {
    /// Maximum age of signed init data (24 hours, in seconds)
    pub const MAX_AGE_SECS: i64 = 86_400;
}

/// Runtime configuration assembled at startup and handed to the composition root.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bot credential. Never logged.
    pub bot_token: SecretString,
    /// Chat that receives proof photos and notifications
    pub admin_chat_id: ChatId,
    /// Bot API base URL (local Bot API servers are supported)
    pub bot_api_url: String,
    /// SQLite file backing the document store
    pub database_path: String,
    /// JSON file backing client-side persisted state
    pub local_storage_path: String,
    /// Log file path
    pub log_file_path: String,
    /// Allow the synthetic demo account when no Telegram user is present
    pub demo_mode: bool,
    /// Verify the HMAC signature of Mini App init data
    pub validate_init_data: bool,
}

impl AppConfig {
    /// Config with defaults for everything except the credential and admin chat.
    pub fn new(bot_token: impl Into<String>, admin_chat_id: ChatId) -> Self {
        Self {
            bot_token: SecretString::from(bot_token.into()),
            admin_chat_id,
            bot_api_url: DEFAULT_BOT_API_URL.to_string(),
            database_path: "dvtrusted.sqlite".to_string(),
            local_storage_path: "local_storage.json".to_string(),
            log_file_path: "app.log".to_string(),
            demo_mode: false,
            validate_init_data: true,
        }
    }

    /// Reads configuration from the environment.
    ///
    /// Required: `BOT_TOKEN` (or `TELOXIDE_TOKEN`) and `ADMIN_CHAT_ID`.
    /// Optional: `BOT_API_URL`, `DATABASE_PATH`, `LOCAL_STORAGE_PATH`,
    /// `LOG_FILE_PATH`, `DEMO_MODE`, `VALIDATE_INIT_DATA`.
    pub fn from_env() -> AppResult<Self> {
        let bot_token = env::var("BOT_TOKEN")
            .or_else(|_| env::var("TELOXIDE_TOKEN"))
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| AppError::Config("BOT_TOKEN is not set".to_string()))?;

        let raw_admin = env::var("ADMIN_CHAT_ID").map_err(|_| AppError::Config("ADMIN_CHAT_ID is not set".to_string()))?;
        let admin_chat_id = parse_chat_id(&raw_admin)?;

        let mut config = Self::new(bot_token, admin_chat_id);

        if let Some(url) = non_empty_var("BOT_API_URL") {
            config.bot_api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = non_empty_var("DATABASE_PATH") {
            config.database_path = path;
        }
        if let Some(path) = non_empty_var("LOCAL_STORAGE_PATH") {
            config.local_storage_path = path;
        }
        if let Some(path) = non_empty_var("LOG_FILE_PATH") {
            config.log_file_path = path;
        }
        config.demo_mode = bool_var("DEMO_MODE", false);
        config.validate_init_data = bool_var("VALIDATE_INIT_DATA", true);

        Ok(config)
    }

    /// Token for building request URLs.
    pub fn bot_token(&self) -> &str {
        self.bot_token.expose_secret()
    }

    /// Returns true if using a local Bot API server (not api.telegram.org).
    pub fn is_local_bot_api(&self) -> bool {
        !self.bot_api_url.contains("api.telegram.org")
    }
}

fn parse_chat_id(raw: &str) -> AppResult<ChatId> {
    raw.trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| AppError::Config(format!("ADMIN_CHAT_ID must be a numeric chat id, got '{}'", raw)))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn bool_var(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                log::warn!("⚠️  {}='{}' is not a boolean, using {}", key, value, default);
                default
            }
        },
        Err(_) => default,
    }
}
