//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A configuration summary logged once at startup

use anyhow::Result;
use simplelog::*;

use crate::core::config::AppConfig;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file =
        fs_err::File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at startup. The bot token is never printed.
pub fn log_configuration(config: &AppConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if config.is_local_bot_api() {
        log::info!("✅ Bot API: local ({})", config.bot_api_url);
    } else {
        log::info!("✅ Bot API: {}", config.bot_api_url);
    }
    log::info!("✅ Admin chat: {}", config.admin_chat_id);
    log::info!("✅ Document store: {}", config.database_path);
    log::info!("✅ Local storage: {}", config.local_storage_path);

    if config.demo_mode {
        log::warn!("⚠️  DEMO_MODE enabled: launches without a Telegram user get a synthetic account");
    }
    if !config.validate_init_data {
        log::warn!("⚠️  VALIDATE_INIT_DATA disabled: init data signatures are NOT checked");
    }
}
