//! Telegram integration: Bot API transport and Mini App identity

pub mod bot_api;
pub mod webapp_auth;

pub use bot_api::{BotApiError, BotTransport, FileLink, InputPhoto, PhotoUpload, SentMessage, TelegramBotApi};
pub use webapp_auth::{extract_user_unverified, validate_init_data, InitDataError, WebAppUser};
