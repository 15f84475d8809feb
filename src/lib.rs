//! DV Trusted - client core for a Telegram rewards Mini App
//!
//! Users bootstrap an account from their Telegram identity, pass a local
//! channel-verification gate, and submit photo proof of completed tasks to an
//! admin chat through the Bot API.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, and logging
//! - `storage`: Document store (SQLite / in-memory) and local storage
//! - `telegram`: Bot API transport and Mini App init data
//! - `account`: Account schema, referral codes, and the startup flow
//! - `proof`: Proof capture, validation, and submission
//! - `app`: Composition root wiring the above together
//! - `terminal`: Terminal views used by the `dvtrusted` binary

pub mod account;
pub mod app;
pub mod cli;
pub mod core;
pub mod proof;
pub mod storage;
pub mod telegram;
pub mod terminal;

// Re-export commonly used types for convenience
pub use app::App;
pub use crate::core::{AppConfig, AppError, AppResult};
pub use proof::{ProofHandler, ProofTask, ProofView, SubmitOutcome};
pub use storage::{DocumentStore, LocalStorage};
pub use telegram::{BotTransport, TelegramBotApi};
