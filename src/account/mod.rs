//! User accounts: schema, repository, referral codes, bootstrap

pub mod bootstrap;
pub mod referral;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::config::storage::USERS_COLLECTION;
use crate::core::error::{AppError, AppResult};
use crate::storage::DocumentStore;
use crate::telegram::WebAppUser;
use referral::ReferralCode;

pub use bootstrap::{DashboardText, LaunchContext, Session, SessionMode, SessionView};

/// Three independent sub-balances. No invariant links them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub main: i64,
    pub cash: i64,
    pub bonus: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub total_earned: i64,
    #[serde(default)]
    pub tasks_completed: i64,
    #[serde(default)]
    pub referrals: i64,
    #[serde(default)]
    pub total_withdrawn: i64,
    #[serde(default)]
    pub today_earned: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub notifications: bool,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            theme: "light".to_string(),
        }
    }
}

fn default_language() -> String {
    "bn".to_string()
}

/// A `users/<telegram id>` document.
///
/// Required fields fail deserialization when missing; optional profile
/// fields default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub telegram_id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_language")]
    pub language_code: String,
    pub referral_code: String,
    pub joined_at: DateTime<Utc>,
    pub balance: Balance,
    pub stats: Stats,
    #[serde(default)]
    pub settings: Settings,
}

impl UserAccount {
    /// Fresh account: zero balances, zero stats, default settings.
    pub fn new_for(user: &WebAppUser, referral_code: ReferralCode, joined_at: DateTime<Utc>) -> Self {
        Self {
            telegram_id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
            username: user.username.clone().unwrap_or_default(),
            language_code: user.language_code.clone().unwrap_or_else(default_language),
            referral_code: referral_code.into_string(),
            joined_at,
            balance: Balance::default(),
            stats: Stats::default(),
            settings: Settings::default(),
        }
    }

    /// Hard-coded account shown when the app runs without a Telegram user.
    /// Never written to the store.
    pub fn demo(telegram_id: i64) -> Self {
        Self {
            telegram_id,
            first_name: "Test User".to_string(),
            last_name: String::new(),
            username: String::new(),
            language_code: default_language(),
            referral_code: "DVTRUST123".to_string(),
            joined_at: Utc::now(),
            balance: Balance {
                main: 150,
                cash: 75,
                bonus: 25,
            },
            stats: Stats {
                total_earned: 0,
                tasks_completed: 12,
                referrals: 3,
                total_withdrawn: 200,
                today_earned: 45,
            },
            settings: Settings::default(),
        }
    }

    /// Checks the invariants the store boundary enforces.
    pub fn validate(&self, account_id: &str) -> AppResult<()> {
        if self.telegram_id.to_string() != account_id {
            return Err(AppError::Schema(format!(
                "telegramId {} does not match document id {}",
                self.telegram_id, account_id
            )));
        }
        if self.first_name.trim().is_empty() {
            return Err(AppError::Schema(format!("account {} has an empty firstName", account_id)));
        }
        ReferralCode::parse(&self.referral_code)
            .map_err(|e| AppError::Schema(format!("account {}: {}", account_id, e)))?;
        Ok(())
    }
}

/// Typed access to the `users` collection.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, account_id: &str) -> AppResult<Option<UserAccount>> {
        let Some(document) = self.store.get(USERS_COLLECTION, account_id).await? else {
            return Ok(None);
        };
        let account: UserAccount = serde_json::from_value(document)
            .map_err(|e| AppError::Schema(format!("users/{}: {}", account_id, e)))?;
        account.validate(account_id)?;
        Ok(Some(account))
    }

    pub async fn create(&self, account: &UserAccount) -> AppResult<()> {
        let account_id = account.telegram_id.to_string();
        account.validate(&account_id)?;
        self.store
            .set(USERS_COLLECTION, &account_id, serde_json::to_value(account)?)
            .await
    }
}
