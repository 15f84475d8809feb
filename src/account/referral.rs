//! Referral codes and the referral hand-off.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::UserAccount;
use crate::core::config::referral::{CHARSET, MAX_ENTRY_CODE_LEN, PREFIX, RANDOM_LEN};
use crate::core::config::storage::REFERRALS_COLLECTION;
use crate::core::error::AppResult;
use crate::storage::DocumentStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferralCodeError {
    #[error("referral code must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("referral code must start with {0}")]
    Prefix(&'static str),

    #[error("referral code may only contain A-Z and 0-9")]
    Charset,
}

/// `DV` followed by six characters from `A-Z0-9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferralCode(String);

impl ReferralCode {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let mut code = String::with_capacity(PREFIX.len() + RANDOM_LEN);
        code.push_str(PREFIX);
        for _ in 0..RANDOM_LEN {
            code.push(CHARSET[rng.gen_range(0..CHARSET.len())] as char);
        }
        Self(code)
    }

    /// Parses a code exactly as stored (no case folding).
    pub fn parse(raw: &str) -> Result<Self, ReferralCodeError> {
        let expected = PREFIX.len() + RANDOM_LEN;
        if raw.len() != expected {
            return Err(ReferralCodeError::Length {
                expected,
                actual: raw.len(),
            });
        }
        if !raw.starts_with(PREFIX) {
            return Err(ReferralCodeError::Prefix(PREFIX));
        }
        if !raw.bytes().all(|b| CHARSET.contains(&b)) {
            return Err(ReferralCodeError::Charset);
        }
        Ok(Self(raw.to_string()))
    }

    /// Parses a code typed or shared by a human: trimmed and upper-cased first.
    pub fn parse_entry(raw: &str) -> Result<Self, ReferralCodeError> {
        Self::parse(&raw.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receives the `ref` entry parameter of a newly created account.
#[async_trait]
pub trait ReferralProcessor: Send + Sync {
    async fn process_referral(&self, referral_code: &str, new_account: &UserAccount) -> AppResult<()>;
}

/// Records the referral as a pending `referrals/<new user id>` document for
/// the admin process to credit.
pub struct PendingReferrals {
    store: Arc<dyn DocumentStore>,
}

impl PendingReferrals {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReferralProcessor for PendingReferrals {
    async fn process_referral(&self, referral_code: &str, new_account: &UserAccount) -> AppResult<()> {
        if referral_code.len() > MAX_ENTRY_CODE_LEN {
            log::warn!(
                "⚠️ Ignoring oversized referral parameter for user {}",
                new_account.telegram_id
            );
            return Ok(());
        }
        let code = match ReferralCode::parse_entry(referral_code) {
            Ok(code) => code,
            Err(e) => {
                log::warn!(
                    "⚠️ Ignoring referral '{}' for user {}: {}",
                    referral_code,
                    new_account.telegram_id,
                    e
                );
                return Ok(());
            }
        };
        if code.as_str() == new_account.referral_code {
            log::warn!("⚠️ User {} tried to refer themselves", new_account.telegram_id);
            return Ok(());
        }

        let document = json!({
            "referralCode": code.as_str(),
            "referredUser": new_account.telegram_id,
            "createdAt": Utc::now(),
            "status": "pending",
        });
        self.store
            .set(REFERRALS_COLLECTION, &new_account.telegram_id.to_string(), document)
            .await?;

        log::info!(
            "🤝 Referral {} recorded for new user {}",
            code,
            new_account.telegram_id
        );
        Ok(())
    }
}
