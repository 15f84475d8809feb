//! Startup flow: identity → verification gate → account upsert → dashboard.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::referral::{ReferralCode, ReferralProcessor};
use super::{UserAccount, UserRepository};
use crate::core::config::{verification, AppConfig};
use crate::core::error::{AppError, AppResult};
use crate::storage::LocalStorage;
use crate::telegram::{extract_user_unverified, validate_init_data, WebAppUser};

/// Currency label used in dashboard amounts
pub const CURRENCY_LABEL: &str = "টাকা";

/// What the host knows at launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchContext {
    /// Raw `Telegram.WebApp.initData`
    pub init_data: Option<String>,
    /// Page URL the Mini App was opened with
    pub entry_url: Option<Url>,
}

impl LaunchContext {
    /// `ref` query parameter of the entry URL, if non-empty.
    pub fn referral_param(&self) -> Option<String> {
        self.entry_url.as_ref().and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "ref")
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.trim().is_empty())
        })
    }
}

/// Screen operations the bootstrap flow drives.
pub trait SessionView {
    fn show_loading(&mut self, message: &str);
    fn hide_loading(&mut self);
    fn show_verification_screen(&mut self);
    fn show_main_content(&mut self);
    fn render_dashboard(&mut self, dashboard: &DashboardText);
    fn show_alert(&mut self, message: &str);
    fn show_error(&mut self, message: &str);
}

/// Pre-formatted dashboard strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardText {
    pub balance: String,
    pub today_earned: String,
    pub tasks_completed: String,
    pub referrals: String,
    pub referral_code: String,
}

impl DashboardText {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            balance: format!("{} {}", account.balance.cash, CURRENCY_LABEL),
            today_earned: format!("{} {}", account.stats.today_earned, CURRENCY_LABEL),
            tasks_completed: account.stats.tasks_completed.to_string(),
            referrals: account.stats.referrals.to_string(),
            referral_code: account.referral_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Signed-in Telegram user backed by a stored account
    Telegram,
    /// No Telegram user; synthetic account, nothing persisted
    Demo,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub account_id: String,
    pub mode: SessionMode,
    pub identity: Option<WebAppUser>,
    pub account: UserAccount,
    pub verified: bool,
    /// True when this launch created the account record
    pub created: bool,
}

impl Session {
    /// Name shown to the admin; falls back to "User".
    pub fn display_name(&self) -> String {
        self.identity
            .as_ref()
            .map(|user| user.first_name.clone())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "User".to_string())
    }
}

/// Client-side "joined the required channels" flag.
///
/// Lives only in local storage; nothing on the server checks it.
#[derive(Clone)]
pub struct ChannelGate {
    local: Arc<dyn LocalStorage>,
}

impl ChannelGate {
    pub fn new(local: Arc<dyn LocalStorage>) -> Self {
        Self { local }
    }

    pub fn is_verified(&self) -> AppResult<bool> {
        Ok(self.local.get_item(verification::STORAGE_KEY)?.as_deref() == Some("true"))
    }

    pub fn mark_verified(&self) -> AppResult<()> {
        self.local.set_item(verification::STORAGE_KEY, "true")
    }
}

pub struct Bootstrap {
    config: Arc<AppConfig>,
    users: UserRepository,
    gate: ChannelGate,
    referrals: Arc<dyn ReferralProcessor>,
    verification_delay: Duration,
}

impl Bootstrap {
    pub fn new(
        config: Arc<AppConfig>,
        users: UserRepository,
        gate: ChannelGate,
        referrals: Arc<dyn ReferralProcessor>,
    ) -> Self {
        Self {
            config,
            users,
            gate,
            referrals,
            verification_delay: verification::simulated_check(),
        }
    }

    pub fn with_verification_delay(mut self, delay: Duration) -> Self {
        self.verification_delay = delay;
        self
    }

    /// Runs the startup flow. On failure the view gets a generic error and
    /// the error is returned; no synthetic data is substituted.
    pub async fn run<V: SessionView + ?Sized>(&self, view: &mut V, launch: &LaunchContext) -> AppResult<Session> {
        view.show_loading("Loading app...");
        let result = self.load(view, launch).await;
        view.hide_loading();

        if let Err(e) = &result {
            log::error!("App initialization error: {}", e);
            view.show_error("App load error. Please refresh.");
        }
        result
    }

    async fn load<V: SessionView + ?Sized>(&self, view: &mut V, launch: &LaunchContext) -> AppResult<Session> {
        let Some(user) = self.resolve_identity(launch)? else {
            return self.demo_session(view);
        };
        log::info!("Telegram user: {} ({})", user.id, user.first_name);

        let verified = self.apply_gate(view)?;
        let created = self.register(&user, launch).await?;

        let account_id = user.account_id();
        let account = self
            .users
            .get(&account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_id.clone()))?;
        view.render_dashboard(&DashboardText::from_account(&account));

        Ok(Session {
            account_id,
            mode: SessionMode::Telegram,
            identity: Some(user),
            account,
            verified,
            created,
        })
    }

    fn resolve_identity(&self, launch: &LaunchContext) -> AppResult<Option<WebAppUser>> {
        let Some(init_data) = launch.init_data.as_deref().filter(|raw| !raw.trim().is_empty()) else {
            return Ok(None);
        };

        let user = if self.config.validate_init_data {
            validate_init_data(init_data, self.config.bot_token(), Utc::now().timestamp())?
        } else {
            extract_user_unverified(init_data)?
        };
        Ok(Some(user))
    }

    fn demo_session<V: SessionView + ?Sized>(&self, view: &mut V) -> AppResult<Session> {
        if !self.config.demo_mode {
            return Err(AppError::MissingIdentity);
        }
        log::warn!("No Telegram user found, using demo mode");

        let verified = self.apply_gate(view)?;
        let account = UserAccount::demo(0);
        view.render_dashboard(&DashboardText::from_account(&account));

        Ok(Session {
            account_id: format!("test_user_{}", Utc::now().timestamp_millis()),
            mode: SessionMode::Demo,
            identity: None,
            account,
            verified,
            created: false,
        })
    }

    fn apply_gate<V: SessionView + ?Sized>(&self, view: &mut V) -> AppResult<bool> {
        let verified = self.gate.is_verified()?;
        if verified {
            view.show_main_content();
        } else {
            view.show_verification_screen();
        }
        Ok(verified)
    }

    /// Creates the account if missing. Returns true when a record was created.
    async fn register(&self, user: &WebAppUser, launch: &LaunchContext) -> AppResult<bool> {
        let account_id = user.account_id();
        if self.users.get(&account_id).await?.is_some() {
            return Ok(false);
        }

        let account = UserAccount::new_for(user, ReferralCode::generate(), Utc::now());
        self.users.create(&account).await?;
        log::info!("New user registered: {}", user.id);

        if let Some(referral_code) = launch.referral_param() {
            // A failed hand-off must not block the new user.
            if let Err(e) = self.referrals.process_referral(&referral_code, &account).await {
                log::error!("Referral processing failed for {}: {}", account_id, e);
            }
        }
        Ok(true)
    }

    /// Simulated membership check that only flips the local flag.
    pub async fn verify_channels<V: SessionView + ?Sized>(&self, view: &mut V) -> AppResult<()> {
        view.show_loading("Verifying channels...");
        tokio::time::sleep(self.verification_delay).await;

        let result = self.gate.mark_verified();
        match &result {
            Ok(()) => {
                view.show_alert("Channels verified successfully!");
                view.show_main_content();
            }
            Err(e) => {
                log::error!("Verification error: {}", e);
                view.show_alert("Verification failed. Please try again.");
            }
        }
        view.hide_loading();
        result
    }
}
