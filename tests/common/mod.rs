//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::ChatId;

use dvtrusted::account::referral::PendingReferrals;
use dvtrusted::account::{DashboardText, LaunchContext, SessionView};
use dvtrusted::proof::{CaptureSource, ProofFile, ProofView, UploadSurface};
use dvtrusted::storage::{DocumentStore, LocalStorage, MemoryStorage};
use dvtrusted::telegram::webapp_auth::sign_init_data;
use dvtrusted::telegram::{TelegramBotApi, WebAppUser};
use dvtrusted::{App, AppConfig};

pub const TOKEN: &str = "424242:INTEGRATION";
pub const ADMIN_CHAT: i64 = -1002003004;

/// Everything a view was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Loading(String),
    Loaded,
    VerificationScreen,
    MainContent,
    Dashboard(DashboardText),
    Alert(String),
    Error(String),
    UploadSurface(String),
    Preview,
    PreviewVisible(bool),
    ProgressVisible(bool),
    Progress(u8, String),
    NavigatedBack,
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    pub next_file: Option<ProofFile>,
}

impl RecordingView {
    pub fn with_file(file: ProofFile) -> Self {
        Self {
            events: Vec::new(),
            next_file: Some(file),
        }
    }

    pub fn alerts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Alert(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Progress(p, _) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn dashboard(&self) -> Option<&DashboardText> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::Dashboard(d) => Some(d),
            _ => None,
        })
    }

    /// Last visibility toggle for preview and progress
    pub fn visibility(&self) -> (Option<bool>, Option<bool>) {
        let preview = self.events.iter().rev().find_map(|e| match e {
            ViewEvent::PreviewVisible(v) => Some(*v),
            _ => None,
        });
        let progress = self.events.iter().rev().find_map(|e| match e {
            ViewEvent::ProgressVisible(v) => Some(*v),
            _ => None,
        });
        (preview, progress)
    }
}

impl SessionView for RecordingView {
    fn show_loading(&mut self, message: &str) {
        self.events.push(ViewEvent::Loading(message.to_string()));
    }
    fn hide_loading(&mut self) {
        self.events.push(ViewEvent::Loaded);
    }
    fn show_verification_screen(&mut self) {
        self.events.push(ViewEvent::VerificationScreen);
    }
    fn show_main_content(&mut self) {
        self.events.push(ViewEvent::MainContent);
    }
    fn render_dashboard(&mut self, dashboard: &DashboardText) {
        self.events.push(ViewEvent::Dashboard(dashboard.clone()));
    }
    fn show_alert(&mut self, message: &str) {
        self.events.push(ViewEvent::Alert(message.to_string()));
    }
    fn show_error(&mut self, message: &str) {
        self.events.push(ViewEvent::Error(message.to_string()));
    }
}

#[async_trait]
impl ProofView for RecordingView {
    fn show_upload_surface(&mut self, surface: &UploadSurface) {
        self.events.push(ViewEvent::UploadSurface(surface.title.clone()));
    }
    async fn pick_file(&mut self, _source: CaptureSource) -> Option<ProofFile> {
        self.next_file.take()
    }
    fn alert(&mut self, message: &str) {
        self.events.push(ViewEvent::Alert(message.to_string()));
    }
    fn show_preview(&mut self, _data_url: &str) {
        self.events.push(ViewEvent::Preview);
    }
    fn set_preview_visible(&mut self, visible: bool) {
        self.events.push(ViewEvent::PreviewVisible(visible));
    }
    fn set_progress_visible(&mut self, visible: bool) {
        self.events.push(ViewEvent::ProgressVisible(visible));
    }
    fn update_progress(&mut self, percent: u8, message: &str) {
        self.events.push(ViewEvent::Progress(percent, message.to_string()));
    }
    fn navigate_back(&mut self) {
        self.events.push(ViewEvent::NavigatedBack);
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::new(TOKEN, ChatId(ADMIN_CHAT))
}

pub fn web_user(id: i64, first_name: &str) -> WebAppUser {
    WebAppUser {
        id,
        first_name: first_name.to_string(),
        last_name: None,
        username: Some(format!("user{}", id)),
        language_code: Some("bn".to_string()),
    }
}

/// Launch context with freshly signed init data
pub fn signed_launch(user: &WebAppUser, entry_url: Option<&str>) -> LaunchContext {
    LaunchContext {
        init_data: Some(sign_init_data(user, Utc::now().timestamp(), TOKEN).unwrap()),
        entry_url: entry_url.map(|u| url::Url::parse(u).unwrap()),
    }
}

/// App talking to `api_url` with the given stores
pub fn build_app(api_url: &str, store: Arc<dyn DocumentStore>, local: Arc<dyn LocalStorage>) -> App {
    let _ = pretty_env_logger::try_init();
    let mut config = test_config();
    config.bot_api_url = api_url.to_string();
    let transport = Arc::new(TelegramBotApi::from_config(&config).unwrap());
    let referrals = Arc::new(PendingReferrals::new(store.clone()));
    App::new(config, transport, store, local, referrals).with_verification_delay(Duration::ZERO)
}

pub fn memory_local() -> Arc<dyn LocalStorage> {
    Arc::new(MemoryStorage::new())
}

/// ASCII payload so wiremock can match multipart bodies as text
pub fn jpeg_of_size(size: usize) -> ProofFile {
    ProofFile::new("proof.jpg", "image/jpeg", vec![b'j'; size])
}
