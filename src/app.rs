//! Composition root: owns the collaborators every flow shares.

use std::sync::Arc;
use std::time::Duration;

use crate::account::bootstrap::{Bootstrap, ChannelGate};
use crate::account::referral::{PendingReferrals, ReferralProcessor};
use crate::account::{LaunchContext, Session, SessionView, UserRepository};
use crate::core::config::AppConfig;
use crate::core::error::AppResult;
use crate::proof::{ProofHandler, ProofTask, ProofView, Submitter};
use crate::storage::{DocumentStore, FileStorage, LocalStorage, SqliteStore};
use crate::telegram::{BotTransport, TelegramBotApi};

pub struct App {
    config: Arc<AppConfig>,
    transport: Arc<dyn BotTransport>,
    bootstrap: Bootstrap,
}

impl App {
    pub fn new(
        config: AppConfig,
        transport: Arc<dyn BotTransport>,
        store: Arc<dyn DocumentStore>,
        local: Arc<dyn LocalStorage>,
        referrals: Arc<dyn ReferralProcessor>,
    ) -> Self {
        let config = Arc::new(config);
        let bootstrap = Bootstrap::new(
            Arc::clone(&config),
            UserRepository::new(store),
            ChannelGate::new(local),
            referrals,
        );
        Self {
            config,
            transport,
            bootstrap,
        }
    }

    /// Production wiring: Bot API over reqwest, SQLite documents, JSON local storage.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let transport: Arc<dyn BotTransport> = Arc::new(TelegramBotApi::from_config(&config)?);
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteStore::open(&config.database_path)?);
        let local: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(&config.local_storage_path));
        let referrals: Arc<dyn ReferralProcessor> = Arc::new(PendingReferrals::new(Arc::clone(&store)));

        log::info!("App wired (database: {}, local storage: {})", config.database_path, config.local_storage_path);
        Ok(Self::new(config, transport, store, local, referrals))
    }

    pub fn with_verification_delay(self, delay: Duration) -> Self {
        Self {
            bootstrap: self.bootstrap.with_verification_delay(delay),
            ..self
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn bootstrap<V: SessionView + ?Sized>(&self, view: &mut V, launch: &LaunchContext) -> AppResult<Session> {
        self.bootstrap.run(view, launch).await
    }

    pub async fn verify_channels<V: SessionView + ?Sized>(&self, view: &mut V) -> AppResult<()> {
        self.bootstrap.verify_channels(view).await
    }

    /// Opens an upload session for `task` on behalf of the session's user.
    pub fn proof_handler<V: ProofView>(&self, session: &Session, task: ProofTask, view: V) -> ProofHandler<V> {
        let submitter = Submitter {
            account_id: session.account_id.clone(),
            display_name: session.display_name(),
        };
        ProofHandler::open(
            Arc::clone(&self.transport),
            self.config.admin_chat_id,
            task,
            submitter,
            view,
        )
    }

    /// Download URL of a stored proof photo.
    pub async fn photo_url(&self, file_id: &str) -> AppResult<String> {
        let link = self.transport.get_file(file_id).await?;
        Ok(link.url)
    }
}
