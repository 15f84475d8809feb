//! Proof submission: upload to the admin chat, then notify the admin.

use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::ChatId;

use super::capture::{validate_proof_file, CaptureSource, ProofFile, ProofValidationError};
use super::progress::{ProgressTracker, SubmitStage};
use crate::core::config::proof::completion_delay;
use crate::telegram::{BotTransport, PhotoUpload, SentMessage};

const INSTRUCTIONS: [&str; 4] = [
    "Clear screenshot of completed task",
    "Make sure username/ID is visible",
    "File size should be less than 5MB",
    "Allowed formats: JPG, PNG, WebP",
];

/// What the host draws when the upload surface opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSurface {
    pub title: String,
    pub subtitle: &'static str,
    pub instructions: &'static [&'static str],
}

impl UploadSurface {
    fn for_task(task: &ProofTask) -> Self {
        Self {
            title: format!("📸 Submit Proof for: {}", task.title),
            subtitle: "Please upload screenshot as proof of task completion",
            instructions: &INSTRUCTIONS,
        }
    }
}

/// Screen operations of the capture and submission surface.
#[async_trait]
pub trait ProofView: Send {
    /// Upload surface with preview and progress both hidden.
    fn show_upload_surface(&mut self, surface: &UploadSurface);

    /// Opens the camera or the gallery. `None` when the user backs out.
    async fn pick_file(&mut self, source: CaptureSource) -> Option<ProofFile>;

    fn alert(&mut self, message: &str);

    fn show_preview(&mut self, data_url: &str);

    fn set_preview_visible(&mut self, visible: bool);

    fn set_progress_visible(&mut self, visible: bool);

    fn update_progress(&mut self, percent: u8, message: &str);

    fn navigate_back(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofTask {
    pub id: String,
    pub title: String,
}

impl ProofTask {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Who is submitting, as shown to the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub account_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub upload: PhotoUpload,
    /// `None` when the admin notification failed; the upload still stands.
    pub notification: Option<SentMessage>,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Nothing selected; the user was asked to pick a photo
    NoFileSelected,
    Submitted(SubmitReceipt),
    /// Upload rejected or unreachable; selection kept for a retry
    Failed(String),
}

pub fn format_caption(task_id: &str, account_id: &str, time: &str) -> String {
    format!("Task: {}\nUser: {}\nTime: {}", task_id, account_id, time)
}

/// Admin notification (HTML parse mode) with the reply-command hints.
pub fn format_admin_notification(task_id: &str, account_id: &str, display_name: &str, time: &str) -> String {
    let task_id = escape_html(task_id);
    format!(
        "🆕 নতুন টাস্ক সাবমিশন!\n\n\
         📋 টাস্ক ID: {task}\n\
         👤 ইউজার: {name} ({user})\n\
         ⏰ সময়: {time}\n\n\
         /approve_{task} - Approve\n\
         /reject_{task} - Reject\n\
         /view_{task} - বিস্তারিত",
        task = task_id,
        name = escape_html(display_name),
        user = escape_html(account_id),
        time = time,
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn local_time() -> String {
    Local::now().format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// One upload session: the capture surface plus its selected-file slot.
pub struct ProofHandler<V: ProofView> {
    transport: Arc<dyn BotTransport>,
    admin_chat_id: ChatId,
    task: ProofTask,
    submitter: Submitter,
    view: V,
    selected: Option<ProofFile>,
    progress: ProgressTracker,
    completion_delay: Duration,
}

impl<V: ProofView> ProofHandler<V> {
    /// Binds the session to `task` and renders the upload surface.
    pub fn open(
        transport: Arc<dyn BotTransport>,
        admin_chat_id: ChatId,
        task: ProofTask,
        submitter: Submitter,
        mut view: V,
    ) -> Self {
        view.show_upload_surface(&UploadSurface::for_task(&task));
        view.set_preview_visible(false);
        view.set_progress_visible(false);

        Self {
            transport,
            admin_chat_id,
            task,
            submitter,
            view,
            selected: None,
            progress: ProgressTracker::new(),
            completion_delay: completion_delay(),
        }
    }

    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    pub fn task(&self) -> &ProofTask {
        &self.task
    }

    pub fn selected(&self) -> Option<&ProofFile> {
        self.selected.as_ref()
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress.percent()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Camera and gallery both end in [`Self::handle_file_select`].
    pub async fn capture(&mut self, source: CaptureSource) -> Result<bool, ProofValidationError> {
        let file = self.view.pick_file(source).await;
        self.handle_file_select(file)
    }

    /// Validates and previews a picked file. Returns true when it became the
    /// selection; a rejected file leaves the previous selection in place.
    pub fn handle_file_select(&mut self, file: Option<ProofFile>) -> Result<bool, ProofValidationError> {
        let Some(file) = file else {
            return Ok(false);
        };

        if let Err(e) = validate_proof_file(&file) {
            log::warn!("Rejected proof file {} ({} bytes, {}): {:?}", file.name, file.size(), file.mime_type, e);
            self.view.alert(&e.to_string());
            return Err(e);
        }

        self.view.show_preview(&file.preview_data_url());
        self.view.set_preview_visible(true);
        log::debug!("Selected proof file {} for task {}", file.name, self.task.id);
        self.selected = Some(file);
        Ok(true)
    }

    pub fn cancel_upload(&mut self) {
        self.view.set_preview_visible(false);
        self.selected = None;
    }

    /// Uploads the selection to the admin chat and notifies the admin.
    ///
    /// Upload failure rolls the surface back to the preview and keeps the
    /// selection. Notification failure is logged and reported in the receipt.
    pub async fn submit_proof(&mut self) -> SubmitOutcome {
        let Some(file) = self.selected.clone() else {
            self.view.alert("Please select a photo first!");
            return SubmitOutcome::NoFileSelected;
        };

        self.progress.reset();
        self.view.set_progress_visible(true);
        self.view.set_preview_visible(false);

        self.advance(SubmitStage::Uploading);
        let caption = format_caption(&self.task.id, &self.submitter.account_id, &local_time());
        let upload = match self
            .transport
            .send_photo(self.admin_chat_id, file.to_input_photo(), &caption)
            .await
        {
            Ok(upload) => upload,
            Err(e) => {
                log::error!("Submission error for task {}: {}", self.task.id, e);
                self.view.alert(&format!("❌ Upload failed: {}", e));
                self.view.set_progress_visible(false);
                self.view.set_preview_visible(true);
                self.progress.reset();
                return SubmitOutcome::Failed(e.to_string());
            }
        };

        self.advance(SubmitStage::Notifying);
        let text = format_admin_notification(
            &self.task.id,
            &self.submitter.account_id,
            &self.submitter.display_name,
            &local_time(),
        );
        let notification = match self.transport.send_message(self.admin_chat_id, &text).await {
            Ok(message) => Some(message),
            Err(e) => {
                log::error!("Notification error for task {}: {}", self.task.id, e);
                None
            }
        };

        self.advance(SubmitStage::Done);
        self.selected = None;
        log::info!(
            "Proof for task {} from user {} submitted as message {}",
            self.task.id,
            self.submitter.account_id,
            upload.message_id
        );

        tokio::time::sleep(self.completion_delay).await;
        self.view
            .alert("✅ Proof submitted successfully!\nAdmin will review and update your balance.");
        self.view.navigate_back();

        SubmitOutcome::Submitted(SubmitReceipt { upload, notification })
    }

    fn advance(&mut self, stage: SubmitStage) {
        if self.progress.advance(stage) {
            self.view.update_progress(stage.percent(), stage.message());
        }
    }
}
