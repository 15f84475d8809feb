//! Terminal rendering of the session and proof screens.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

use crate::account::{DashboardText, LaunchContext, SessionView};
use crate::cli::LaunchArgs;
use crate::core::error::AppResult;
use crate::proof::{guess_mime_from_extension, CaptureSource, ProofFile, ProofView, UploadSurface};

const BAR_WIDTH: usize = 10;

pub fn launch_context(args: &LaunchArgs) -> AppResult<LaunchContext> {
    let entry_url = args.entry_url.as_deref().map(Url::parse).transpose()?;
    Ok(LaunchContext {
        init_data: args.init_data.clone(),
        entry_url,
    })
}

/// `[█████░░░░░]`
pub fn progress_bar(percent: u8) -> String {
    let filled = (percent.min(100) as usize * BAR_WIDTH) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn read_proof_file(path: &Path) -> AppResult<ProofFile> {
    let data = fs_err::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "proof".to_string());
    Ok(ProofFile::new(name, guess_mime_from_extension(path), data))
}

/// Prints every screen change to stdout. The "picker" hands back a file
/// chosen on the command line.
#[derive(Debug, Default)]
pub struct TerminalView {
    picked: Option<PathBuf>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_picked_file(path: impl Into<PathBuf>) -> Self {
        Self {
            picked: Some(path.into()),
        }
    }
}

impl SessionView for TerminalView {
    fn show_loading(&mut self, message: &str) {
        println!("⏳ {}", message);
    }

    fn hide_loading(&mut self) {}

    fn show_verification_screen(&mut self) {
        println!("🔒 Join the required channels, then run `dvtrusted verify`.");
    }

    fn show_main_content(&mut self) {
        println!("🏠 Main menu");
    }

    fn render_dashboard(&mut self, dashboard: &DashboardText) {
        println!("💰 Balance:        {}", dashboard.balance);
        println!("📈 Today:          {}", dashboard.today_earned);
        println!("✅ Tasks done:     {}", dashboard.tasks_completed);
        println!("👥 Referrals:      {}", dashboard.referrals);
        println!("🎟  Referral code: {}", dashboard.referral_code);
    }

    fn show_alert(&mut self, message: &str) {
        println!("{}", message);
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

#[async_trait]
impl ProofView for TerminalView {
    fn show_upload_surface(&mut self, surface: &UploadSurface) {
        println!("{}", surface.title);
        println!("{}", surface.subtitle);
        println!("📋 Instructions:");
        for line in surface.instructions {
            println!("  • {}", line);
        }
    }

    async fn pick_file(&mut self, source: CaptureSource) -> Option<ProofFile> {
        let path = self.picked.take()?;
        log::debug!("Picking {} via {:?}", path.display(), source);
        match read_proof_file(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                log::error!("Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn alert(&mut self, message: &str) {
        println!("{}", message);
    }

    fn show_preview(&mut self, data_url: &str) {
        println!("🖼  Preview ready ({} bytes as data URL)", data_url.len());
    }

    fn set_preview_visible(&mut self, _visible: bool) {}

    fn set_progress_visible(&mut self, _visible: bool) {}

    fn update_progress(&mut self, percent: u8, message: &str) {
        println!("{} {:>3}% {}", progress_bar(percent), percent, message);
    }

    fn navigate_back(&mut self) {
        log::debug!("Upload surface closed");
    }
}
