use crate::core::config::progress::{DONE_PERCENT, NOTIFYING_PERCENT, UPLOADING_PERCENT};

/// Checkpoints of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubmitStage {
    Uploading,
    Notifying,
    Done,
}

impl SubmitStage {
    pub fn percent(&self) -> u8 {
        match self {
            Self::Uploading => UPLOADING_PERCENT,
            Self::Notifying => NOTIFYING_PERCENT,
            Self::Done => DONE_PERCENT,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Uploading => "Uploading to Telegram...",
            Self::Notifying => "Notifying admin...",
            Self::Done => "Proof submitted successfully!",
        }
    }
}

/// Monotonic 0–100 progress for the current attempt.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    percent: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Moves to `stage`. Returns false (and changes nothing) if that would go backwards.
    pub fn advance(&mut self, stage: SubmitStage) -> bool {
        let target = stage.percent();
        if target < self.percent {
            log::warn!("Ignoring progress regression {} -> {}", self.percent, target);
            return false;
        }
        self.percent = target;
        true
    }

    /// Starts a fresh attempt.
    pub fn reset(&mut self) {
        self.percent = 0;
    }
}
