//! Proof capture and submission

pub mod capture;
pub mod progress;
pub mod submit;

pub use capture::{guess_mime_from_extension, validate_proof_file, CaptureSource, ProofFile, ProofValidationError};
pub use progress::{ProgressTracker, SubmitStage};
pub use submit::{
    format_admin_notification, format_caption, ProofHandler, ProofTask, ProofView, SubmitOutcome, SubmitReceipt,
    Submitter, UploadSurface,
};
