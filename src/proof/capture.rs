//! Proof file selection and client-side validation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use std::path::Path;
use thiserror::Error;

use crate::core::config::proof::{ALLOWED_MIME_TYPES, MAX_FILE_SIZE_BYTES};
use crate::telegram::InputPhoto;

/// Why a picked file was refused. `Display` is the text shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofValidationError {
    #[error("❌ File size too large! Max 5MB allowed.")]
    TooLarge { size: u64 },

    #[error("❌ Invalid file type! Please use JPG, PNG or WebP.")]
    UnsupportedType(String),
}

/// Where the host should get the photo from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// Rear camera capture
    Camera,
    /// Existing photo from the gallery / file picker
    Gallery,
}

/// A file the user picked, with its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl ProofFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// `data:<mime>;base64,...` URL for the preview image.
    pub fn preview_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    pub fn to_input_photo(&self) -> InputPhoto {
        InputPhoto {
            file_name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            // Bytes clone is a refcount bump
            data: self.data.clone(),
        }
    }
}

/// Size first, then declared type.
pub fn validate_proof_file(file: &ProofFile) -> Result<(), ProofValidationError> {
    if file.size() > MAX_FILE_SIZE_BYTES {
        return Err(ProofValidationError::TooLarge { size: file.size() });
    }
    if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(ProofValidationError::UnsupportedType(file.mime_type.clone()));
    }
    Ok(())
}

/// Declared type for a file read from disk, the way a browser would label it.
pub fn guess_mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file_of(size: usize, mime: &str) -> ProofFile {
        ProofFile::new("shot", mime, vec![0u8; size])
    }

    #[test]
    fn test_size_boundary() {
        assert!(validate_proof_file(&file_of(5 * 1024 * 1024, "image/jpeg")).is_ok());
        assert_eq!(
            validate_proof_file(&file_of(5 * 1024 * 1024 + 1, "image/jpeg")),
            Err(ProofValidationError::TooLarge { size: 5_242_881 })
        );
    }

    #[test]
    fn test_allowed_types() {
        for mime in ["image/jpeg", "image/png", "image/webp"] {
            assert!(validate_proof_file(&file_of(10, mime)).is_ok(), "{mime}");
        }
        assert!(matches!(
            validate_proof_file(&file_of(10, "image/gif")),
            Err(ProofValidationError::UnsupportedType(_))
        ));
        assert!(validate_proof_file(&file_of(10, "")).is_err());
    }

    #[test]
    fn test_size_checked_before_type() {
        let err = validate_proof_file(&file_of(6 * 1024 * 1024, "image/gif")).unwrap_err();
        assert_eq!(err.to_string(), "❌ File size too large! Max 5MB allowed.");
    }

    #[test]
    fn test_preview_data_url() {
        let file = ProofFile::new("a.png", "image/png", &b"hi"[..]);
        assert_eq!(file.preview_data_url(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime_from_extension(Path::new("/tmp/x.JPG")), "image/jpeg");
        assert_eq!(guess_mime_from_extension(Path::new("x.webp")), "image/webp");
        assert_eq!(guess_mime_from_extension(Path::new("x.gif")), "image/gif");
        assert_eq!(guess_mime_from_extension(Path::new("noext")), "application/octet-stream");
    }
}
