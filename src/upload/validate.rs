/// Client-side upload validation
///
/// Rejections happen here, before any bytes are read or sent. The two
/// rules: the file must look like an image (MIME category `image/*`) and
/// must not exceed the upload limit.

use std::fs;
use std::path::{Path, PathBuf};

use mime_guess::mime::Mime;
use thiserror::Error;

/// Upload size limit (5 MiB), matching the backend's per-image cap
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Why a candidate file was rejected before upload
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload an image file (JPEG, PNG, etc.)")]
    NotAnImage,
    #[error("Image size should be less than 5MB")]
    TooLarge,
    #[error("Could not read the selected file")]
    Unreadable,
}

/// A file that passed validation and may be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub file_name: String,
    /// Inferred MIME type, e.g. "image/jpeg"
    pub mime: String,
    pub size_bytes: u64,
}

/// Validate a dropped or picked path
pub fn inspect(path: &Path) -> Result<Candidate, ValidationError> {
    let metadata = fs::metadata(path).map_err(|_| ValidationError::Unreadable)?;
    if !metadata.is_file() {
        return Err(ValidationError::Unreadable);
    }

    let mime = mime_guess::from_path(path).first();
    check(mime.as_ref(), metadata.len())?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    Ok(Candidate {
        path: path.to_path_buf(),
        file_name,
        // check() already rejected the None case
        mime: mime.map(|m| m.to_string()).unwrap_or_default(),
        size_bytes: metadata.len(),
    })
}

/// The validation rules themselves, separated from filesystem access
fn check(mime: Option<&Mime>, size_bytes: u64) -> Result<(), ValidationError> {
    match mime {
        Some(mime) if mime.type_() == mime_guess::mime::IMAGE => {}
        _ => return Err(ValidationError::NotAnImage),
    }

    if size_bytes > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge);
    }

    Ok(())
}
