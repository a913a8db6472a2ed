/// Upload intake
///
/// Everything between "the user handed us a path" and "bytes are ready to
/// send": client-side validation (validate.rs) and off-thread file loading.
/// Nothing in this module talks to the network.

pub mod validate;

use std::path::PathBuf;

pub use validate::{Candidate, ValidationError};

/// An image read into memory, ready for preview and upload
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Filename sent to the backend as the multipart filename
    pub file_name: String,
    /// MIME type inferred from the file extension
    pub mime: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Read a validated candidate into memory without blocking the UI thread
pub async fn load(candidate: Candidate) -> Result<LoadedImage, ValidationError> {
    let Candidate {
        path,
        file_name,
        mime,
        ..
    } = candidate;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ValidationError::Unreadable)?;

    Ok(LoadedImage {
        file_name,
        mime,
        bytes,
    })
}

/// Show the native image picker; None when the user cancels
pub fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select an Image")
        .add_filter("Images", &["jpg", "jpeg", "png", "gif", "webp", "bmp"])
        .pick_file()
}
