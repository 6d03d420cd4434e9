//! Storage module for uploaded artifacts
//!
//! Provides a local-disk store for newsletter PDFs and images, with
//! collision-resistant naming and durable (write-then-rename) persistence.

mod local_store;

pub use local_store::{LocalStore, StoredFile};

/// An uploaded file as received from a multipart request, before it is
/// validated and persisted
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// MIME type accepted for newsletter documents
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// MIME types accepted for section and blog images
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Check if a MIME type is an allowed image type
pub fn is_image_mime_allowed(content_type: &str) -> bool {
    ALLOWED_IMAGE_MIME_TYPES.contains(&content_type)
}

/// Get file extension from content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        _ => None,
    }
}
