//! Receipt upload policy: size and content-type validation plus the
//! handle-to-content-type mapping used when serving downloads.

use voyago_core::BookingError;

pub const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug)]
pub struct ReceiptDownload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn accepted_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

pub fn validate_upload(upload: &ReceiptUpload) -> Result<(), BookingError> {
    if upload.bytes.is_empty() {
        return Err(BookingError::validation("no receipt file uploaded"));
    }
    if !accepted_content_type(&upload.content_type) {
        return Err(BookingError::validation(
            "only images and PDF files are allowed",
        ));
    }
    if upload.bytes.len() > MAX_RECEIPT_BYTES {
        return Err(BookingError::validation("receipt exceeds the 5 MiB limit"));
    }
    Ok(())
}

/// Content type served back for a stored handle, keyed on its extension.
pub fn content_type_for(handle: &str) -> &'static str {
    match handle.rsplit('.').next() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
