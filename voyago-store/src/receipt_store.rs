use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use voyago_core::{ReceiptStore, RepoError};

/// On-disk receipt storage. Handles are generated server-side (uuid plus an
/// extension derived from the declared content type), never from client
/// filenames.
pub struct DiskReceiptStore {
    root: PathBuf,
}

impl DiskReceiptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// File extension for a declared upload content type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "application/pdf" => "pdf",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Handles are single path components; anything else is treated as absent.
fn valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && !handle.contains('/')
        && !handle.contains('\\')
        && !handle.contains("..")
}

#[async_trait]
impl ReceiptStore for DiskReceiptStore {
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<String, RepoError> {
        fs::create_dir_all(&self.root).await?;
        let handle = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        fs::write(self.root.join(&handle), bytes).await?;
        info!(%handle, size = bytes.len(), "receipt file stored");
        Ok(handle)
    }

    async fn retrieve(&self, handle: &str) -> Result<Option<Vec<u8>>, RepoError> {
        if !valid_handle(handle) {
            return Ok(None);
        }
        match fs::read(self.root.join(handle)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_retrieves_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskReceiptStore::new(dir.path());

        let handle = store.store(b"receipt-bytes", "image/jpeg").await.unwrap();
        assert!(handle.ends_with(".jpg"));

        let bytes = store.retrieve(&handle).await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"receipt-bytes"[..]));
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskReceiptStore::new(dir.path());
        assert!(store.retrieve("nope.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn traversal_handles_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskReceiptStore::new(dir.path());
        assert!(store.retrieve("../etc/passwd").await.unwrap().is_none());
        assert!(store.retrieve("a/b.pdf").await.unwrap().is_none());
        assert!(store.retrieve("").await.unwrap().is_none());
    }

    #[test]
    fn unknown_content_types_fall_back_to_bin() {
        assert_eq!(extension_for("image/heic"), "bin");
        assert_eq!(extension_for("application/pdf"), "pdf");
    }
}
