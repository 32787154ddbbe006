//! Filesystem-backed document storage.
//!
//! Uploads land under `{root}/claims/{claim_id}/{uuid}_{file_name}`. The
//! random prefix keeps two uploads with the same name from clobbering each
//! other; the original name is preserved on the `SupportingDocument` for
//! display.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use claimdesk_core::domain::claim::{ClaimId, SupportingDocument};
use claimdesk_core::workflow::{DocumentStorageError, DocumentStore};

pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn claim_dir(&self, claim_id: &ClaimId) -> PathBuf {
        self.root.join("claims").join(&claim_id.0)
    }
}

/// Strips any path components a client may have smuggled into the name.
fn sanitized_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "upload".to_string())
}

fn io_error(context: &str, error: std::io::Error) -> DocumentStorageError {
    DocumentStorageError(format!("{context}: {error}"))
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn store(
        &self,
        claim_id: &ClaimId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<SupportingDocument, DocumentStorageError> {
        let dir = self.claim_dir(claim_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|error| io_error("creating upload directory", error))?;

        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitized_name(file_name));
        let path = dir.join(stored_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|error| io_error("writing uploaded file", error))?;

        Ok(SupportingDocument {
            file_name: file_name.to_string(),
            storage_path: path.to_string_lossy().into_owned(),
            uploaded_at: Utc::now(),
        })
    }

    async fn remove(&self, document: &SupportingDocument) -> Result<(), DocumentStorageError> {
        tokio::fs::remove_file(&document.storage_path)
            .await
            .map_err(|error| io_error("removing uploaded file", error))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use claimdesk_core::domain::claim::ClaimId;
    use claimdesk_core::workflow::DocumentStore;

    use super::{sanitized_name, LocalDocumentStore};

    fn claim_id() -> ClaimId {
        ClaimId("claim-1".to_string())
    }

    #[tokio::test]
    async fn store_writes_the_file_under_the_claim_directory() {
        let dir = TempDir::new().expect("tempdir");
        let store = LocalDocumentStore::new(dir.path());

        let document =
            store.store(&claim_id(), "timesheet.pdf", b"pdf bytes").await.expect("store");

        assert_eq!(document.file_name, "timesheet.pdf");
        let path = Path::new(&document.storage_path);
        assert!(path.starts_with(dir.path().join("claims").join("claim-1")));
        assert_eq!(std::fs::read(path).expect("read back"), b"pdf bytes");
    }

    #[tokio::test]
    async fn same_file_name_twice_produces_distinct_paths() {
        let dir = TempDir::new().expect("tempdir");
        let store = LocalDocumentStore::new(dir.path());

        let first = store.store(&claim_id(), "scan.jpg", b"one").await.expect("store");
        let second = store.store(&claim_id(), "scan.jpg", b"two").await.expect("store");

        assert_ne!(first.storage_path, second.storage_path);
        assert_eq!(std::fs::read(&first.storage_path).expect("read"), b"one");
        assert_eq!(std::fs::read(&second.storage_path).expect("read"), b"two");
    }

    #[tokio::test]
    async fn remove_deletes_the_stored_file() {
        let dir = TempDir::new().expect("tempdir");
        let store = LocalDocumentStore::new(dir.path());

        let document = store.store(&claim_id(), "evidence.png", b"png").await.expect("store");
        store.remove(&document).await.expect("remove");

        assert!(!Path::new(&document.storage_path).exists());
    }

    #[test]
    fn path_components_are_stripped_from_client_names() {
        assert_eq!(sanitized_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitized_name("report.pdf"), "report.pdf");
        assert_eq!(sanitized_name(""), "upload");
    }
}
