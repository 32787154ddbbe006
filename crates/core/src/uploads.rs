//! Size and extension checks for supporting documents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &[".pdf", ".docx", ".xlsx", ".jpg", ".png", ".jpeg"];

/// Upload constraints applied to each supporting document. Evaluated once
/// per file, independently; the workflow aborts a batch on the first
/// rejection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// What the validator needs to know about one uploaded file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub size_bytes: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FileRejection {
    #[error("File '{file_name}' exceeds maximum size of {max_size_mb}MB.")]
    Oversized { file_name: String, max_size_mb: u64 },
    #[error("File type '{extension}' is not supported. Allowed types: {allowed}")]
    UnsupportedType { file_name: String, extension: String, allowed: String },
}

impl FileRejection {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Oversized { file_name, .. } | Self::UnsupportedType { file_name, .. } => {
                file_name
            }
        }
    }
}

impl UploadPolicy {
    /// Checks one file against the policy. Extension match is
    /// case-insensitive; a file with no extension is never allowed.
    pub fn check(&self, file: &FileMetadata) -> Result<(), FileRejection> {
        if file.size_bytes > self.max_size_bytes {
            return Err(FileRejection::Oversized {
                file_name: file.file_name.clone(),
                max_size_mb: self.max_size_bytes / (1024 * 1024),
            });
        }

        let extension = extension_of(&file.file_name);
        let allowed = self
            .allowed_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(&extension));
        if !allowed {
            return Err(FileRejection::UnsupportedType {
                file_name: file.file_name.clone(),
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }

        Ok(())
    }
}

fn extension_of(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}
