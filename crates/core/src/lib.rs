pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod session;
pub mod uploads;
pub mod validation;
pub mod workflow;

pub use auth::RequestContext;
pub use domain::claim::{Claim, ClaimId, ClaimItem, ClaimStatus, SupportingDocument};
pub use domain::identity::{Identity, Role};
pub use errors::{Navigation, RepositoryError, WorkflowError};
pub use session::SessionStore;
pub use uploads::{FileMetadata, FileRejection, UploadPolicy};
pub use validation::{validate_claim, ClaimDraft, FieldErrors};
pub use workflow::{
    ClaimReceipt, ClaimRepository, ClaimWorkflow, DocumentStorageError, DocumentStore,
    StagedUpload, SubmitAction,
};
