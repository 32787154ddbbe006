//! Claim lifecycle orchestration: gate → validate → assign status →
//! attach documents → persist → user-facing receipt.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::RequestContext;
use crate::domain::claim::{Claim, ClaimId, ClaimStatus, SupportingDocument};
use crate::errors::{RepositoryError, WorkflowError};
use crate::uploads::{FileMetadata, UploadPolicy};
use crate::validation::{validate_claim, ClaimDraft};

/// Storage boundary for claims. Real persistence attaches here; the
/// contract guarantees read-your-writes per repository instance.
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Claim>, RepositoryError>;
    async fn find_by_id(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError>;
    async fn find_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, RepositoryError>;
    /// Persists the claim, assigning an id if the claim carries none.
    async fn save(&self, claim: Claim) -> Result<Claim, RepositoryError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct DocumentStorageError(pub String);

/// Where uploaded files land, keyed by claim id with a randomized name
/// prefix. `remove` exists so a failed batch can be unwound completely.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store(
        &self,
        claim_id: &ClaimId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<SupportingDocument, DocumentStorageError>;

    async fn remove(&self, document: &SupportingDocument) -> Result<(), DocumentStorageError>;
}

/// Whether the caller pressed "save draft" or "submit".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitAction {
    SaveDraft,
    Submit,
}

impl std::str::FromStr for SubmitAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "submit" => Ok(Self::Submit),
            "save" | "draft" | "save_draft" => Ok(Self::SaveDraft),
            other => Err(format!("unknown claim action `{other}`")),
        }
    }
}

/// One uploaded file, fully read before the workflow runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl StagedUpload {
    fn metadata(&self) -> FileMetadata {
        FileMetadata { file_name: self.file_name.clone(), size_bytes: self.bytes.len() as u64 }
    }
}

/// Successful outcome: the persisted claim plus the confirmation message
/// shown to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct ClaimReceipt {
    pub claim: Claim,
    pub message: String,
}

pub struct ClaimWorkflow<R, S> {
    repository: R,
    documents: S,
    upload_policy: UploadPolicy,
}

impl<R, S> ClaimWorkflow<R, S>
where
    R: ClaimRepository,
    S: DocumentStore,
{
    pub fn new(repository: R, documents: S, upload_policy: UploadPolicy) -> Self {
        Self { repository, documents, upload_policy }
    }

    /// The active upload constraints, for display on claim forms.
    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.upload_policy
    }

    /// Creates a claim as a draft or submits it for review in one step.
    ///
    /// Ordering matters: field validation and the whole file batch are
    /// checked before any side effect, so a rejected input leaves no
    /// residual state and the caller's parsed input can be re-displayed.
    /// The claim is saved exactly once, after documents are on disk; a
    /// storage failure unwinds any files already written.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        draft: ClaimDraft,
        action: SubmitAction,
        files: Vec<StagedUpload>,
    ) -> Result<ClaimReceipt, WorkflowError> {
        let identity = ctx.authenticated()?;
        validate_claim(&draft).map_err(WorkflowError::Validation)?;

        // First rejected file aborts the whole batch.
        for file in &files {
            self.upload_policy.check(&file.metadata())?;
        }

        let mut claim = Claim::new(
            identity.email.clone(),
            draft.month,
            draft.year,
            draft.items,
            ClaimStatus::Draft,
        );
        if action == SubmitAction::Submit {
            claim.mark_submitted(Utc::now());
        }

        let documents = self.store_batch(&claim.id, &files).await?;
        for document in &documents {
            claim.attach_document(document.clone());
        }

        let claim_id = claim.id.clone();
        let claim = match self.repository.save(claim).await {
            Ok(claim) => claim,
            Err(error) => {
                // The save failed after files hit disk; a rejected claim
                // must leave nothing behind.
                self.unwind_batch(&claim_id, &documents).await;
                return Err(error.into());
            }
        };
        info!(
            event_name = "claims.workflow.created",
            claim_id = %claim.id,
            owner_id = %claim.owner_id,
            status = %claim.status,
            document_count = claim.documents.len(),
            "claim created"
        );

        let message = match action {
            SubmitAction::Submit => "Claim submitted successfully!",
            SubmitAction::SaveDraft => "Claim saved as draft.",
        };
        Ok(ClaimReceipt { claim, message: message.to_string() })
    }

    /// Sets the status of an existing claim. Restricted to reviewer roles.
    /// The transition graph is deliberately unrestricted: any status may be
    /// set from any status. Review notes are logged, not persisted.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: &ClaimId,
        new_status: ClaimStatus,
        notes: &str,
    ) -> Result<ClaimReceipt, WorkflowError> {
        let reviewer = ctx.reviewer()?;

        let mut claim = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(id.clone()))?;

        claim.status = new_status;
        let claim = self.repository.save(claim).await?;

        info!(
            event_name = "claims.workflow.status_updated",
            claim_id = %claim.id,
            reviewer = %reviewer.email,
            status = %new_status,
            notes = %notes,
            "claim status updated"
        );

        Ok(ClaimReceipt {
            claim,
            message: format!("Claim status updated to {new_status} successfully."),
        })
    }

    /// Lists the caller's own claims.
    pub async fn claims_for_owner(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Claim>, WorkflowError> {
        let identity = ctx.authenticated()?;
        Ok(self.repository.find_by_owner(&identity.email).await?)
    }

    /// Fetches one claim, visible only to its owner. A claim belonging to
    /// someone else reads as NotFound rather than leaking its existence.
    pub async fn claim_for_owner(
        &self,
        ctx: &RequestContext,
        id: &ClaimId,
    ) -> Result<Claim, WorkflowError> {
        let identity = ctx.authenticated()?;
        self.repository
            .find_by_id(id)
            .await?
            .filter(|claim| claim.owner_id == identity.email)
            .ok_or_else(|| WorkflowError::NotFound(id.clone()))
    }

    /// The coordinator queue: every claim awaiting a review decision.
    pub async fn review_queue(&self, ctx: &RequestContext) -> Result<Vec<Claim>, WorkflowError> {
        ctx.reviewer()?;
        Ok(self.repository.find_by_status(ClaimStatus::PendingReview).await?)
    }

    /// Fetches any claim by id for review, regardless of owner.
    pub async fn claim_for_review(
        &self,
        ctx: &RequestContext,
        id: &ClaimId,
    ) -> Result<Claim, WorkflowError> {
        ctx.reviewer()?;
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(id.clone()))
    }

    async fn store_batch(
        &self,
        claim_id: &ClaimId,
        files: &[StagedUpload],
    ) -> Result<Vec<SupportingDocument>, WorkflowError> {
        let mut stored: Vec<SupportingDocument> = Vec::with_capacity(files.len());

        for file in files {
            match self.documents.store(claim_id, &file.file_name, &file.bytes).await {
                Ok(document) => stored.push(document),
                Err(error) => {
                    // All-or-nothing: unwind everything written so far.
                    self.unwind_batch(claim_id, &stored).await;
                    return Err(WorkflowError::DocumentStorage(error.0));
                }
            }
        }

        Ok(stored)
    }

    async fn unwind_batch(&self, claim_id: &ClaimId, documents: &[SupportingDocument]) {
        for document in documents {
            if let Err(cleanup) = self.documents.remove(document).await {
                warn!(
                    event_name = "claims.workflow.cleanup_failed",
                    claim_id = %claim_id,
                    storage_path = %document.storage_path,
                    error = %cleanup,
                    "failed to remove document while unwinding batch"
                );
            }
        }
    }
}
