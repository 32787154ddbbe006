//! End-to-end check over the SQL repository: seed the sample dataset,
//! then drive the workflow against it the way the server does.

use claimdesk_core::auth::RequestContext;
use claimdesk_core::domain::claim::{ClaimId, ClaimStatus};
use claimdesk_core::domain::identity::{Identity, Role};
use claimdesk_core::errors::WorkflowError;
use claimdesk_core::uploads::UploadPolicy;
use claimdesk_core::workflow::{ClaimWorkflow, DocumentStorageError, DocumentStore};

use async_trait::async_trait;
use claimdesk_db::{connect_with_settings, migrations, SqlClaimRepository};

struct NullDocumentStore;

#[async_trait]
impl DocumentStore for NullDocumentStore {
    async fn store(
        &self,
        claim_id: &ClaimId,
        file_name: &str,
        _bytes: &[u8],
    ) -> Result<claimdesk_core::domain::claim::SupportingDocument, DocumentStorageError> {
        Ok(claimdesk_core::domain::claim::SupportingDocument {
            file_name: file_name.to_string(),
            storage_path: format!("uploads/claims/{claim_id}/{file_name}"),
            uploaded_at: chrono::Utc::now(),
        })
    }

    async fn remove(
        &self,
        _document: &claimdesk_core::domain::claim::SupportingDocument,
    ) -> Result<(), DocumentStorageError> {
        Ok(())
    }
}

async fn seeded_workflow() -> ClaimWorkflow<SqlClaimRepository, NullDocumentStore> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrate");

    let repository = SqlClaimRepository::new(pool);
    claimdesk_db::fixtures::seed(&repository).await.expect("seed");

    ClaimWorkflow::new(repository, NullDocumentStore, UploadPolicy::default())
}

fn coordinator() -> RequestContext {
    RequestContext::of(Identity::new("coordinator@university.edu", Role::Coordinator))
}

#[tokio::test]
async fn seeded_claims_are_visible_to_their_owner() {
    let workflow = seeded_workflow().await;
    let owner = RequestContext::of(Identity::new(
        claimdesk_db::fixtures::SAMPLE_LECTURER,
        Role::Lecturer,
    ));

    let claims = workflow.claims_for_owner(&owner).await.expect("owner list");
    assert_eq!(claims.len(), 2);
}

#[tokio::test]
async fn coordinator_approves_the_seeded_pending_claim() {
    let workflow = seeded_workflow().await;

    let queue = workflow.review_queue(&coordinator()).await.expect("queue");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, ClaimId("1".to_string()));

    let receipt = workflow
        .update_status(&coordinator(), &ClaimId("1".to_string()), ClaimStatus::Approved, "ok")
        .await
        .expect("approve");
    assert_eq!(receipt.claim.status, ClaimStatus::Approved);
    assert!(receipt.message.contains("Approved"));

    let queue = workflow.review_queue(&coordinator()).await.expect("queue after approval");
    assert!(queue.is_empty());
}

#[tokio::test]
async fn unknown_claim_id_reads_as_not_found() {
    let workflow = seeded_workflow().await;

    let error = workflow
        .update_status(&coordinator(), &ClaimId("999".to_string()), ClaimStatus::Approved, "")
        .await
        .expect_err("missing claim");
    assert_eq!(error, WorkflowError::NotFound(ClaimId("999".to_string())));
}
