use async_trait::async_trait;
use tokio::sync::RwLock;

use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimStatus};
use claimdesk_core::errors::RepositoryError;
use claimdesk_core::workflow::ClaimRepository;

/// In-memory claim storage: concurrent readers, single writer, with
/// read-your-writes within one repository instance. Insertion order is
/// preserved so owner listings come back in creation order.
#[derive(Default)]
pub struct InMemoryClaimRepository {
    claims: RwLock<Vec<Claim>>,
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Claim>, RepositoryError> {
        let claims = self.claims.read().await;
        Ok(claims.iter().filter(|claim| claim.owner_id == owner_id).cloned().collect())
    }

    async fn find_by_id(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        let claims = self.claims.read().await;
        Ok(claims.iter().find(|claim| claim.id == *id).cloned())
    }

    async fn find_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, RepositoryError> {
        let claims = self.claims.read().await;
        Ok(claims.iter().filter(|claim| claim.status == status).cloned().collect())
    }

    async fn save(&self, mut claim: Claim) -> Result<Claim, RepositoryError> {
        if claim.id.0.is_empty() {
            claim.id = ClaimId::new();
        }

        let mut claims = self.claims.write().await;
        if let Some(existing) = claims.iter_mut().find(|stored| stored.id == claim.id) {
            *existing = claim.clone();
        } else {
            claims.push(claim.clone());
        }
        Ok(claim)
    }
}
