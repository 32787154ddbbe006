//! Sample dataset for local development and demos: one claim awaiting
//! review and one already approved, owned by a single lecturer.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimItem, ClaimStatus};
use claimdesk_core::errors::RepositoryError;
use claimdesk_core::workflow::ClaimRepository;

pub const SAMPLE_LECTURER: &str = "lecturer1@university.edu";

/// Builds the sample claims. Totals are always derived from the items.
pub fn sample_claims() -> Vec<Claim> {
    let mut pending = Claim::new(
        SAMPLE_LECTURER,
        3,
        2024,
        vec![
            ClaimItem {
                date: NaiveDate::from_ymd_opt(2024, 3, 11),
                hours_worked: Decimal::new(80, 1),
                module: "CS101".to_string(),
                description: Some("Lecture".to_string()),
                amount: Decimal::new(650, 0),
            },
            ClaimItem {
                date: NaiveDate::from_ymd_opt(2024, 3, 18),
                hours_worked: Decimal::new(60, 1),
                module: "CS102".to_string(),
                description: Some("Tutorial".to_string()),
                amount: Decimal::new(600, 0),
            },
        ],
        ClaimStatus::Draft,
    );
    pending.id = ClaimId("1".to_string());
    pending.mark_submitted(Utc::now() - Duration::days(2));

    let mut approved = Claim::new(
        SAMPLE_LECTURER,
        2,
        2024,
        vec![ClaimItem {
            date: NaiveDate::from_ymd_opt(2024, 2, 12),
            hours_worked: Decimal::new(120, 1),
            module: "CS201".to_string(),
            description: Some("Lectures and marking".to_string()),
            amount: Decimal::new(1800, 0),
        }],
        ClaimStatus::Draft,
    );
    approved.id = ClaimId("2".to_string());
    approved.submitted_at = Some(Utc::now() - Duration::days(7));
    approved.status = ClaimStatus::Approved;

    vec![pending, approved]
}

/// Seeds the sample claims into any repository implementation.
pub async fn seed(repository: &dyn ClaimRepository) -> Result<Vec<Claim>, RepositoryError> {
    let mut seeded = Vec::new();
    for claim in sample_claims() {
        seeded.push(repository.save(claim).await?);
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use claimdesk_core::domain::claim::ClaimStatus;
    use claimdesk_core::workflow::ClaimRepository;

    use crate::repositories::InMemoryClaimRepository;

    use super::{sample_claims, seed, SAMPLE_LECTURER};

    #[test]
    fn sample_totals_match_their_items() {
        let claims = sample_claims();
        assert_eq!(claims[0].total_amount, Decimal::new(1250, 0));
        assert_eq!(claims[1].total_amount, Decimal::new(1800, 0));

        for claim in &claims {
            let expected: Decimal = claim.items.iter().map(|item| item.amount).sum();
            assert_eq!(claim.total_amount, expected);
        }
    }

    #[tokio::test]
    async fn seed_populates_the_repository() {
        let repo = InMemoryClaimRepository::default();
        seed(&repo).await.expect("seed");

        let owned = repo.find_by_owner(SAMPLE_LECTURER).await.expect("list");
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].status, ClaimStatus::PendingReview);
        assert_eq!(owned[1].status, ClaimStatus::Approved);
    }
}
