use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub String);

impl ClaimId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    Draft,
    Submitted,
    PendingReview,
    Approved,
    Rejected,
    ChangesRequested,
}

impl ClaimStatus {
    /// The review decisions a coordinator can hand down from the queue.
    /// Advisory only: `update_status` accepts any target status because the
    /// transition graph is deliberately unrestricted.
    pub fn review_outcomes() -> &'static [ClaimStatus] {
        &[ClaimStatus::Approved, ClaimStatus::Rejected, ClaimStatus::ChangesRequested]
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::PendingReview => "PendingReview",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::ChangesRequested => "ChangesRequested",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "pendingreview" | "pending_review" => Ok(Self::PendingReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "changesrequested" | "changes_requested" => Ok(Self::ChangesRequested),
            other => Err(format!("unknown claim status `{other}`")),
        }
    }
}

/// One billable line within a monthly claim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimItem {
    pub date: Option<NaiveDate>,
    pub hours_worked: Decimal,
    pub module: String,
    pub description: Option<String>,
    pub amount: Decimal,
}

/// An uploaded file attached as evidence for a claim. Owned exclusively by
/// one claim and never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingDocument {
    pub file_name: String,
    pub storage_path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub owner_id: String,
    pub month: i32,
    pub year: i32,
    pub status: ClaimStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub items: Vec<ClaimItem>,
    pub documents: Vec<SupportingDocument>,
}

impl Claim {
    /// Builds a new claim owned by `owner_id`. The total is derived from the
    /// items; `submitted_at` stays unset until a submit transition.
    pub fn new(
        owner_id: impl Into<String>,
        month: i32,
        year: i32,
        items: Vec<ClaimItem>,
        status: ClaimStatus,
    ) -> Self {
        let mut claim = Self {
            id: ClaimId::new(),
            owner_id: owner_id.into(),
            month,
            year,
            status,
            total_amount: Decimal::ZERO,
            created_at: Utc::now(),
            submitted_at: None,
            items,
            documents: Vec::new(),
        };
        claim.recompute_total();
        claim
    }

    /// Recomputes `total_amount` as the sum of item amounts. Idempotent.
    pub fn recompute_total(&mut self) {
        self.total_amount = self.items.iter().map(|item| item.amount).sum();
    }

    pub fn attach_document(&mut self, document: SupportingDocument) {
        self.documents.push(document);
    }

    /// Marks the claim submitted. The submit action lands directly in
    /// PendingReview; there is no separate Submitted resting state.
    pub fn mark_submitted(&mut self, at: DateTime<Utc>) {
        self.status = ClaimStatus::PendingReview;
        self.submitted_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{Claim, ClaimItem, ClaimStatus};

    fn item(amount: i64) -> ClaimItem {
        ClaimItem {
            date: NaiveDate::from_ymd_opt(2024, 3, 11),
            hours_worked: Decimal::new(80, 1),
            module: "CS101".to_string(),
            description: Some("Lecture".to_string()),
            amount: Decimal::new(amount, 0),
        }
    }

    #[test]
    fn total_is_sum_of_item_amounts() {
        let claim = Claim::new("lecturer@university.edu", 3, 2024, vec![item(400), item(300)], ClaimStatus::Draft);
        assert_eq!(claim.total_amount, Decimal::new(700, 0));
    }

    #[test]
    fn total_recompute_is_idempotent() {
        let mut claim =
            Claim::new("lecturer@university.edu", 3, 2024, vec![item(400), item(300)], ClaimStatus::Draft);
        let first = claim.total_amount;
        claim.recompute_total();
        claim.recompute_total();
        assert_eq!(claim.total_amount, first);
    }

    #[test]
    fn claim_without_items_totals_zero() {
        let claim = Claim::new("lecturer@university.edu", 3, 2024, vec![], ClaimStatus::Draft);
        assert_eq!(claim.total_amount, Decimal::ZERO);
    }

    #[test]
    fn submit_lands_in_pending_review_with_timestamp() {
        let mut claim = Claim::new("lecturer@university.edu", 3, 2024, vec![item(400)], ClaimStatus::Draft);
        assert!(claim.submitted_at.is_none());

        let now = Utc::now();
        claim.mark_submitted(now);

        assert_eq!(claim.status, ClaimStatus::PendingReview);
        assert_eq!(claim.submitted_at, Some(now));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("approved".parse::<ClaimStatus>(), Ok(ClaimStatus::Approved));
        assert_eq!("ChangesRequested".parse::<ClaimStatus>(), Ok(ClaimStatus::ChangesRequested));
        assert_eq!("changes_requested".parse::<ClaimStatus>(), Ok(ClaimStatus::ChangesRequested));
        assert!("review".parse::<ClaimStatus>().is_err());
    }
}
