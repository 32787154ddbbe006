use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimItem, ClaimStatus, SupportingDocument};
use claimdesk_core::errors::RepositoryError;
use claimdesk_core::workflow::ClaimRepository;

use super::storage_error;
use crate::DbPool;

/// SQLite-backed claim storage. Line items and documents ride along as
/// JSON columns: they are owned exclusively by one claim and always read
/// and written together with it.
pub struct SqlClaimRepository {
    pool: DbPool,
}

impl SqlClaimRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClaimRepository for SqlClaimRepository {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Claim>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, month, year, status, total_amount, created_at, submitted_at, \
                    items, documents \
             FROM claims WHERE owner_id = ?1 ORDER BY created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(claim_from_row).collect()
    }

    async fn find_by_id(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, owner_id, month, year, status, total_amount, created_at, submitted_at, \
                    items, documents \
             FROM claims WHERE id = ?1",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.as_ref().map(claim_from_row).transpose()
    }

    async fn find_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, month, year, status, total_amount, created_at, submitted_at, \
                    items, documents \
             FROM claims WHERE status = ?1 ORDER BY created_at",
        )
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(claim_from_row).collect()
    }

    async fn save(&self, mut claim: Claim) -> Result<Claim, RepositoryError> {
        if claim.id.0.is_empty() {
            claim.id = ClaimId::new();
        }

        let items = serde_json::to_string(&claim.items).map_err(storage_error)?;
        let documents = serde_json::to_string(&claim.documents).map_err(storage_error)?;

        // Owner, period, and creation time are immutable after the first
        // save; a conflicting insert only refreshes the mutable columns.
        sqlx::query(
            "INSERT INTO claims \
                 (id, owner_id, month, year, status, total_amount, created_at, submitted_at, \
                  items, documents) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             ON CONFLICT(id) DO UPDATE SET \
                 status = excluded.status, \
                 total_amount = excluded.total_amount, \
                 submitted_at = excluded.submitted_at, \
                 items = excluded.items, \
                 documents = excluded.documents",
        )
        .bind(&claim.id.0)
        .bind(&claim.owner_id)
        .bind(claim.month)
        .bind(claim.year)
        .bind(claim.status.to_string())
        .bind(claim.total_amount.to_string())
        .bind(claim.created_at)
        .bind(claim.submitted_at)
        .bind(items)
        .bind(documents)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(claim)
    }
}

fn claim_from_row(row: &SqliteRow) -> Result<Claim, RepositoryError> {
    let status: String = row.try_get("status").map_err(storage_error)?;
    let total_amount: String = row.try_get("total_amount").map_err(storage_error)?;
    let items: String = row.try_get("items").map_err(storage_error)?;
    let documents: String = row.try_get("documents").map_err(storage_error)?;

    Ok(Claim {
        id: ClaimId(row.try_get("id").map_err(storage_error)?),
        owner_id: row.try_get("owner_id").map_err(storage_error)?,
        month: row.try_get("month").map_err(storage_error)?,
        year: row.try_get("year").map_err(storage_error)?,
        status: status.parse::<ClaimStatus>().map_err(RepositoryError::Storage)?,
        total_amount: total_amount.parse::<Decimal>().map_err(storage_error)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(storage_error)?,
        submitted_at: row
            .try_get::<Option<DateTime<Utc>>, _>("submitted_at")
            .map_err(storage_error)?,
        items: serde_json::from_str::<Vec<ClaimItem>>(&items).map_err(storage_error)?,
        documents: serde_json::from_str::<Vec<SupportingDocument>>(&documents)
            .map_err(storage_error)?,
    })
}
