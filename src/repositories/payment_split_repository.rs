//! Repository for the payment-split ledger

use crate::error::RepositoryError;
use crate::models::{PaymentSplit, SplitParty, SplitStatus};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// A ledger row awaiting insertion
#[derive(Debug, Clone)]
pub struct NewPaymentSplit {
    pub order_id: Uuid,
    pub party: SplitParty,
    pub amount: Decimal,
    pub status: SplitStatus,
    pub scheduled_at: NaiveDateTime,
}

pub struct PaymentSplitRepository {
    pool: PgPool,
}

impl PaymentSplitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a batch of ledger rows atomically.
    ///
    /// The (order_id, party) unique constraint rejects a concurrent re-split
    /// of the same order; the whole batch rolls back in that case.
    pub async fn insert_splits(
        &self,
        splits: &[NewPaymentSplit],
    ) -> Result<Vec<PaymentSplit>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(splits.len());

        for split in splits {
            if split.amount < Decimal::ZERO {
                return Err(RepositoryError::InvalidInput(format!(
                    "Negative split amount for {}: {}",
                    split.party.as_str(),
                    split.amount
                )));
            }

            let row = sqlx::query_as::<_, PaymentSplit>(
                r#"
                INSERT INTO payment_splits
                    (id, order_id, party, amount, status, scheduled_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING
                    id, order_id, party, amount, status, scheduled_at, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(split.order_id)
            .bind(split.party.as_str())
            .bind(split.amount)
            .bind(split.status.as_str())
            .bind(split.scheduled_at)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Fetch the ledger rows for an order
    pub async fn find_by_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<PaymentSplit>, RepositoryError> {
        let splits = sqlx::query_as::<_, PaymentSplit>(
            r#"
            SELECT id, order_id, party, amount, status, scheduled_at, created_at
            FROM payment_splits
            WHERE order_id = $1
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(splits)
    }

    /// Check whether an order has already been split
    pub async fn exists_for_order(&self, order_id: Uuid) -> Result<bool, RepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM payment_splits WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Fetch pending rows whose scheduled time has arrived
    pub async fn find_due(
        &self,
        now: NaiveDateTime,
        limit: i64,
    ) -> Result<Vec<PaymentSplit>, RepositoryError> {
        let splits = sqlx::query_as::<_, PaymentSplit>(
            r#"
            SELECT id, order_id, party, amount, status, scheduled_at, created_at
            FROM payment_splits
            WHERE status = 'pending' AND scheduled_at <= $1
            ORDER BY scheduled_at ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(splits)
    }

    /// Mark a ledger row as paid out
    pub async fn mark_completed(&self, id: Uuid) -> Result<PaymentSplit, RepositoryError> {
        let split = sqlx::query_as::<_, PaymentSplit>(
            r#"
            UPDATE payment_splits
            SET status = 'completed'
            WHERE id = $1 AND status = 'pending'
            RETURNING
                id, order_id, party, amount, status, scheduled_at, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::BusinessRule(format!("Split {} is not pending", id))
        })?;

        Ok(split)
    }
}
