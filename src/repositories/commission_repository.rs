//! Repository for per-supplier commission settings

use crate::error::RepositoryError;
use crate::models::CommissionSettings;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new settings version for a supplier
    pub async fn create(
        &self,
        supplier_id: Uuid,
        product_commission_rate: Decimal,
        delivery_commission_rate: Decimal,
        effective_from: NaiveDateTime,
    ) -> Result<CommissionSettings, RepositoryError> {
        for (name, rate) in [
            ("product commission rate", product_commission_rate),
            ("delivery commission rate", delivery_commission_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(RepositoryError::InvalidInput(format!(
                    "Invalid {}: {}",
                    name, rate
                )));
            }
        }

        let settings = sqlx::query_as::<_, CommissionSettings>(
            r#"
            INSERT INTO marketplace_commission_settings
                (id, supplier_id, product_commission_rate, delivery_commission_rate, effective_from)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id, supplier_id, product_commission_rate, delivery_commission_rate,
                effective_from, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(supplier_id)
        .bind(product_commission_rate)
        .bind(delivery_commission_rate)
        .bind(effective_from)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Fetch the settings version in force for a supplier at the given time.
    ///
    /// The most recent `effective_from` that is not in the future wins;
    /// `None` means the caller should fall back to the platform defaults.
    pub async fn find_effective(
        &self,
        supplier_id: Uuid,
        at: NaiveDateTime,
    ) -> Result<Option<CommissionSettings>, RepositoryError> {
        let settings = sqlx::query_as::<_, CommissionSettings>(
            r#"
            SELECT
                id, supplier_id, product_commission_rate, delivery_commission_rate,
                effective_from, created_at
            FROM marketplace_commission_settings
            WHERE supplier_id = $1 AND effective_from <= $2
            ORDER BY effective_from DESC
            LIMIT 1
            "#,
        )
        .bind(supplier_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Fetch every settings version for a supplier, newest first
    pub async fn find_by_supplier(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<CommissionSettings>, RepositoryError> {
        let settings = sqlx::query_as::<_, CommissionSettings>(
            r#"
            SELECT
                id, supplier_id, product_commission_rate, delivery_commission_rate,
                effective_from, created_at
            FROM marketplace_commission_settings
            WHERE supplier_id = $1
            ORDER BY effective_from DESC
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }
}
