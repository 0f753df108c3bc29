//! Repository for the append-only price history log

use crate::error::RepositoryError;
use crate::models::{GeoPoint, HistoricalPrice, PriceCalculation};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PriceHistoryRepository {
    pool: PgPool,
}

impl PriceHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a finalized calculation. Rows are never updated afterwards.
    pub async fn save(
        &self,
        product_id: &str,
        order_id: Option<Uuid>,
        calculation: &PriceCalculation,
        location: Option<GeoPoint>,
    ) -> Result<HistoricalPrice, RepositoryError> {
        let factors = serde_json::to_value(calculation.factors)
            .map_err(|e| RepositoryError::InvalidInput(format!("Unserializable factors: {}", e)))?;

        let record = sqlx::query_as::<_, HistoricalPrice>(
            r#"
            INSERT INTO price_history
                (id, product_id, order_id, base_price, final_price, multiplier,
                 factors, latitude, longitude, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING
                id, product_id, order_id, base_price, final_price, multiplier,
                factors, latitude, longitude, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(order_id)
        .bind(calculation.base_price)
        .bind(calculation.final_price)
        .bind(calculation.multiplier)
        .bind(factors)
        .bind(location.map(|l| l.lat))
        .bind(location.map(|l| l.lng))
        .bind(calculation.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Fetch a product's price history, most recent first
    pub async fn find_by_product(
        &self,
        product_id: &str,
        limit: i64,
    ) -> Result<Vec<HistoricalPrice>, RepositoryError> {
        let records = sqlx::query_as::<_, HistoricalPrice>(
            r#"
            SELECT
                id, product_id, order_id, base_price, final_price, multiplier,
                factors, latitude, longitude, created_at
            FROM price_history
            WHERE product_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Fetch the prices recorded against an order
    pub async fn find_by_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<HistoricalPrice>, RepositoryError> {
        let records = sqlx::query_as::<_, HistoricalPrice>(
            r#"
            SELECT
                id, product_id, order_id, base_price, final_price, multiplier,
                factors, latitude, longitude, created_at
            FROM price_history
            WHERE order_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Fetch the most recent price recorded for a product
    pub async fn latest_for_product(
        &self,
        product_id: &str,
    ) -> Result<Option<HistoricalPrice>, RepositoryError> {
        let record = sqlx::query_as::<_, HistoricalPrice>(
            r#"
            SELECT
                id, product_id, order_id, base_price, final_price, multiplier,
                factors, latitude, longitude, created_at
            FROM price_history
            WHERE product_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
