//! Repository for marketplace orders

use crate::error::RepositoryError;
use crate::models::{CommissionBreakdown, FulfillmentType, MarketplaceOrder, OrderStatus};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// An order awaiting insertion, with its breakdown captured at quote time
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub listing_id: Uuid,
    pub supplier_id: Uuid,
    pub customer_id: Uuid,
    pub quantity: i32,
    pub fulfillment: FulfillmentType,
    pub adjusted_product_price: Decimal,
    pub adjusted_delivery_fee: Decimal,
    pub breakdown: CommissionBreakdown,
    pub expires_at: NaiveDateTime,
}

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending order
    pub async fn create(&self, order: &NewOrder) -> Result<MarketplaceOrder, RepositoryError> {
        let row = sqlx::query_as::<_, MarketplaceOrder>(
            r#"
            INSERT INTO marketplace_orders
                (id, listing_id, supplier_id, customer_id, quantity, fulfillment,
                 adjusted_product_price, adjusted_delivery_fee,
                 platform_commission, delivery_commission,
                 supplier_earning, courier_earning,
                 status, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending', $13)
            RETURNING
                id, listing_id, supplier_id, customer_id, quantity, fulfillment,
                adjusted_product_price, adjusted_delivery_fee,
                platform_commission, delivery_commission,
                supplier_earning, courier_earning,
                status, expires_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.listing_id)
        .bind(order.supplier_id)
        .bind(order.customer_id)
        .bind(order.quantity)
        .bind(order.fulfillment.as_str())
        .bind(order.adjusted_product_price)
        .bind(order.adjusted_delivery_fee)
        .bind(order.breakdown.platform_commission)
        .bind(order.breakdown.delivery_commission)
        .bind(order.breakdown.supplier_earning)
        .bind(order.breakdown.courier_earning)
        .bind(order.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find an order by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MarketplaceOrder>, RepositoryError> {
        let order = sqlx::query_as::<_, MarketplaceOrder>(
            r#"
            SELECT
                id, listing_id, supplier_id, customer_id, quantity, fulfillment,
                adjusted_product_price, adjusted_delivery_fee,
                platform_commission, delivery_commission,
                supplier_earning, courier_earning,
                status, expires_at, created_at
            FROM marketplace_orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Move an order out of `pending`.
    ///
    /// Guarded on the current status so confirm and cancel cannot race each
    /// other into a double transition.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<MarketplaceOrder, RepositoryError> {
        let order = sqlx::query_as::<_, MarketplaceOrder>(
            r#"
            UPDATE marketplace_orders
            SET status = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING
                id, listing_id, supplier_id, customer_id, quantity, fulfillment,
                adjusted_product_price, adjusted_delivery_fee,
                platform_commission, delivery_commission,
                supplier_earning, courier_earning,
                status, expires_at, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::BusinessRule(format!("Order {} is not pending", id))
        })?;

        Ok(order)
    }

    /// Fetch pending orders whose reservation window has lapsed
    pub async fn find_expired(
        &self,
        now: NaiveDateTime,
        limit: i64,
    ) -> Result<Vec<MarketplaceOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, MarketplaceOrder>(
            r#"
            SELECT
                id, listing_id, supplier_id, customer_id, quantity, fulfillment,
                adjusted_product_price, adjusted_delivery_fee,
                platform_commission, delivery_commission,
                supplier_earning, courier_earning,
                status, expires_at, created_at
            FROM marketplace_orders
            WHERE status = 'pending' AND expires_at < $1
            ORDER BY expires_at ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}
