//! Repository for supplier gas listings and their stock reservations

use crate::error::RepositoryError;
use crate::models::{GasListing, ListingFulfillment};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new listing
    pub async fn create(
        &self,
        supplier_id: Uuid,
        product_name: &str,
        base_price: Decimal,
        delivery_fee: Decimal,
        stock: i32,
        fulfillment: ListingFulfillment,
    ) -> Result<GasListing, RepositoryError> {
        if base_price <= Decimal::ZERO {
            return Err(RepositoryError::InvalidInput(
                "Listing base price must be positive".to_string(),
            ));
        }
        if stock < 0 {
            return Err(RepositoryError::InvalidInput(
                "Listing stock cannot be negative".to_string(),
            ));
        }

        let listing = sqlx::query_as::<_, GasListing>(
            r#"
            INSERT INTO gas_listings
                (id, supplier_id, product_name, base_price, delivery_fee, stock,
                 reserved, fulfillment, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, TRUE)
            RETURNING
                id, supplier_id, product_name, base_price, delivery_fee, stock,
                reserved, fulfillment, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(supplier_id)
        .bind(product_name)
        .bind(base_price)
        .bind(delivery_fee)
        .bind(stock)
        .bind(fulfillment.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(listing)
    }

    /// Find a listing by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GasListing>, RepositoryError> {
        let listing = sqlx::query_as::<_, GasListing>(
            r#"
            SELECT
                id, supplier_id, product_name, base_price, delivery_fee, stock,
                reserved, fulfillment, is_active, created_at
            FROM gas_listings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    /// Place a hold on stock for a pending order.
    ///
    /// The guarded UPDATE only succeeds while enough unreserved stock remains,
    /// so two concurrent orders cannot both hold the last cylinder.
    pub async fn reserve_stock(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<GasListing, RepositoryError> {
        if quantity <= 0 {
            return Err(RepositoryError::InvalidInput(
                "Reservation quantity must be positive".to_string(),
            ));
        }

        let listing = sqlx::query_as::<_, GasListing>(
            r#"
            UPDATE gas_listings
            SET reserved = reserved + $2
            WHERE id = $1 AND is_active = TRUE AND stock - reserved >= $2
            RETURNING
                id, supplier_id, product_name, base_price, delivery_fee, stock,
                reserved, fulfillment, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::BusinessRule(format!(
                "Insufficient stock on listing {} for quantity {}",
                id, quantity
            ))
        })?;

        Ok(listing)
    }

    /// Release a hold without selling (cancellation, expiry, or rollback)
    pub async fn release_stock(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<GasListing, RepositoryError> {
        let listing = sqlx::query_as::<_, GasListing>(
            r#"
            UPDATE gas_listings
            SET reserved = reserved - $2
            WHERE id = $1 AND reserved >= $2
            RETURNING
                id, supplier_id, product_name, base_price, delivery_fee, stock,
                reserved, fulfillment, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::BusinessRule(format!(
                "Cannot release {} units on listing {}: not that many reserved",
                quantity, id
            ))
        })?;

        Ok(listing)
    }

    /// Convert a hold into a sale on order confirmation
    pub async fn commit_stock(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<GasListing, RepositoryError> {
        let listing = sqlx::query_as::<_, GasListing>(
            r#"
            UPDATE gas_listings
            SET stock = stock - $2, reserved = reserved - $2
            WHERE id = $1 AND reserved >= $2 AND stock >= $2
            RETURNING
                id, supplier_id, product_name, base_price, delivery_fee, stock,
                reserved, fulfillment, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::BusinessRule(format!(
                "Cannot commit {} units on listing {}: reservation missing",
                quantity, id
            ))
        })?;

        Ok(listing)
    }
}
