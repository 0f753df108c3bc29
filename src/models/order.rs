use crate::models::CommissionBreakdown;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How an order is fulfilled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentType {
    Pickup,
    Delivery,
}

impl FulfillmentType {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pickup" => Ok(FulfillmentType::Pickup),
            "delivery" => Ok(FulfillmentType::Delivery),
            _ => Err(format!("Invalid fulfillment type: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentType::Pickup => "pickup",
            FulfillmentType::Delivery => "delivery",
        }
    }

    /// How long a reservation of this type holds stock before expiring
    pub fn reservation_ttl_hours(&self) -> i64 {
        match self {
            FulfillmentType::Pickup => 2,
            FulfillmentType::Delivery => 24,
        }
    }
}

impl From<String> for FulfillmentType {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(FulfillmentType::Pickup)
    }
}

impl From<FulfillmentType> for String {
    fn from(fulfillment: FulfillmentType) -> Self {
        fulfillment.as_str().to_string()
    }
}

/// Order lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(OrderStatus::Pending)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

/// An order in the `marketplace_orders` table.
///
/// A pending order doubles as the stock reservation; `expires_at` carries the
/// type-specific hold window (pickup 2h, delivery 24h). The adjusted prices
/// and commission split are captured at quote time so settlement reads them
/// back rather than recomputing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketplaceOrder {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub supplier_id: Uuid,
    pub customer_id: Uuid,
    pub quantity: i32,
    pub fulfillment: String, // Stored as TEXT, use FulfillmentType enum for type safety
    pub adjusted_product_price: Decimal,
    pub adjusted_delivery_fee: Decimal,
    pub platform_commission: Decimal,
    pub delivery_commission: Decimal,
    pub supplier_earning: Decimal,
    pub courier_earning: Decimal,
    pub status: String, // Stored as TEXT, use OrderStatus enum for type safety
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl MarketplaceOrder {
    /// Get fulfillment as an enum
    pub fn fulfillment_enum(&self) -> FulfillmentType {
        FulfillmentType::from_str(&self.fulfillment).unwrap_or(FulfillmentType::Pickup)
    }

    /// Get status as an enum
    pub fn status_enum(&self) -> OrderStatus {
        OrderStatus::from_str(&self.status).unwrap_or(OrderStatus::Pending)
    }

    /// Check if the order is still awaiting payment
    pub fn is_pending(&self) -> bool {
        self.status_enum() == OrderStatus::Pending
    }

    /// Rebuild the commission breakdown captured at quote time
    pub fn breakdown(&self) -> CommissionBreakdown {
        CommissionBreakdown {
            platform_commission: self.platform_commission,
            delivery_commission: self.delivery_commission,
            total_commission: self.platform_commission + self.delivery_commission,
            supplier_earning: self.supplier_earning,
            courier_earning: self.courier_earning,
        }
    }
}
