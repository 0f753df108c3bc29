use crate::models::FulfillmentType;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fulfillment modes a listing offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingFulfillment {
    Pickup,
    Delivery,
    Both,
}

impl ListingFulfillment {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pickup" => Ok(ListingFulfillment::Pickup),
            "delivery" => Ok(ListingFulfillment::Delivery),
            "both" => Ok(ListingFulfillment::Both),
            _ => Err(format!("Invalid listing fulfillment: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingFulfillment::Pickup => "pickup",
            ListingFulfillment::Delivery => "delivery",
            ListingFulfillment::Both => "both",
        }
    }

    /// Check whether a requested order fulfillment mode is offered
    pub fn supports(&self, requested: FulfillmentType) -> bool {
        match self {
            ListingFulfillment::Both => true,
            ListingFulfillment::Pickup => requested == FulfillmentType::Pickup,
            ListingFulfillment::Delivery => requested == FulfillmentType::Delivery,
        }
    }
}

impl From<String> for ListingFulfillment {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(ListingFulfillment::Both)
    }
}

impl From<ListingFulfillment> for String {
    fn from(fulfillment: ListingFulfillment) -> Self {
        fulfillment.as_str().to_string()
    }
}

/// A supplier's cylinder listing in the `gas_listings` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GasListing {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub product_name: String,
    pub base_price: Decimal,
    pub delivery_fee: Decimal,
    pub stock: i32,
    /// Units held by pending orders; available stock is `stock - reserved`
    pub reserved: i32,
    pub fulfillment: String, // Stored as TEXT, use ListingFulfillment enum for type safety
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl GasListing {
    /// Get fulfillment as an enum
    pub fn fulfillment_enum(&self) -> ListingFulfillment {
        ListingFulfillment::from_str(&self.fulfillment).unwrap_or(ListingFulfillment::Both)
    }

    /// Units not held by a reservation
    pub fn available(&self) -> i32 {
        self.stock - self.reserved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fulfillment_supports() {
        assert!(ListingFulfillment::Both.supports(FulfillmentType::Pickup));
        assert!(ListingFulfillment::Both.supports(FulfillmentType::Delivery));
        assert!(ListingFulfillment::Pickup.supports(FulfillmentType::Pickup));
        assert!(!ListingFulfillment::Pickup.supports(FulfillmentType::Delivery));
        assert!(!ListingFulfillment::Delivery.supports(FulfillmentType::Pickup));
    }
}
