use crate::models::AppliedFactor;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-supplier commission configuration, versioned by `effective_from`.
///
/// The most recent row whose `effective_from` is not in the future wins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommissionSettings {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub product_commission_rate: Decimal,
    pub delivery_commission_rate: Decimal,
    pub effective_from: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// How an adjusted order price divides between platform, supplier and courier.
///
/// Invariant: `supplier_earning + platform_commission` equals the adjusted
/// product price and `courier_earning + delivery_commission` equals the
/// adjusted delivery fee, both exactly in whole currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub platform_commission: Decimal,
    pub delivery_commission: Decimal,
    pub total_commission: Decimal,
    pub supplier_earning: Decimal,
    pub courier_earning: Decimal,
}

/// Result of rule-based order pricing: adjusted charges plus their split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPricing {
    pub adjusted_product_price: Decimal,
    pub adjusted_delivery_fee: Decimal,
    pub total_multiplier: f64,
    pub applied_factors: Vec<AppliedFactor>,
    pub commission: CommissionBreakdown,
}

/// Which party a ledger entry pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitParty {
    Platform,
    Supplier,
    Courier,
}

impl SplitParty {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "platform" => Ok(SplitParty::Platform),
            "supplier" => Ok(SplitParty::Supplier),
            "courier" => Ok(SplitParty::Courier),
            _ => Err(format!("Invalid split party: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitParty::Platform => "platform",
            SplitParty::Supplier => "supplier",
            SplitParty::Courier => "courier",
        }
    }
}

impl From<String> for SplitParty {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(SplitParty::Platform)
    }
}

impl From<SplitParty> for String {
    fn from(party: SplitParty) -> Self {
        party.as_str().to_string()
    }
}

/// Settlement state of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStatus {
    Pending,
    Completed,
    Failed,
}

impl SplitStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(SplitStatus::Pending),
            "completed" => Ok(SplitStatus::Completed),
            "failed" => Ok(SplitStatus::Failed),
            _ => Err(format!("Invalid split status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitStatus::Pending => "pending",
            SplitStatus::Completed => "completed",
            SplitStatus::Failed => "failed",
        }
    }
}

impl From<String> for SplitStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(SplitStatus::Pending)
    }
}

impl From<SplitStatus> for String {
    fn from(status: SplitStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Ledger row in the `payment_splits` table.
///
/// One row per (order, party); the platform row completes immediately,
/// supplier and courier rows carry a deferred `scheduled_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentSplit {
    pub id: Uuid,
    pub order_id: Uuid,
    pub party: String, // Stored as TEXT, use SplitParty enum for type safety
    pub amount: Decimal,
    pub status: String, // Stored as TEXT, use SplitStatus enum for type safety
    pub scheduled_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl PaymentSplit {
    /// Get party as an enum
    pub fn party_enum(&self) -> SplitParty {
        SplitParty::from_str(&self.party).unwrap_or(SplitParty::Platform)
    }

    /// Get status as an enum
    pub fn status_enum(&self) -> SplitStatus {
        SplitStatus::from_str(&self.status).unwrap_or(SplitStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_party_conversion() {
        assert_eq!(SplitParty::Platform.as_str(), "platform");
        assert_eq!(SplitParty::from_str("courier").unwrap(), SplitParty::Courier);
        assert!(SplitParty::from_str("nobody").is_err());
    }

    #[test]
    fn test_split_status_conversion() {
        assert_eq!(SplitStatus::Pending.as_str(), "pending");
        assert_eq!(SplitStatus::from_str("COMPLETED").unwrap(), SplitStatus::Completed);
    }
}
