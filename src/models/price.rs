use crate::models::PricingFactors;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Round a price to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A finalized price quote. Immutable once produced.
///
/// Invariant: `final_price == round2(base_price * multiplier)` and
/// `multiplier >= 0.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCalculation {
    pub base_price: f64,
    pub final_price: f64,
    /// The validated (clamped) factors that produced this price
    pub factors: PricingFactors,
    pub multiplier: f64,
    pub timestamp: NaiveDateTime,
}

impl PriceCalculation {
    /// Check the rounding invariant holds for this calculation
    pub fn is_consistent(&self) -> bool {
        (self.final_price - round2(self.base_price * self.multiplier)).abs() < f64::EPSILON
    }
}

/// A persisted price record in the append-only `price_history` table.
///
/// Rows are written once after a calculation is finalized for an order or
/// cache entry and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoricalPrice {
    pub id: Uuid,
    pub product_id: String,
    pub order_id: Option<Uuid>,
    pub base_price: f64,
    pub final_price: f64,
    pub multiplier: f64,
    pub factors: Value, // JSONB stored as serde_json::Value
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl HistoricalPrice {
    /// Get the stored factors as a typed snapshot
    pub fn factors(&self) -> PricingFactors {
        serde_json::from_value(self.factors.clone()).unwrap_or_default()
    }

    /// Rehydrate the original calculation from this record
    pub fn calculation(&self) -> PriceCalculation {
        PriceCalculation {
            base_price: self.base_price,
            final_price: self.final_price,
            factors: self.factors(),
            multiplier: self.multiplier,
            timestamp: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1249.999), 1250.0);
        assert_eq!(round2(3725.004), 3725.0);
        assert_eq!(round2(10.0 / 3.0), 3.33);
    }

    #[test]
    fn test_calculation_consistency() {
        let calc = PriceCalculation {
            base_price: 2500.0,
            final_price: 1250.0,
            factors: PricingFactors::ZERO,
            multiplier: 0.5,
            timestamp: chrono::Utc::now().naive_utc(),
        };
        assert!(calc.is_consistent());
    }
}
