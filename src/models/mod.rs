//! Domain models for the GasCart pricing core.
//!
//! This module contains the value objects of the pricing engine and all
//! database-backed rows it reads and writes.

pub mod commission;
pub mod factor_rule;
pub mod factors;
pub mod fraud;
pub mod listing;
pub mod order;
pub mod price;

// Re-export all models for convenient access
pub use commission::{
    CommissionBreakdown, CommissionSettings, OrderPricing, PaymentSplit, SplitParty, SplitStatus,
};
pub use factor_rule::{AppliedFactor, FactorType, PricingFactorRule, RuleConditions};
pub use factors::{GeoPoint, PricingFactors};
pub use fraud::{FraudAssessment, FraudLog, FraudLogStatus, FraudSignals};
pub use listing::{GasListing, ListingFulfillment};
pub use order::{FulfillmentType, MarketplaceOrder, OrderStatus};
pub use price::{round2, HistoricalPrice, PriceCalculation};
