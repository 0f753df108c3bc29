pub mod commission_repository;
pub mod factor_rule_repository;
pub mod fraud_log_repository;
pub mod listing_repository;
pub mod order_repository;
pub mod payment_split_repository;
pub mod price_history_repository;

// Re-export all repositories for convenient access
pub use commission_repository::CommissionRepository;
pub use factor_rule_repository::FactorRuleRepository;
pub use fraud_log_repository::FraudLogRepository;
pub use listing_repository::ListingRepository;
pub use order_repository::{NewOrder, OrderRepository};
pub use payment_split_repository::{NewPaymentSplit, PaymentSplitRepository};
pub use price_history_repository::PriceHistoryRepository;
