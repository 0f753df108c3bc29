//! GasCart Pricing Core
//!
//! Dynamic pricing and commission-split engine for the GasCart on-demand
//! gas-cylinder delivery marketplace. The crate is a pure library surface:
//! the hosting application quotes prices with [`services::PriceCalculator`],
//! settles confirmed orders with [`services::MarketplaceService`], and wires
//! everything together through [`PricingState`].

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::{init_tracing, AppConfig, PricingConfig};
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use services::{FactorCollector, FactorProvider, MarketplaceService, PriceCalculator};
use std::sync::Arc;

/// Application state containing all repositories and services
pub struct PricingState {
    pub database: Database,
    pub price_history_repo: Arc<PriceHistoryRepository>,
    pub factor_rule_repo: Arc<FactorRuleRepository>,
    pub commission_repo: Arc<CommissionRepository>,
    pub payment_split_repo: Arc<PaymentSplitRepository>,
    pub fraud_log_repo: Arc<FraudLogRepository>,
    pub listing_repo: Arc<ListingRepository>,
    pub order_repo: Arc<OrderRepository>,
    pub factor_collector: Arc<FactorCollector>,
    pub price_calculator: Arc<PriceCalculator>,
    pub marketplace: Arc<MarketplaceService>,
}

impl PricingState {
    /// Create a new PricingState with initialized repositories and services.
    ///
    /// The factor provider is injected so hosts can swap the simulated
    /// source for an HTTP-backed one without touching the calculator.
    pub fn new(
        pool: sqlx::PgPool,
        provider: Arc<dyn FactorProvider>,
        config: &AppConfig,
    ) -> Self {
        let database = Database::new(pool.clone());

        let price_history_repo = Arc::new(PriceHistoryRepository::new(pool.clone()));
        let factor_rule_repo = Arc::new(FactorRuleRepository::new(pool.clone()));
        let commission_repo = Arc::new(CommissionRepository::new(pool.clone()));
        let payment_split_repo = Arc::new(PaymentSplitRepository::new(pool.clone()));
        let fraud_log_repo = Arc::new(FraudLogRepository::new(pool.clone()));
        let listing_repo = Arc::new(ListingRepository::new(pool.clone()));
        let order_repo = Arc::new(OrderRepository::new(pool));

        let factor_collector = Arc::new(FactorCollector::new(provider, &config.pricing));

        let price_calculator = Arc::new(
            PriceCalculator::new(factor_collector.clone(), &config.pricing)
                .with_history(price_history_repo.clone()),
        );

        let marketplace = Arc::new(MarketplaceService::new(
            factor_rule_repo.clone(),
            commission_repo.clone(),
            payment_split_repo.clone(),
            fraud_log_repo.clone(),
            listing_repo.clone(),
            order_repo.clone(),
            factor_collector.clone(),
            config.pricing.clone(),
        ));

        Self {
            database,
            price_history_repo,
            factor_rule_repo,
            commission_repo,
            payment_split_repo,
            fraud_log_repo,
            listing_repo,
            order_repo,
            factor_collector,
            price_calculator,
            marketplace,
        }
    }
}
