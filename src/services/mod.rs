pub mod factor_collector;
pub mod factor_provider;
pub mod marketplace;
pub mod price_cache;
pub mod price_calculator;
pub mod simulation;

pub use factor_collector::FactorCollector;
pub use factor_provider::{FactorProvider, HttpFactorProvider, SimulatedFactorProvider};
pub use marketplace::{
    MarketplaceService, OrderQuoteRequest, PaymentConfirmation, PlaceOrderRequest,
};
pub use price_cache::PriceCache;
pub use price_calculator::PriceCalculator;
pub use simulation::{PriceRange, SimulationHarness, SimulationResult, SimulationScenario};
