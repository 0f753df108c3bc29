//! The dynamic pricing engine: six weighted signals in, one price out.

use crate::config::PricingConfig;
use crate::error::AppResult;
use crate::models::{round2, GeoPoint, PriceCalculation, PricingFactors};
use crate::repositories::PriceHistoryRepository;
use crate::services::factor_collector::FactorCollector;
use crate::services::price_cache::PriceCache;
use std::sync::Arc;
use tracing::{debug, warn};

/// Signal weights; they sum to 1.0
pub const WEIGHT_SCARCITY: f64 = 0.30;
pub const WEIGHT_WEATHER: f64 = 0.15;
pub const WEIGHT_TRAFFIC: f64 = 0.20;
pub const WEIGHT_DEMAND: f64 = 0.25;
pub const WEIGHT_TIME_OF_DAY: f64 = 0.05;
pub const WEIGHT_DAY_OF_WEEK: f64 = 0.05;

/// Lower bound on the multiplier: prices never fall below half the base
pub const MULTIPLIER_FLOOR: f64 = 0.5;

/// Calculates quotes from a base price and a factor snapshot.
///
/// The formula itself is pure; the service wraps it with factor collection,
/// a read-through cache and an optional history append.
pub struct PriceCalculator {
    collector: Arc<FactorCollector>,
    cache: PriceCache,
    history: Option<Arc<PriceHistoryRepository>>,
}

impl PriceCalculator {
    pub fn new(collector: Arc<FactorCollector>, config: &PricingConfig) -> Self {
        Self {
            collector,
            cache: PriceCache::new(config.cache_ttl(), config.cache_max_entries),
            history: None,
        }
    }

    /// Record every computed quote in the price history store
    pub fn with_history(mut self, history: Arc<PriceHistoryRepository>) -> Self {
        self.history = Some(history);
        self
    }

    /// Clamp every factor into [0, 1]; out-of-range inputs are softened,
    /// never rejected
    pub fn validate_factors(factors: PricingFactors) -> PricingFactors {
        factors.clamped()
    }

    /// Weighted impact mapped onto a multiplier in [0.5, 3.5].
    ///
    /// `multiplier = 1 + (impact * 3 - 0.5)` floored at 0.5, so an all-quiet
    /// market halves the price and a fully stressed one reaches 3.5x base.
    pub fn calculate_multiplier(factors: &PricingFactors) -> f64 {
        let weighted_impact = factors.scarcity * WEIGHT_SCARCITY
            + factors.weather * WEIGHT_WEATHER
            + factors.traffic * WEIGHT_TRAFFIC
            + factors.demand * WEIGHT_DEMAND
            + factors.time_of_day * WEIGHT_TIME_OF_DAY
            + factors.day_of_week * WEIGHT_DAY_OF_WEEK;

        (1.0 + (weighted_impact * 3.0 - 0.5)).max(MULTIPLIER_FLOOR)
    }

    /// Produce a quote from a base price and raw factors.
    ///
    /// Deterministic apart from the timestamp. A non-positive base price is
    /// passed through unvalidated and yields a non-positive quote; rejecting
    /// it is a product decision the engine does not make.
    pub fn calculate_dynamic_price(base_price: f64, factors: PricingFactors) -> PriceCalculation {
        let factors = Self::validate_factors(factors);
        let multiplier = Self::calculate_multiplier(&factors);

        PriceCalculation {
            base_price,
            final_price: round2(base_price * multiplier),
            factors,
            multiplier,
            timestamp: chrono::Utc::now().naive_utc(),
        }
    }

    /// Operator escape hatch: a fixed multiplier, no factor input.
    ///
    /// All factors are reported as zero so the quote is visibly synthetic.
    /// The caller owns the audit trail of who invoked the override.
    pub fn apply_manual_override(base_price: f64, override_multiplier: f64) -> PriceCalculation {
        warn!(
            "Manual price override applied: base={}, multiplier={}",
            base_price, override_multiplier
        );

        PriceCalculation {
            base_price,
            final_price: round2(base_price * override_multiplier),
            factors: PricingFactors::ZERO,
            multiplier: override_multiplier,
            timestamp: chrono::Utc::now().naive_utc(),
        }
    }

    /// Quote a product through the cache.
    ///
    /// A fresh cached quote is returned as-is; otherwise factors are
    /// collected (neutral weather/traffic defaults when no location is
    /// given), a new quote is computed, cached, and appended to the history
    /// store when one is wired. A history write failure downgrades to a
    /// warning: losing an audit row must not lose the quote.
    pub async fn get_price(
        &self,
        product_id: &str,
        base_price: f64,
        location: Option<GeoPoint>,
    ) -> AppResult<PriceCalculation> {
        if let Some(cached) = self.cache.get(product_id).await {
            debug!("Price cache hit for product {}", product_id);
            return Ok(cached);
        }

        let factors = self.collector.collect(location).await;
        let calculation = Self::calculate_dynamic_price(base_price, factors);

        self.cache.insert(product_id, calculation.clone()).await;

        if let Some(history) = &self.history {
            if let Err(e) = history.save(product_id, None, &calculation, location).await {
                warn!("Failed to record price history for {}: {}", product_id, e);
            }
        }

        Ok(calculation)
    }

    /// Drop every cached quote, forcing recomputation
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(
        scarcity: f64,
        weather: f64,
        traffic: f64,
        demand: f64,
        time_of_day: f64,
        day_of_week: f64,
    ) -> PricingFactors {
        PricingFactors {
            scarcity,
            weather,
            traffic,
            demand,
            time_of_day,
            day_of_week,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_SCARCITY
            + WEIGHT_WEATHER
            + WEIGHT_TRAFFIC
            + WEIGHT_DEMAND
            + WEIGHT_TIME_OF_DAY
            + WEIGHT_DAY_OF_WEEK;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_floor_at_all_zero() {
        let m = PriceCalculator::calculate_multiplier(&PricingFactors::ZERO);
        assert_eq!(m, 0.5);
    }

    #[test]
    fn test_multiplier_ceiling_at_all_max() {
        let m = PriceCalculator::calculate_multiplier(&factors(1.0, 1.0, 1.0, 1.0, 1.0, 1.0));
        assert!((m - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_never_below_floor() {
        for scarcity in [0.0, 0.05, 0.1] {
            let m = PriceCalculator::calculate_multiplier(&factors(scarcity, 0.0, 0.0, 0.0, 0.0, 0.0));
            assert!(m >= MULTIPLIER_FLOOR, "multiplier {} below floor", m);
        }
    }

    #[test]
    fn test_quiet_market_halves_price() {
        let calc = PriceCalculator::calculate_dynamic_price(2500.0, PricingFactors::ZERO);
        assert_eq!(calc.multiplier, 0.5);
        assert_eq!(calc.final_price, 1250.0);
        assert!(calc.is_consistent());
    }

    #[test]
    fn test_stressed_market_reaches_three_and_a_half() {
        let calc =
            PriceCalculator::calculate_dynamic_price(1000.0, factors(1.0, 1.0, 1.0, 1.0, 1.0, 1.0));
        assert!((calc.multiplier - 3.5).abs() < 1e-12);
        assert_eq!(calc.final_price, 3500.0);
    }

    #[test]
    fn test_out_of_range_factors_are_clamped() {
        let calc =
            PriceCalculator::calculate_dynamic_price(1000.0, factors(-0.5, 1.7, 0.3, 2.0, -1.0, 0.5));
        assert!(calc.factors.is_normalized());
    }

    #[test]
    fn test_determinism() {
        let input = factors(0.3, 0.2, 0.3, 0.5, 0.5, 0.0);
        let a = PriceCalculator::calculate_dynamic_price(2500.0, input);
        let b = PriceCalculator::calculate_dynamic_price(2500.0, input);
        assert_eq!(a.final_price, b.final_price);
        assert_eq!(a.multiplier, b.multiplier);
    }

    #[test]
    fn test_manual_override_bypasses_factors() {
        let calc = PriceCalculator::apply_manual_override(2000.0, 1.2);
        assert_eq!(calc.final_price, 2400.0);
        assert_eq!(calc.multiplier, 1.2);
        assert_eq!(calc.factors, PricingFactors::ZERO);
    }

    #[test]
    fn test_override_is_not_floored() {
        // The override is an operator decision; the 0.5 floor only binds the
        // factor-driven path.
        let calc = PriceCalculator::apply_manual_override(1000.0, 0.25);
        assert_eq!(calc.final_price, 250.0);
    }
}
