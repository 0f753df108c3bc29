use gascart_pricing::config::PricingConfig;
use gascart_pricing::models::{FraudSignals, GeoPoint, PricingFactors};
use gascart_pricing::services::marketplace::{score_signals, split_charges};
use gascart_pricing::services::{
    FactorCollector, PriceCalculator, SimulatedFactorProvider,
};
use rust_decimal::Decimal;
use std::sync::Arc;

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

/// Property: validation clamps every out-of-range field into [0, 1]
#[test]
fn test_clamping_invariant() {
    let wild = factors(-0.5, 1.7, 42.0, -3.0, 1.01, -0.01);
    let validated = PriceCalculator::validate_factors(wild);
    assert!(validated.is_normalized());
}

/// Property: the multiplier never falls below 0.5 for any factor combination
#[test]
fn test_multiplier_floor() {
    let grid = [0.0, 0.1, 0.25, 0.5, 0.75, 1.0];
    for &s in &grid {
        for &d in &grid {
            for &t in &grid {
                let m = PriceCalculator::calculate_multiplier(&factors(s, 0.0, t, d, 0.0, 0.0));
                assert!(m >= 0.5, "multiplier {} below floor for ({}, {}, {})", m, s, d, t);
            }
        }
    }
}

/// Property: identical inputs produce identical prices and multipliers
#[test]
fn test_determinism() {
    let input = factors(0.42, 0.13, 0.37, 0.91, 0.5, 0.7);
    let first = PriceCalculator::calculate_dynamic_price(1777.0, input);
    let second = PriceCalculator::calculate_dynamic_price(1777.0, input);
    assert_eq!(first.final_price, second.final_price);
    assert_eq!(first.multiplier, second.multiplier);
    assert_eq!(first.factors, second.factors);
}

/// Property: an all-quiet market floors the multiplier and halves the base
#[test]
fn test_rounding_contract_at_floor() {
    let calc = PriceCalculator::calculate_dynamic_price(2500.0, PricingFactors::ZERO);
    assert_eq!(calc.multiplier, 0.5);
    assert_eq!(calc.final_price, 1250.0);
    assert!(calc.is_consistent());
}

/// Property: all factors at maximum reach the 3.5x ceiling
#[test]
fn test_all_max_factors() {
    let calc = PriceCalculator::calculate_dynamic_price(1000.0, factors(1.0, 1.0, 1.0, 1.0, 1.0, 1.0));
    assert!((calc.multiplier - 3.5).abs() < 1e-12);
    assert_eq!(calc.final_price, 3500.0);
}

/// Property: the manual override bypasses factor computation entirely
#[test]
fn test_manual_override_bypass() {
    let calc = PriceCalculator::apply_manual_override(2000.0, 1.2);
    assert_eq!(calc.final_price, 2400.0);
    assert_eq!(calc.multiplier, 1.2);
    assert_eq!(calc.factors, PricingFactors::ZERO);
}

/// Property: no usable maximum inventory means maximal scarcity
#[test]
fn test_scarcity_edge_case() {
    assert_eq!(FactorCollector::scarcity(10.0, 0.0), 1.0);
}

/// Property: demand saturates at 1.5x the trailing average
#[test]
fn test_demand_saturation() {
    assert_eq!(FactorCollector::demand(150.0, 100.0), 1.0);
    assert_eq!(FactorCollector::demand(151.0, 100.0), 1.0);
    assert!(FactorCollector::demand(149.0, 100.0) < 1.0);
}

/// Property: within the TTL the second read is served from the cache
#[tokio::test]
async fn test_cache_hit_within_ttl() {
    let config = PricingConfig::default();
    let collector = Arc::new(FactorCollector::new(
        Arc::new(SimulatedFactorProvider::default()),
        &config,
    ));
    let calculator = PriceCalculator::new(collector, &config);

    let first = calculator.get_price("cyl-13kg", 1000.0, None).await.unwrap();
    let second = calculator.get_price("cyl-13kg", 1000.0, None).await.unwrap();

    // The cached quote is returned verbatim, timestamp included
    assert_eq!(first, second);
}

/// Property: a stale entry is a miss and forces recomputation
#[tokio::test]
async fn test_cache_expiry_forces_recomputation() {
    let config = PricingConfig {
        cache_ttl_secs: 0,
        ..PricingConfig::default()
    };
    let collector = Arc::new(FactorCollector::new(
        Arc::new(SimulatedFactorProvider::default()),
        &config,
    ));
    let calculator = PriceCalculator::new(collector, &config);

    let first = calculator.get_price("cyl-13kg", 1000.0, None).await.unwrap();
    let second = calculator.get_price("cyl-13kg", 1000.0, None).await.unwrap();

    // Same deterministic price, but a newly produced calculation
    assert_eq!(first.final_price, second.final_price);
    assert!(second.timestamp >= first.timestamp);
}

/// Property: clear_cache drops entries unconditionally
#[tokio::test]
async fn test_clear_cache() {
    let config = PricingConfig::default();
    let collector = Arc::new(FactorCollector::new(
        Arc::new(SimulatedFactorProvider::default()),
        &config,
    ));
    let calculator = PriceCalculator::new(collector, &config);

    let first = calculator.get_price("cyl-6kg", 800.0, None).await.unwrap();
    calculator.clear_cache().await;
    let second = calculator.get_price("cyl-6kg", 800.0, None).await.unwrap();

    assert!(second.timestamp >= first.timestamp);
    assert_eq!(first.final_price, second.final_price);
}

/// Property: quotes honor the provider's scores when a location is given
#[tokio::test]
async fn test_location_feeds_provider_scores() {
    let config = PricingConfig::default();
    let collector = Arc::new(FactorCollector::new(
        Arc::new(SimulatedFactorProvider::new(1.0, 1.0)),
        &config,
    ));
    let calculator = PriceCalculator::new(collector, &config);

    let with_location = calculator
        .get_price("cyl-13kg", 1000.0, Some(GeoPoint::new(-1.28, 36.82)))
        .await
        .unwrap();
    let without = calculator.get_price("cyl-13kg-b", 1000.0, None).await.unwrap();

    assert!(with_location.final_price > without.final_price);
    assert_eq!(with_location.factors.weather, 1.0);
    assert_eq!(without.factors.weather, 0.2);
}

/// Property: the split conserves both adjusted amounts within a whole unit
#[test]
fn test_commission_conservation() {
    for adjusted in [1_i64, 37, 1000, 4863, 99_999] {
        for rate_bp in [0_i64, 500, 1500, 3300, 10_000] {
            let product = Decimal::from(adjusted);
            let rate = Decimal::new(rate_bp, 4);
            let b = split_charges(product, Decimal::from(351), rate, Decimal::new(10, 2));

            assert_eq!(b.supplier_earning + b.platform_commission, product);
            assert!(b.platform_commission >= Decimal::ZERO);
            assert!(b.supplier_earning >= Decimal::ZERO);
        }
    }
}

/// Property: 11 orders plus a 60,000 order scores exactly 50 and is not
/// flagged; one more anomaly pushes it over the review threshold
#[test]
fn test_fraud_score_boundary() {
    let at_boundary = FraudSignals {
        orders_last_24h: 11,
        order_amount: Decimal::from(60_000),
        ..FraudSignals::default()
    };
    let assessment = score_signals(&at_boundary);
    assert_eq!(assessment.risk_score, 50);
    assert!(!assessment.action_required);

    let over_boundary = FraudSignals {
        price_change_pct: 51.0,
        ..at_boundary
    };
    let assessment = score_signals(&over_boundary);
    assert_eq!(assessment.risk_score, 85);
    assert!(assessment.action_required);
}
