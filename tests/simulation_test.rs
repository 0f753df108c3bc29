use gascart_pricing::models::PricingFactors;
use gascart_pricing::services::{PriceRange, SimulationHarness, SimulationScenario};

/// The four canonical scenarios reproduce prices inside their documented
/// bands under the weighted formula
#[test]
fn test_default_scenarios_regression() {
    let mut harness = SimulationHarness::new();
    let results = harness.run_all();

    assert_eq!(results.len(), 4);

    let normal = results
        .iter()
        .find(|r| r.scenario == "normal-demand")
        .expect("normal-demand scenario present");
    assert!(normal.passed, "normal-demand must pass end-to-end");
    assert!((normal.calculation.final_price - 3725.0).abs() < 0.01);

    for result in &results {
        assert!(
            result.passed,
            "{} priced {:.2} outside [{:.2}, {:.2}]",
            result.scenario,
            result.calculation.final_price,
            result.expected_range.min,
            result.expected_range.max
        );
    }
}

/// Expected prices under the documented formula, pinned per scenario
#[test]
fn test_scenario_prices_match_formula() {
    let mut harness = SimulationHarness::new();
    let results = harness.run_all();

    let expected = [
        ("normal-demand", 3725.0),
        ("high-demand", 6612.5),
        ("low-demand", 1737.5),
        ("scarcity-event", 5862.5),
    ];

    for (name, price) in expected {
        let result = results
            .iter()
            .find(|r| r.scenario == name)
            .unwrap_or_else(|| panic!("scenario {} missing", name));
        assert!(
            (result.calculation.final_price - price).abs() < 0.01,
            "{}: expected {:.2}, got {:.2}",
            name,
            price,
            result.calculation.final_price
        );
    }
}

/// The report summarizes accumulated results with a success rate
#[test]
fn test_report_summarizes_runs() {
    let mut harness = SimulationHarness::new();
    harness.run_all();

    let report = harness.report();
    assert!(report.contains("4/4 passed"));
    assert!(report.contains("100.0% success rate"));
    assert!(report.contains("normal-demand"));
}

/// Custom scenarios flow through the same pass/deviation accounting
#[test]
fn test_custom_scenario() {
    let scenario = SimulationScenario {
        name: "frozen-market".to_string(),
        base_price: 4000.0,
        factors: PricingFactors::ZERO,
        expected_range: PriceRange::new(1500.0, 2500.0),
    };

    let mut harness = SimulationHarness::with_scenarios(vec![scenario.clone()]);
    let result = harness.run_scenario(&scenario);

    assert!(result.passed); // floored multiplier: 4000 * 0.5 = 2000
    assert_eq!(result.calculation.final_price, 2000.0);
    assert_eq!(result.deviation, 0.0);
}
