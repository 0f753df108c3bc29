//! Regression harness for the weighted-multiplier formula.
//!
//! Runs named market scenarios through the calculator and checks the quotes
//! land inside their expected bands. Not production logic; it documents the
//! invariants the engine must keep satisfying as the weights evolve.

use crate::models::{PriceCalculation, PricingFactors};
use crate::services::price_calculator::PriceCalculator;

/// Expected price band for a scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// A named market situation with a fixed factor snapshot
#[derive(Debug, Clone)]
pub struct SimulationScenario {
    pub name: String,
    pub base_price: f64,
    pub factors: PricingFactors,
    pub expected_range: PriceRange,
}

/// Outcome of running one scenario
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub scenario: String,
    pub calculation: PriceCalculation,
    pub expected_range: PriceRange,
    /// Distance from the midpoint of the expected band
    pub deviation: f64,
    pub passed: bool,
}

/// Runs scenarios through [`PriceCalculator`] and accumulates results
#[derive(Default)]
pub struct SimulationHarness {
    scenarios: Vec<SimulationScenario>,
    results: Vec<SimulationResult>,
}

impl SimulationHarness {
    /// Harness preloaded with the four canonical scenarios
    pub fn new() -> Self {
        Self {
            scenarios: Self::default_scenarios(),
            results: Vec::new(),
        }
    }

    /// Harness with a custom scenario set
    pub fn with_scenarios(scenarios: Vec<SimulationScenario>) -> Self {
        Self {
            scenarios,
            results: Vec::new(),
        }
    }

    /// The four canonical market situations
    pub fn default_scenarios() -> Vec<SimulationScenario> {
        vec![
            SimulationScenario {
                name: "normal-demand".to_string(),
                base_price: 2500.0,
                factors: PricingFactors {
                    scarcity: 0.3,
                    weather: 0.2,
                    traffic: 0.3,
                    demand: 0.5,
                    time_of_day: 0.5,
                    day_of_week: 0.0,
                },
                expected_range: PriceRange::new(3000.0, 4500.0),
            },
            SimulationScenario {
                name: "high-demand".to_string(),
                base_price: 2500.0,
                factors: PricingFactors {
                    scarcity: 0.6,
                    weather: 0.4,
                    traffic: 0.7,
                    demand: 1.0,
                    time_of_day: 1.0,
                    day_of_week: 0.7,
                },
                expected_range: PriceRange::new(5500.0, 8000.0),
            },
            SimulationScenario {
                name: "low-demand".to_string(),
                base_price: 2500.0,
                factors: PricingFactors {
                    scarcity: 0.1,
                    weather: 0.1,
                    traffic: 0.1,
                    demand: 0.0,
                    time_of_day: 0.0,
                    day_of_week: 0.0,
                },
                expected_range: PriceRange::new(1200.0, 2200.0),
            },
            SimulationScenario {
                name: "scarcity-event".to_string(),
                base_price: 2500.0,
                factors: PricingFactors {
                    scarcity: 1.0,
                    weather: 0.2,
                    traffic: 0.3,
                    demand: 0.8,
                    time_of_day: 0.5,
                    day_of_week: 0.0,
                },
                expected_range: PriceRange::new(5000.0, 7000.0),
            },
        ]
    }

    /// Run one scenario and record the result
    pub fn run_scenario(&mut self, scenario: &SimulationScenario) -> SimulationResult {
        let calculation =
            PriceCalculator::calculate_dynamic_price(scenario.base_price, scenario.factors);

        let result = SimulationResult {
            scenario: scenario.name.clone(),
            deviation: (calculation.final_price - scenario.expected_range.midpoint()).abs(),
            passed: scenario.expected_range.contains(calculation.final_price),
            expected_range: scenario.expected_range,
            calculation,
        };

        self.results.push(result.clone());
        result
    }

    /// Run every configured scenario
    pub fn run_all(&mut self) -> Vec<SimulationResult> {
        let scenarios = self.scenarios.clone();
        scenarios
            .iter()
            .map(|scenario| self.run_scenario(scenario))
            .collect()
    }

    /// All results accumulated so far
    pub fn results(&self) -> &[SimulationResult] {
        &self.results
    }

    /// Render a pass/fail summary of the accumulated results
    pub fn report(&self) -> String {
        let passed = self.results.iter().filter(|r| r.passed).count();
        let total = self.results.len();
        let success_rate = if total > 0 {
            passed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let mut lines = vec![format!(
            "Simulation report: {}/{} passed ({:.1}% success rate)",
            passed, total, success_rate
        )];

        for result in &self.results {
            lines.push(format!(
                "  [{}] {}: price {:.2} (expected {:.2}-{:.2}, deviation {:.2})",
                if result.passed { "PASS" } else { "FAIL" },
                result.scenario,
                result.calculation.final_price,
                result.expected_range.min,
                result.expected_range.max,
                result.deviation,
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenarios_all_pass() {
        let mut harness = SimulationHarness::new();
        let results = harness.run_all();

        assert_eq!(results.len(), 4);
        for result in &results {
            assert!(
                result.passed,
                "scenario {} produced {} outside {:?}",
                result.scenario, result.calculation.final_price, result.expected_range
            );
        }
    }

    #[test]
    fn test_normal_demand_price() {
        let mut harness = SimulationHarness::new();
        let scenario = SimulationHarness::default_scenarios()
            .into_iter()
            .find(|s| s.name == "normal-demand")
            .unwrap();

        let result = harness.run_scenario(&scenario);
        assert!(result.passed);
        assert!((result.calculation.final_price - 3725.0).abs() < 0.01);
    }

    #[test]
    fn test_deviation_measures_distance_from_midpoint() {
        let scenario = SimulationScenario {
            name: "fixed".to_string(),
            base_price: 1000.0,
            // All-zero factors floor the multiplier at 0.5 -> price 500
            factors: PricingFactors::ZERO,
            expected_range: PriceRange::new(400.0, 800.0),
        };

        let mut harness = SimulationHarness::with_scenarios(vec![scenario.clone()]);
        let result = harness.run_scenario(&scenario);

        assert!(result.passed);
        assert!((result.deviation - 100.0).abs() < 1e-9); // |500 - 600|
    }

    #[test]
    fn test_report_counts_failures() {
        let impossible = SimulationScenario {
            name: "impossible".to_string(),
            base_price: 1000.0,
            factors: PricingFactors::ZERO,
            expected_range: PriceRange::new(10_000.0, 20_000.0),
        };

        let mut harness = SimulationHarness::with_scenarios(vec![impossible]);
        harness.run_all();

        let report = harness.report();
        assert!(report.contains("0/1 passed"));
        assert!(report.contains("FAIL"));
    }
}
