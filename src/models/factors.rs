use serde::{Deserialize, Serialize};

/// Geographic coordinate supplied by the calling application
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The six normalized demand signals feeding the price multiplier.
///
/// Every field is kept in [0, 1]; out-of-range inputs are clamped by
/// [`PricingFactors::clamped`], never rejected. Missing signals default to 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PricingFactors {
    pub scarcity: f64,
    pub weather: f64,
    pub traffic: f64,
    pub demand: f64,
    pub time_of_day: f64,
    pub day_of_week: f64,
}

/// Clamp a raw signal into [0, 1]; non-finite values collapse to 0
pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl PricingFactors {
    /// All-zero snapshot, used by manual overrides
    pub const ZERO: PricingFactors = PricingFactors {
        scarcity: 0.0,
        weather: 0.0,
        traffic: 0.0,
        demand: 0.0,
        time_of_day: 0.0,
        day_of_week: 0.0,
    };

    /// Return a copy with every field clamped into [0, 1]
    pub fn clamped(self) -> Self {
        Self {
            scarcity: clamp01(self.scarcity),
            weather: clamp01(self.weather),
            traffic: clamp01(self.traffic),
            demand: clamp01(self.demand),
            time_of_day: clamp01(self.time_of_day),
            day_of_week: clamp01(self.day_of_week),
        }
    }

    /// Check that every field is already in [0, 1]
    pub fn is_normalized(&self) -> bool {
        [
            self.scarcity,
            self.weather,
            self.traffic,
            self.demand,
            self.time_of_day,
            self.day_of_week,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v))
    }
}
