//! Collects the six demand signals that feed the price multiplier.
//!
//! Provider-backed signals (weather, traffic) are fetched under a timeout and
//! degrade to neutral defaults on any failure, so a dependency outage can
//! slow a quote by at most the timeout budget but never stall it. The
//! remaining signals are pure functions over caller-supplied counters and the
//! clock.

use crate::config::PricingConfig;
use crate::models::factors::clamp01;
use crate::models::{GeoPoint, PricingFactors};
use crate::services::factor_provider::FactorProvider;
use chrono::{Datelike, Local, Timelike, Weekday};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Hours treated as peak demand windows (07:00-09:00 and 17:00-20:00)
pub const PEAK_HOURS: [u32; 5] = [7, 8, 17, 18, 19];

/// Hours adjacent to the peak windows, at half weight
pub const SHOULDER_HOURS: [u32; 10] = [6, 9, 10, 11, 12, 13, 14, 15, 16, 20];

pub struct FactorCollector {
    provider: Arc<dyn FactorProvider>,
    timeout: Duration,
    default_weather: f64,
    default_traffic: f64,
}

impl FactorCollector {
    pub fn new(provider: Arc<dyn FactorProvider>, config: &PricingConfig) -> Self {
        Self {
            provider,
            timeout: config.provider_timeout(),
            default_weather: config.default_weather_factor,
            default_traffic: config.default_traffic_factor,
        }
    }

    /// Weather signal for a location; neutral default when absent or failing
    pub async fn weather_factor(&self, location: Option<GeoPoint>) -> f64 {
        let Some(point) = location else {
            return self.default_weather;
        };

        match tokio::time::timeout(self.timeout, self.provider.weather_score(point.lat, point.lng))
            .await
        {
            Ok(Ok(score)) => clamp01(score),
            Ok(Err(e)) => {
                warn!("Weather lookup failed, using default: {}", e);
                self.default_weather
            }
            Err(_) => {
                warn!("Weather lookup timed out after {:?}, using default", self.timeout);
                self.default_weather
            }
        }
    }

    /// Traffic signal for a location; neutral default when absent or failing
    pub async fn traffic_factor(&self, location: Option<GeoPoint>) -> f64 {
        let Some(point) = location else {
            return self.default_traffic;
        };

        match tokio::time::timeout(self.timeout, self.provider.traffic_score(point.lat, point.lng))
            .await
        {
            Ok(Ok(score)) => clamp01(score),
            Ok(Err(e)) => {
                warn!("Traffic lookup failed, using default: {}", e);
                self.default_traffic
            }
            Err(_) => {
                warn!("Traffic lookup timed out after {:?}, using default", self.timeout);
                self.default_traffic
            }
        }
    }

    /// Scarcity from inventory levels: 1 - level/max, clamped.
    ///
    /// No usable maximum means maximal scarcity.
    pub fn scarcity(inventory_level: f64, max_inventory: f64) -> f64 {
        if max_inventory <= 0.0 {
            return 1.0;
        }
        clamp01(1.0 - inventory_level / max_inventory)
    }

    /// Demand pressure from order velocity.
    ///
    /// Demand below the trailing average contributes nothing; above it the
    /// signal ramps at double rate and saturates at 1.5x the average.
    pub fn demand(recent_orders: f64, average_orders: f64) -> f64 {
        if average_orders <= 0.0 {
            return 0.0;
        }
        let ratio = recent_orders / average_orders;
        clamp01((ratio - 1.0) * 2.0)
    }

    /// Discrete time-of-day step: 1.0 in peak hours, 0.5 in shoulder hours,
    /// 0 overnight. The hour buckets are deliberate and load-bearing; tests
    /// pin every boundary.
    pub fn time_of_day_factor(hour: u32) -> f64 {
        if PEAK_HOURS.contains(&hour) {
            1.0
        } else if SHOULDER_HOURS.contains(&hour) {
            0.5
        } else {
            0.0
        }
    }

    /// Weekend uplift: full on Saturday/Sunday, partial on Friday
    pub fn day_of_week_factor(weekday: Weekday) -> f64 {
        match weekday {
            Weekday::Sat | Weekday::Sun => 1.0,
            Weekday::Fri => 0.7,
            _ => 0.0,
        }
    }

    /// Time-of-day factor for the current local hour
    pub fn current_time_of_day_factor() -> f64 {
        Self::time_of_day_factor(Local::now().hour())
    }

    /// Day-of-week factor for the current local day
    pub fn current_day_of_week_factor() -> f64 {
        Self::day_of_week_factor(Local::now().weekday())
    }

    /// Assemble a snapshot for a quote without inventory context.
    ///
    /// Scarcity and demand stay at zero here; callers holding inventory and
    /// order counters use [`collect_with_signals`](Self::collect_with_signals).
    pub async fn collect(&self, location: Option<GeoPoint>) -> PricingFactors {
        self.collect_with_signals(location, 0.0, 0.0).await
    }

    /// Assemble a snapshot with caller-supplied scarcity and demand signals
    pub async fn collect_with_signals(
        &self,
        location: Option<GeoPoint>,
        scarcity: f64,
        demand: f64,
    ) -> PricingFactors {
        PricingFactors {
            scarcity: clamp01(scarcity),
            weather: self.weather_factor(location).await,
            traffic: self.traffic_factor(location).await,
            demand: clamp01(demand),
            time_of_day: Self::current_time_of_day_factor(),
            day_of_week: Self::current_day_of_week_factor(),
        }
    }
}
