//! Swappable sources for environmental demand signals.
//!
//! Production deployments point `HttpFactorProvider` at a real feed; the
//! simulated provider returns fixed scores so pricing stays deterministic in
//! development and tests.

use crate::error::{AppError, AppResult};
use crate::models::factors::clamp01;
use async_trait::async_trait;
use serde::Deserialize;

/// Source of weather and traffic scores for a coordinate.
///
/// Contract: scores are in [0, 1] and a call either returns within the
/// collector's timeout budget or fails; the collector degrades to neutral
/// defaults on failure.
#[async_trait]
pub trait FactorProvider: Send + Sync {
    async fn weather_score(&self, lat: f64, lng: f64) -> AppResult<f64>;
    async fn traffic_score(&self, lat: f64, lng: f64) -> AppResult<f64>;
}

/// Fixed-score provider for development and tests
pub struct SimulatedFactorProvider {
    weather: f64,
    traffic: f64,
}

impl SimulatedFactorProvider {
    pub fn new(weather: f64, traffic: f64) -> Self {
        Self {
            weather: clamp01(weather),
            traffic: clamp01(traffic),
        }
    }
}

impl Default for SimulatedFactorProvider {
    fn default() -> Self {
        Self::new(0.2, 0.3)
    }
}

#[async_trait]
impl FactorProvider for SimulatedFactorProvider {
    async fn weather_score(&self, _lat: f64, _lng: f64) -> AppResult<f64> {
        Ok(self.weather)
    }

    async fn traffic_score(&self, _lat: f64, _lng: f64) -> AppResult<f64> {
        Ok(self.traffic)
    }
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
}

/// HTTP-backed provider.
///
/// Expects `GET {base_url}/weather?lat=..&lng=..` and
/// `GET {base_url}/traffic?lat=..&lng=..` returning `{"score": <0..1>}`.
pub struct HttpFactorProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFactorProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_score(&self, endpoint: &str, lat: f64, lng: f64) -> AppResult<f64> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[("lat", lat), ("lng", lng)])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("{} request failed: {}", endpoint, e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "{} returned status {}",
                endpoint,
                response.status()
            )));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("{} returned bad JSON: {}", endpoint, e)))?;

        Ok(clamp01(body.score))
    }
}

#[async_trait]
impl FactorProvider for HttpFactorProvider {
    async fn weather_score(&self, lat: f64, lng: f64) -> AppResult<f64> {
        self.fetch_score("weather", lat, lng).await
    }

    async fn traffic_score(&self, lat: f64, lng: f64) -> AppResult<f64> {
        self.fetch_score("traffic", lat, lng).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_provider_returns_fixed_scores() {
        let provider = SimulatedFactorProvider::new(0.6, 0.9);
        assert_eq!(provider.weather_score(0.0, 0.0).await.unwrap(), 0.6);
        assert_eq!(provider.traffic_score(0.0, 0.0).await.unwrap(), 0.9);
    }

    #[tokio::test]
    async fn test_simulated_provider_clamps_construction() {
        let provider = SimulatedFactorProvider::new(-1.0, 7.0);
        assert_eq!(provider.weather_score(0.0, 0.0).await.unwrap(), 0.0);
        assert_eq!(provider.traffic_score(0.0, 0.0).await.unwrap(), 1.0);
    }
}
