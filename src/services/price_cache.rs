//! Short-lived memoization of calculated prices per product.

use crate::models::PriceCalculation;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct CacheEntry {
    calculation: PriceCalculation,
    captured_at: Instant,
}

/// TTL cache keyed by product id.
///
/// A read within the TTL returns the stored calculation; anything older is a
/// miss and gets overwritten by the next insert. The map is bounded: when
/// full, the entry with the oldest capture time is evicted.
pub struct PriceCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl PriceCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Fetch a fresh entry, if any
    pub async fn get(&self, product_id: &str) -> Option<PriceCalculation> {
        let entries = self.entries.read().await;
        let entry = entries.get(product_id)?;

        if entry.captured_at.elapsed() < self.ttl {
            Some(entry.calculation.clone())
        } else {
            None
        }
    }

    /// Store a calculation, evicting the oldest capture when at capacity
    pub async fn insert(&self, product_id: &str, calculation: PriceCalculation) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(product_id) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.captured_at)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                entries.remove(&key);
            }
        }

        entries.insert(
            product_id.to_string(),
            CacheEntry {
                calculation,
                captured_at: Instant::now(),
            },
        );
    }

    /// Drop every entry unconditionally
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricingFactors;

    fn sample_calculation(final_price: f64) -> PriceCalculation {
        PriceCalculation {
            base_price: 1000.0,
            final_price,
            factors: PricingFactors::ZERO,
            multiplier: final_price / 1000.0,
            timestamp: chrono::Utc::now().naive_utc(),
        }
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = PriceCache::new(Duration::from_secs(300), 16);
        cache.insert("p1", sample_calculation(1490.0)).await;

        let hit = cache.get("p1").await.expect("entry should be fresh");
        assert_eq!(hit.final_price, 1490.0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = PriceCache::new(Duration::ZERO, 16);
        cache.insert("p1", sample_calculation(1490.0)).await;

        assert!(cache.get("p1").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_empties_cache() {
        let cache = PriceCache::new(Duration::from_secs(300), 16);
        cache.insert("p1", sample_calculation(1490.0)).await;
        cache.insert("p2", sample_calculation(900.0)).await;

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_capture() {
        let cache = PriceCache::new(Duration::from_secs(300), 2);
        cache.insert("p1", sample_calculation(100.0)).await;
        cache.insert("p2", sample_calculation(200.0)).await;
        cache.insert("p3", sample_calculation(300.0)).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("p1").await.is_none(), "oldest entry should be evicted");
        assert!(cache.get("p3").await.is_some());
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = PriceCache::new(Duration::from_secs(300), 2);
        cache.insert("p1", sample_calculation(100.0)).await;
        cache.insert("p2", sample_calculation(200.0)).await;
        cache.insert("p1", sample_calculation(150.0)).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("p1").await.unwrap().final_price, 150.0);
        assert!(cache.get("p2").await.is_some());
    }
}
