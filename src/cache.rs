//! In-memory caching using moka
//!
//! Caches the three rate reads per property in front of a pricing
//! repository. Blocked dates are always read through.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::pricing::models::{MonthlyRate, SeasonalRate};
use crate::pricing::repository::PricingRepository;
use crate::pricing::services::PricingError;

/// Rate caches keyed by property
#[derive(Clone)]
pub struct RateCache {
    /// Seasonal rates (property -> rates in load order)
    pub seasonal: Cache<Uuid, Arc<Vec<SeasonalRate>>>,
    /// Monthly rates (property -> rates by month)
    pub monthly: Cache<Uuid, Arc<Vec<MonthlyRate>>>,
    /// Yearly rate (property -> monthly equivalent)
    pub yearly: Cache<Uuid, Option<Decimal>>,
}

impl RateCache {
    /// Create a new cache instance with the given capacity and TTL
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            seasonal: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            monthly: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            yearly: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            seasonal_size: self.seasonal.entry_count(),
            monthly_size: self.monthly.entry_count(),
            yearly_size: self.yearly.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.seasonal.invalidate_all();
        self.monthly.invalidate_all();
        self.yearly.invalidate_all();
        info!("All rate caches invalidated");
    }

    /// Invalidate the rates of one property
    pub async fn invalidate_property(&self, property_id: Uuid) {
        self.seasonal.invalidate(&property_id).await;
        self.monthly.invalidate(&property_id).await;
        self.yearly.invalidate(&property_id).await;
        info!("Rate cache invalidated for property: {}", property_id);
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(5 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub seasonal_size: u64,
    pub monthly_size: u64,
    pub yearly_size: u64,
}

/// Read-through cache in front of another repository
pub struct CachedPricingRepository<R> {
    inner: R,
    cache: RateCache,
}

impl<R: PricingRepository> CachedPricingRepository<R> {
    pub fn new(inner: R, cache: RateCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }
}

#[async_trait]
impl<R: PricingRepository> PricingRepository for CachedPricingRepository<R> {
    async fn property_exists(&self, property_id: Uuid) -> Result<bool, PricingError> {
        self.inner.property_exists(property_id).await
    }

    async fn get_seasonal_prices(&self, property_id: Uuid) -> Result<Vec<SeasonalRate>, PricingError> {
        if let Some(cached) = self.cache.seasonal.get(&property_id).await {
            debug!("Cache HIT for seasonal rates: {}", property_id);
            return Ok((*cached).clone());
        }
        debug!("Cache MISS for seasonal rates: {}", property_id);
        let rates = self.inner.get_seasonal_prices(property_id).await?;
        self.cache
            .seasonal
            .insert(property_id, Arc::new(rates.clone()))
            .await;
        Ok(rates)
    }

    async fn get_monthly_prices(&self, property_id: Uuid) -> Result<Vec<MonthlyRate>, PricingError> {
        if let Some(cached) = self.cache.monthly.get(&property_id).await {
            debug!("Cache HIT for monthly rates: {}", property_id);
            return Ok((*cached).clone());
        }
        debug!("Cache MISS for monthly rates: {}", property_id);
        let rates = self.inner.get_monthly_prices(property_id).await?;
        self.cache
            .monthly
            .insert(property_id, Arc::new(rates.clone()))
            .await;
        Ok(rates)
    }

    async fn get_yearly_rate(&self, property_id: Uuid) -> Result<Option<Decimal>, PricingError> {
        if let Some(cached) = self.cache.yearly.get(&property_id).await {
            debug!("Cache HIT for yearly rate: {}", property_id);
            return Ok(cached);
        }
        debug!("Cache MISS for yearly rate: {}", property_id);
        let rate = self.inner.get_yearly_rate(property_id).await?;
        self.cache.yearly.insert(property_id, rate).await;
        Ok(rate)
    }

    async fn get_blocked_dates(
        &self,
        property_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, PricingError> {
        self.inner.get_blocked_dates(property_id, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::repository::{InMemoryPricingRepository, PropertyRates};
    use rust_decimal_macros::dec;

    fn repo_with_yearly(id: Uuid, rate: Decimal) -> InMemoryPricingRepository {
        let repo = InMemoryPricingRepository::new();
        repo.insert(
            id,
            PropertyRates {
                yearly: Some(rate),
                monthly: vec![MonthlyRate {
                    month_number: 6,
                    price_per_month: dec!(30000),
                    minimum_days: 0,
                }],
                ..Default::default()
            },
        );
        repo
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let id = Uuid::new_v4();
        let cached = CachedPricingRepository::new(repo_with_yearly(id, dec!(20000)), RateCache::default());

        assert_eq!(cached.get_yearly_rate(id).await.unwrap(), Some(dec!(20000)));
        assert_eq!(cached.get_yearly_rate(id).await.unwrap(), Some(dec!(20000)));
        assert_eq!(cached.get_monthly_prices(id).await.unwrap().len(), 1);
        assert_eq!(cached.get_monthly_prices(id).await.unwrap().len(), 1);

        assert_eq!(cached.inner.rate_reads(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_property_forces_reload() {
        let id = Uuid::new_v4();
        let cached = CachedPricingRepository::new(repo_with_yearly(id, dec!(20000)), RateCache::default());
        cached.get_yearly_rate(id).await.unwrap();

        cached.inner.insert(
            id,
            PropertyRates {
                yearly: Some(dec!(25000)),
                ..Default::default()
            },
        );
        assert_eq!(cached.get_yearly_rate(id).await.unwrap(), Some(dec!(20000)));

        cached.cache().invalidate_property(id).await;
        assert_eq!(cached.get_yearly_rate(id).await.unwrap(), Some(dec!(25000)));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let id = Uuid::new_v4();
        let cached = CachedPricingRepository::new(repo_with_yearly(id, dec!(20000)), RateCache::default());
        cached.inner.set_failing(true);
        assert!(cached.get_seasonal_prices(id).await.is_err());

        cached.inner.set_failing(false);
        assert!(cached.get_seasonal_prices(id).await.unwrap().is_empty());
    }
}
