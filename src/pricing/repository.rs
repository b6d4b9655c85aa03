//! Read interface the pricing service consumes.
//!
//! `PgPricingRepository` reads PostgreSQL; `InMemoryPricingRepository` holds
//! rates in memory for tests and local tooling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::models::{MonthlyRate, SeasonalRate};
use super::queries;
use super::services::PricingError;

/// Read-only pricing data for one property
#[async_trait]
pub trait PricingRepository: Send + Sync {
    async fn property_exists(&self, property_id: Uuid) -> Result<bool, PricingError>;

    /// Seasonal rates ordered by season start
    async fn get_seasonal_prices(&self, property_id: Uuid) -> Result<Vec<SeasonalRate>, PricingError>;

    /// Monthly rates ordered by month
    async fn get_monthly_prices(&self, property_id: Uuid) -> Result<Vec<MonthlyRate>, PricingError>;

    async fn get_yearly_rate(&self, property_id: Uuid) -> Result<Option<Decimal>, PricingError>;

    /// Blocked dates within `from..=to`
    async fn get_blocked_dates(
        &self,
        property_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, PricingError>;
}

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgPricingRepository {
    pool: PgPool,
}

impl PgPricingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PricingRepository for PgPricingRepository {
    async fn property_exists(&self, property_id: Uuid) -> Result<bool, PricingError> {
        queries::property_exists(&self.pool, property_id).await
    }

    async fn get_seasonal_prices(&self, property_id: Uuid) -> Result<Vec<SeasonalRate>, PricingError> {
        let rows = queries::get_seasonal_prices(&self.pool, property_id).await?;
        let rates = rows
            .into_iter()
            .filter_map(|row| match SeasonalRate::try_from(row) {
                Ok(rate) => Some(rate),
                Err(e) => {
                    warn!(%property_id, "Skipping malformed seasonal price: {}", e);
                    None
                }
            })
            .collect();
        Ok(rates)
    }

    async fn get_monthly_prices(&self, property_id: Uuid) -> Result<Vec<MonthlyRate>, PricingError> {
        queries::get_monthly_prices(&self.pool, property_id).await
    }

    async fn get_yearly_rate(&self, property_id: Uuid) -> Result<Option<Decimal>, PricingError> {
        queries::get_yearly_rate(&self.pool, property_id).await
    }

    async fn get_blocked_dates(
        &self,
        property_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, PricingError> {
        let dates = queries::get_blocked_dates(&self.pool, property_id, from, to).await?;
        Ok(dates.into_iter().map(|d| d.blocked_date).collect())
    }
}

/// Rates and blocked dates of one in-memory property
#[derive(Debug, Clone, Default)]
pub struct PropertyRates {
    pub seasonal: Vec<SeasonalRate>,
    pub monthly: Vec<MonthlyRate>,
    pub yearly: Option<Decimal>,
    pub blocked: Vec<NaiveDate>,
}

/// In-memory repository
#[derive(Debug, Default)]
pub struct InMemoryPricingRepository {
    properties: RwLock<HashMap<Uuid, PropertyRates>>,
    rate_reads: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryPricingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, property_id: Uuid, rates: PropertyRates) {
        if let Ok(mut properties) = self.properties.write() {
            properties.insert(property_id, rates);
        }
    }

    /// Make every read fail, simulating an unavailable store
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Number of rate reads served (seasonal, monthly and yearly)
    pub fn rate_reads(&self) -> usize {
        self.rate_reads.load(Ordering::Relaxed)
    }

    fn read<T>(
        &self,
        property_id: Uuid,
        f: impl FnOnce(&PropertyRates) -> T,
    ) -> Result<Option<T>, PricingError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(PricingError::Repository("in-memory store unavailable".to_string()));
        }
        let properties = self
            .properties
            .read()
            .map_err(|_| PricingError::Repository("in-memory store poisoned".to_string()))?;
        Ok(properties.get(&property_id).map(f))
    }

    fn read_rates<T: Default>(
        &self,
        property_id: Uuid,
        f: impl FnOnce(&PropertyRates) -> T,
    ) -> Result<T, PricingError> {
        self.rate_reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.read(property_id, f)?.unwrap_or_default())
    }
}

#[async_trait]
impl PricingRepository for InMemoryPricingRepository {
    async fn property_exists(&self, property_id: Uuid) -> Result<bool, PricingError> {
        Ok(self.read(property_id, |_| ())?.is_some())
    }

    async fn get_seasonal_prices(&self, property_id: Uuid) -> Result<Vec<SeasonalRate>, PricingError> {
        self.read_rates(property_id, |p| p.seasonal.clone())
    }

    async fn get_monthly_prices(&self, property_id: Uuid) -> Result<Vec<MonthlyRate>, PricingError> {
        self.read_rates(property_id, |p| p.monthly.clone())
    }

    async fn get_yearly_rate(&self, property_id: Uuid) -> Result<Option<Decimal>, PricingError> {
        self.read_rates(property_id, |p| p.yearly)
    }

    async fn get_blocked_dates(
        &self,
        property_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, PricingError> {
        Ok(self
            .read(property_id, |p| {
                p.blocked
                    .iter()
                    .copied()
                    .filter(|d| *d >= from && *d <= to)
                    .collect()
            })?
            .unwrap_or_default())
    }
}
