//! Pricing service functions with repository access.
//!
//! These functions load rate data through a `PricingRepository` and run the
//! pure engine over it. Faults are logged and collapsed at the two public
//! entry points, `calculate_price` and `find_available_periods`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::availability::{
    add_nights, scan_available_periods, ScanCancel, ScanOutcome, SearchWindow, MAX_NIGHTS,
};
use super::engine::calculate_quote;
use super::models::RateCard;
use super::period::count_nights;
use super::repository::PricingRepository;
use super::responses::{AvailablePeriod, PriceQuote};

/// Pricing error types
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Invalid search: {0}")]
    InvalidSearch(String),
}

/// Result of a quote request before it is collapsed to `Option`
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Quoted(PriceQuote),
    /// Check-out is not after check-in
    InvalidRange,
    PropertyNotFound,
    /// The property has no rates of any kind
    NoPricingData,
    /// Rates exist but none of them can price this stay
    Unpriceable,
}

impl QuoteOutcome {
    pub fn into_quote(self) -> Option<PriceQuote> {
        match self {
            QuoteOutcome::Quoted(quote) => Some(quote),
            _ => None,
        }
    }
}

/// Price calculation and availability search over a pricing repository
#[derive(Clone)]
pub struct PricingService {
    repo: Arc<dyn PricingRepository>,
}

impl PricingService {
    pub fn new(repo: Arc<dyn PricingRepository>) -> Self {
        Self { repo }
    }

    /// Load all rates of a property; the three reads run concurrently.
    pub async fn load_rate_card(&self, property_id: Uuid) -> Result<RateCard, PricingError> {
        let (seasonal, monthly, yearly) = tokio::try_join!(
            self.repo.get_seasonal_prices(property_id),
            self.repo.get_monthly_prices(property_id),
            self.repo.get_yearly_rate(property_id),
        )?;
        Ok(RateCard::new(seasonal, monthly, yearly))
    }

    /// Quote a stay, keeping every non-quote outcome distinct.
    pub async fn quote(
        &self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<QuoteOutcome, PricingError> {
        if count_nights(check_in, check_out) <= 0 {
            return Ok(QuoteOutcome::InvalidRange);
        }
        if !self.repo.property_exists(property_id).await? {
            return Ok(QuoteOutcome::PropertyNotFound);
        }

        let card = self.load_rate_card(property_id).await?;
        if card.is_empty() {
            info!(%property_id, "No pricing data configured");
            return Ok(QuoteOutcome::NoPricingData);
        }

        Ok(match calculate_quote(&card, check_in, check_out) {
            Some(quote) => QuoteOutcome::Quoted(quote),
            None => {
                info!(%property_id, %check_in, %check_out, "No pricing source covers this stay");
                QuoteOutcome::Unpriceable
            }
        })
    }

    /// Calculate the price of a stay.
    ///
    /// Returns `None` when the stay cannot be quoted for any reason,
    /// including repository faults, which are logged.
    pub async fn calculate_price(
        &self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Option<PriceQuote> {
        match self.quote(property_id, check_in, check_out).await {
            Ok(outcome) => outcome.into_quote(),
            Err(e) => {
                error!(%property_id, %check_in, %check_out, "Price calculation failed: {}", e);
                None
            }
        }
    }

    /// Scan for free stays of `nights`, cheapest first.
    pub async fn scan(
        &self,
        property_id: Uuid,
        nights: i64,
        window: SearchWindow,
        cancel: &ScanCancel,
    ) -> Result<ScanOutcome, PricingError> {
        if nights <= 0 || nights > MAX_NIGHTS {
            return Err(PricingError::InvalidSearch(format!(
                "nights must be between 1 and {}, got {}",
                MAX_NIGHTS, nights
            )));
        }

        let card = self.load_rate_card(property_id).await?;
        if card.is_empty() {
            return Ok(ScanOutcome::Empty);
        }

        // Stays starting late in the window run past its end
        let blocked_until = add_nights(window.end, nights).ok_or_else(|| {
            PricingError::InvalidSearch(format!(
                "stays after {} run past the last supported date",
                window.end
            ))
        })?;
        let blocked: HashSet<NaiveDate> = self
            .repo
            .get_blocked_dates(property_id, window.start, blocked_until)
            .await?
            .into_iter()
            .collect();

        let (outcome, stats) = scan_available_periods(&card, window, nights, &blocked, cancel);
        debug!(
            %property_id,
            nights,
            evaluated = stats.evaluated,
            blocked = stats.blocked,
            unpriced = stats.unpriced,
            "Availability scan finished"
        );
        Ok(outcome)
    }

    /// Find the cheapest available stays of `nights` in a month, or in the
    /// next three months when no month is given. Never fails: errors are
    /// logged and produce an empty list.
    pub async fn find_available_periods(
        &self,
        property_id: Uuid,
        nights: i64,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Vec<AvailablePeriod> {
        self.find_available_periods_from(
            property_id,
            nights,
            month,
            year,
            Utc::now().date_naive(),
            &ScanCancel::new(),
        )
        .await
    }

    /// `find_available_periods` with an explicit `today` and cancellation flag
    pub async fn find_available_periods_from(
        &self,
        property_id: Uuid,
        nights: i64,
        month: Option<u32>,
        year: Option<i32>,
        today: NaiveDate,
        cancel: &ScanCancel,
    ) -> Vec<AvailablePeriod> {
        let Some(window) = SearchWindow::resolve(today, month, year) else {
            error!(%property_id, ?month, ?year, "Invalid availability search window");
            return Vec::new();
        };

        match self.scan(property_id, nights, window, cancel).await {
            Ok(outcome) => outcome.into_periods(),
            Err(e) => {
                error!(%property_id, nights, "Availability search failed: {}", e);
                Vec::new()
            }
        }
    }
}
