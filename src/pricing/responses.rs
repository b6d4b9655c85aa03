//! Response DTOs for pricing results and API endpoints.

use chrono::NaiveDate;
use serde::Serialize;

pub const CURRENCY: &str = "THB";

/// Which pricing source produced a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMethod {
    Seasonal,
    Monthly,
    Yearly,
    /// Seasonal rates with uncovered days priced at a borrowed rate
    Combined,
}

/// One auditable line of a quote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub period_label: String,
    pub nights: i64,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_month: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_number: Option<u32>,
}

impl LineItem {
    pub fn new(period_label: impl Into<String>, nights: i64, total: i64) -> Self {
        Self {
            period_label: period_label.into(),
            nights,
            total,
            price_per_night: None,
            price_per_month: None,
            season_type: None,
            month_number: None,
        }
    }
}

/// Price for a stay, with breakdown and calculation trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub total_price: i64,
    pub currency: String,
    pub nights: i64,
    pub daily_average: i64,
    pub monthly_equivalent: i64,
    pub breakdown: Vec<LineItem>,
    pub pricing_method: PricingMethod,
    pub yearly_only_warning: bool,
    /// Set by the pricing source, not derived from the rounded total
    pub price_on_request: bool,
    pub trace: Vec<String>,
}

impl PriceQuote {
    pub fn is_price_on_request(&self) -> bool {
        self.price_on_request
    }
}

/// Free check-in slot with its price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailablePeriod {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub total_price: i64,
    pub daily_average: i64,
}

/// Response for available period search
#[derive(Debug, Serialize)]
pub struct AvailablePeriodsResponse {
    pub nights: i64,
    pub count: usize,
    pub periods: Vec<AvailablePeriod>,
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
