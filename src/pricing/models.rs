//! Rate models for pricing queries.
//!
//! Row types use sqlx's FromRow derive for direct database deserialization;
//! the engine works on the validated domain types converted from them.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recurring calendar day without a year, e.g. `12-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Option<Self> {
        // 2024 is a leap year, so Feb 29 is accepted as a recurring day
        NaiveDate::from_ymd_opt(2024, month, day).map(|_| Self { month, day })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Comparable key `month * 100 + day`
    pub fn key(&self) -> u32 {
        self.month * 100 + self.day
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month-day '{0}', expected MM-DD")]
pub struct ParseMonthDayError(pub String);

impl FromStr for MonthDay {
    type Err = ParseMonthDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthDayError(s.to_string());
        let (month, day) = s.trim().split_once('-').ok_or_else(err)?;
        let month: u32 = month.parse().map_err(|_| err())?;
        let day: u32 = day.parse().map_err(|_| err())?;
        MonthDay::new(month, day).ok_or_else(err)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// How a seasonal price is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    PerNight,
    PerPeriod,
}

impl FromStr for PricingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_night" => Ok(PricingType::PerNight),
            "per_period" => Ok(PricingType::PerPeriod),
            other => Err(format!("unknown pricing type '{}'", other)),
        }
    }
}

/// Recurring seasonal rate. A zero `price_per_night` means price on request.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalRate {
    pub season_type: String,
    pub start: MonthDay,
    pub end: MonthDay,
    pub price_per_night: Decimal,
    pub minimum_nights: i32,
    pub pricing_type: PricingType,
}

impl SeasonalRate {
    pub fn is_price_on_request(&self) -> bool {
        self.price_per_night.is_zero()
    }
}

/// Seasonal price row from property_seasonal_prices
#[derive(Debug, Clone, FromRow)]
pub struct SeasonalRateRow {
    pub season_type: String,
    pub start_date: String,
    pub end_date: String,
    pub price_per_night: Decimal,
    pub minimum_nights: Option<i32>,
    pub pricing_type: Option<String>,
}

impl TryFrom<SeasonalRateRow> for SeasonalRate {
    type Error = String;

    fn try_from(row: SeasonalRateRow) -> Result<Self, Self::Error> {
        let start = row.start_date.parse::<MonthDay>().map_err(|e| e.to_string())?;
        let end = row.end_date.parse::<MonthDay>().map_err(|e| e.to_string())?;
        let pricing_type = match row.pricing_type.as_deref() {
            Some(s) => s.parse()?,
            None => PricingType::PerNight,
        };
        if row.price_per_night.is_sign_negative() {
            return Err(format!("negative price for season '{}'", row.season_type));
        }

        Ok(SeasonalRate {
            season_type: row.season_type,
            start,
            end,
            price_per_night: row.price_per_night,
            minimum_nights: row.minimum_nights.unwrap_or(0),
            pricing_type,
        })
    }
}

/// Monthly price from property_monthly_prices
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MonthlyRate {
    pub month_number: i32,
    pub price_per_month: Decimal,
    pub minimum_days: i32,
}

/// Blocked date from property_blocked_dates
#[derive(Debug, Clone, FromRow)]
pub struct BlockedDate {
    pub blocked_date: NaiveDate,
    pub reason: Option<String>,
}

/// All pricing sources for one property, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateCard {
    pub seasonal: Vec<SeasonalRate>,
    pub monthly: Vec<MonthlyRate>,
    /// Monthly-equivalent yearly price; only kept when positive
    pub yearly: Option<Decimal>,
}

impl RateCard {
    pub fn new(
        seasonal: Vec<SeasonalRate>,
        monthly: Vec<MonthlyRate>,
        yearly: Option<Decimal>,
    ) -> Self {
        Self {
            seasonal,
            monthly,
            yearly: yearly.filter(|r| *r > Decimal::ZERO),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.seasonal.is_empty() && self.monthly.is_empty() && self.yearly.is_none()
    }

    /// Only a yearly rate is configured
    pub fn is_yearly_only(&self) -> bool {
        self.yearly.is_some() && self.seasonal.is_empty() && self.monthly.is_empty()
    }

    pub fn monthly_rate(&self, month: u32) -> Option<&MonthlyRate> {
        self.monthly
            .iter()
            .find(|r| r.month_number == month as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_month_day_parse_and_display() {
        let md: MonthDay = "06-01".parse().unwrap();
        assert_eq!(md.month(), 6);
        assert_eq!(md.day(), 1);
        assert_eq!(md.key(), 601);
        assert_eq!(md.to_string(), "06-01");
        assert_eq!("2-29".parse::<MonthDay>().unwrap().key(), 229);
    }

    #[test]
    fn test_month_day_rejects_invalid() {
        assert!("13-01".parse::<MonthDay>().is_err());
        assert!("04-31".parse::<MonthDay>().is_err());
        assert!("0601".parse::<MonthDay>().is_err());
        assert!("aa-bb".parse::<MonthDay>().is_err());
    }

    #[test]
    fn test_seasonal_row_conversion() {
        let row = SeasonalRateRow {
            season_type: "high".to_string(),
            start_date: "12-01".to_string(),
            end_date: "02-28".to_string(),
            price_per_night: dec!(5000),
            minimum_nights: None,
            pricing_type: Some("per_period".to_string()),
        };
        let rate = SeasonalRate::try_from(row).unwrap();
        assert_eq!(rate.pricing_type, PricingType::PerPeriod);
        assert_eq!(rate.minimum_nights, 0);
        assert_eq!(rate.start.key(), 1201);
    }

    #[test]
    fn test_seasonal_row_conversion_rejects_bad_rows() {
        let row = SeasonalRateRow {
            season_type: "low".to_string(),
            start_date: "06-01".to_string(),
            end_date: "08-31".to_string(),
            price_per_night: dec!(100),
            minimum_nights: Some(3),
            pricing_type: Some("per_week".to_string()),
        };
        assert!(SeasonalRate::try_from(row.clone()).is_err());

        let row = SeasonalRateRow {
            start_date: "6/1".to_string(),
            pricing_type: None,
            ..row
        };
        assert!(SeasonalRate::try_from(row).is_err());
    }

    #[test]
    fn test_rate_card_drops_non_positive_yearly() {
        assert!(RateCard::new(vec![], vec![], Some(dec!(0))).is_empty());
        let card = RateCard::new(vec![], vec![], Some(dec!(20000)));
        assert!(card.is_yearly_only());
        assert!(!card.is_empty());
    }
}
