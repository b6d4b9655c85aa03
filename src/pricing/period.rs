//! Stay-length classification.
//!
//! The period class decides which pricing source is tried first.

use chrono::NaiveDate;
use serde::Serialize;

/// Period class of a stay, by number of nights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodClass {
    /// 1-26 nights
    ShortTerm,
    /// 27-31 nights
    MonthlyExact,
    /// 32-364 nights
    LongTerm,
    /// 365+ nights
    Yearly,
}

impl PeriodClass {
    /// Classify a stay. Returns `None` for a non-positive night count.
    pub fn classify(nights: i64) -> Option<Self> {
        match nights {
            i64::MIN..=0 => None,
            1..=26 => Some(PeriodClass::ShortTerm),
            27..=31 => Some(PeriodClass::MonthlyExact),
            32..=364 => Some(PeriodClass::LongTerm),
            _ => Some(PeriodClass::Yearly),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodClass::ShortTerm => "short-term",
            PeriodClass::MonthlyExact => "monthly",
            PeriodClass::LongTerm => "long-term",
            PeriodClass::Yearly => "yearly",
        }
    }
}

/// Nights between check-in and check-out
pub fn count_nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}
