//! Cheapest free check-in dates for a given stay length.
//!
//! A linear scan over candidate check-in dates: bounded by
//! `MAX_CANDIDATES`, results truncated to `MAX_RESULTS`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Days, Months, NaiveDate};

use super::engine::calculate_quote;
use super::models::RateCard;
use super::responses::AvailablePeriod;
use super::season::days_in_month;

pub const MAX_CANDIDATES: usize = 100;
pub const MAX_RESULTS: usize = 20;
/// Longest stay a search accepts (ten years)
pub const MAX_NIGHTS: i64 = 3660;
const DEFAULT_WINDOW_MONTHS: u32 = 3;

/// Inclusive range of check-in dates to consider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SearchWindow {
    /// Full target month, or `today` plus three months when none is given.
    pub fn resolve(today: NaiveDate, month: Option<u32>, year: Option<i32>) -> Option<Self> {
        match (month, year) {
            (Some(month), Some(year)) => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
                Some(Self { start, end })
            }
            _ => {
                let end = today.checked_add_months(Months::new(DEFAULT_WINDOW_MONTHS))?;
                Some(Self { start: today, end })
            }
        }
    }
}

/// Cooperative cancellation flag, checked between candidates
#[derive(Debug, Clone, Default)]
pub struct ScanCancel(Arc<AtomicBool>);

impl ScanCancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a scan before it is collapsed to a plain list
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Found(Vec<AvailablePeriod>),
    Empty,
    Cancelled(Vec<AvailablePeriod>),
}

impl ScanOutcome {
    pub fn into_periods(self) -> Vec<AvailablePeriod> {
        match self {
            ScanOutcome::Found(periods) | ScanOutcome::Cancelled(periods) => periods,
            ScanOutcome::Empty => Vec::new(),
        }
    }
}

/// Statistics of a scan, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub evaluated: usize,
    pub blocked: usize,
    pub unpriced: usize,
}

/// `start + nights`, or `None` outside chrono's date range
pub fn add_nights(start: NaiveDate, nights: i64) -> Option<NaiveDate> {
    let nights = u64::try_from(nights).ok()?;
    start.checked_add_days(Days::new(nights))
}

fn overlaps_blocked(check_in: NaiveDate, nights: i64, blocked: &HashSet<NaiveDate>) -> bool {
    let nights = usize::try_from(nights).unwrap_or(0);
    check_in
        .iter_days()
        .take(nights)
        .any(|night| blocked.contains(&night))
}

/// Scan the window for free stays of `nights`, cheapest first.
pub fn scan_available_periods(
    card: &RateCard,
    window: SearchWindow,
    nights: i64,
    blocked: &HashSet<NaiveDate>,
    cancel: &ScanCancel,
) -> (ScanOutcome, ScanStats) {
    let mut stats = ScanStats::default();
    let mut periods = Vec::new();

    if nights <= 0 || nights > MAX_NIGHTS {
        return (ScanOutcome::Empty, stats);
    }

    let candidates = window
        .start
        .iter_days()
        .take_while(|d| *d <= window.end)
        .take(MAX_CANDIDATES);

    let mut cancelled = false;
    for check_in in candidates {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        // later candidates would run past the last representable date too
        let Some(check_out) = add_nights(check_in, nights) else {
            break;
        };
        stats.evaluated += 1;

        if overlaps_blocked(check_in, nights, blocked) {
            stats.blocked += 1;
            continue;
        }

        match calculate_quote(card, check_in, check_out) {
            Some(quote) if quote.total_price > 0 && !quote.is_price_on_request() => {
                periods.push(AvailablePeriod {
                    check_in,
                    check_out,
                    nights,
                    total_price: quote.total_price,
                    daily_average: quote.daily_average,
                })
            }
            _ => stats.unpriced += 1,
        }
    }

    periods.sort_by(|a, b| {
        a.total_price
            .cmp(&b.total_price)
            .then(a.check_in.cmp(&b.check_in))
    });
    periods.truncate(MAX_RESULTS);

    let outcome = if cancelled {
        ScanOutcome::Cancelled(periods)
    } else if periods.is_empty() {
        ScanOutcome::Empty
    } else {
        ScanOutcome::Found(periods)
    };
    (outcome, stats)
}
