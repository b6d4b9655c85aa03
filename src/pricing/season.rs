//! Season matching and season-length arithmetic.
//!
//! Season lengths always use a 365-day year. Whether a season wraps is
//! decided from month-day keys for both matching and length, so Feb 29
//! still falls inside any range that spans it. When measuring length a
//! `02-29` start counts as `03-01` and a `02-29` end as `02-28`.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::models::{MonthDay, PricingType, SeasonalRate};

const CUMULATIVE_DAYS: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const DAYS_IN_YEAR: u32 = 365;

/// True when `date` falls in the recurring range `start..=end`.
///
/// A range with `start > end` wraps across the year boundary.
pub fn is_date_in_season(date: MonthDay, start: MonthDay, end: MonthDay) -> bool {
    let (d, s, e) = (date.key(), start.key(), end.key());
    if s <= e {
        s <= d && d <= e
    } else {
        d >= s || d <= e
    }
}

/// First rate in list order covering `date`
pub fn find_season_for_date(rates: &[SeasonalRate], date: NaiveDate) -> Option<&SeasonalRate> {
    let md = MonthDay::from_date(date);
    rates
        .iter()
        .find(|rate| is_date_in_season(md, rate.start, rate.end))
}

fn is_feb_29(md: MonthDay) -> bool {
    md.month() == 2 && md.day() == 29
}

/// 1-based day of a non-leap year
fn day_of_year(md: MonthDay) -> u32 {
    CUMULATIVE_DAYS[(md.month() - 1) as usize] + md.day()
}

/// Inclusive length of a recurring season in days, between 1 and 365.
pub fn days_in_season(start: MonthDay, end: MonthDay) -> u32 {
    // day_of_year puts 02-29 on the slot of 03-01
    let s = day_of_year(start);
    let e = if is_feb_29(end) { day_of_year(end) - 1 } else { day_of_year(end) };
    let days = if start.key() <= end.key() {
        e.saturating_sub(s) + 1
    } else {
        (DAYS_IN_YEAR + 1 - s) + e
    };
    days.clamp(1, DAYS_IN_YEAR)
}

/// Nightly equivalent of a seasonal rate.
pub fn daily_rate(rate: &SeasonalRate) -> Decimal {
    match rate.pricing_type {
        PricingType::PerNight => rate.price_per_night,
        PricingType::PerPeriod => {
            rate.price_per_night / Decimal::from(days_in_season(rate.start, rate.end))
        }
    }
}

/// Rate borrowed for days no season covers
#[derive(Debug, Clone, PartialEq)]
pub struct GapFill<'a> {
    pub source: &'a SeasonalRate,
    pub daily_rate: Decimal,
}

/// Borrow the first rate in the list for uncovered days.
///
/// Not the temporally nearest season; callers rely on list order.
pub fn first_rate_gap_fill(rates: &[SeasonalRate]) -> Option<GapFill<'_>> {
    rates.first().map(|source| GapFill {
        source,
        daily_rate: daily_rate(source),
    })
}

/// Days in a calendar month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
