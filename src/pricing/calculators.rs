//! Per-source pricing calculators.
//!
//! Pure functions for pricing math - no database access. Each calculator
//! tries to price the whole stay from one source and returns its own trace
//! lines; a `None` value means "try the next source".

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::models::{MonthlyRate, SeasonalRate};
use super::responses::{LineItem, PricingMethod};
use super::season::{self, days_in_month, find_season_for_date};

/// Round to specified decimal places, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use rental_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to a whole currency unit
pub fn to_whole(amount: Decimal) -> i64 {
    round_money(amount, 0).to_i64().unwrap_or(0)
}

/// Outcome of one calculator plus the trace lines it produced
#[derive(Debug, Clone)]
pub struct Attempt<T> {
    pub value: Option<T>,
    pub trace: Vec<String>,
}

impl<T> Attempt<T> {
    fn success(value: T, trace: Vec<String>) -> Self {
        Self {
            value: Some(value),
            trace,
        }
    }

    fn failure(trace: Vec<String>) -> Self {
        Self { value: None, trace }
    }
}

/// Unrounded total priced from a single source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceQuote {
    pub total: Decimal,
    pub breakdown: Vec<LineItem>,
    pub method: PricingMethod,
    pub price_on_request: bool,
}

impl SourceQuote {
    fn priced(total: Decimal, breakdown: Vec<LineItem>, method: PricingMethod) -> Self {
        Self {
            total,
            breakdown,
            method,
            price_on_request: false,
        }
    }

    /// Positive totals and price-on-request quotes end a fallback chain
    pub fn is_usable(&self) -> bool {
        self.price_on_request || self.total > Decimal::ZERO
    }
}

fn stay_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d < end)
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Seasonal accumulation for one season in first-appearance order
struct SeasonTally<'a> {
    rate: &'a SeasonalRate,
    daily_rate: Decimal,
    nights: i64,
    total: Decimal,
}

/// Price a stay day by day from recurring seasonal rates.
///
/// A price-on-request season anywhere in the stay makes the whole quote
/// price on request. Uncovered days are priced with the gap-fill rate.
pub fn calculate_from_seasonal_prices(
    rates: &[SeasonalRate],
    start: NaiveDate,
    end: NaiveDate,
    nights: i64,
) -> Attempt<SourceQuote> {
    let mut trace = Vec::new();
    if rates.is_empty() {
        trace.push("Seasonal: no seasonal rates configured".to_string());
        return Attempt::failure(trace);
    }

    let mut tallies: Vec<SeasonTally<'_>> = Vec::new();
    let mut uncovered: Vec<NaiveDate> = Vec::new();

    for day in stay_days(start, end) {
        let Some(rate) = find_season_for_date(rates, day) else {
            uncovered.push(day);
            continue;
        };

        if rate.is_price_on_request() {
            trace.push(format!(
                "Seasonal: {} falls in '{}' which is price on request",
                day, rate.season_type
            ));
            let mut line = LineItem::new("Price on request", nights, 0);
            line.price_per_night = Some(0);
            line.season_type = Some(rate.season_type.clone());
            return Attempt::success(
                SourceQuote {
                    total: Decimal::ZERO,
                    breakdown: vec![line],
                    method: PricingMethod::Seasonal,
                    price_on_request: true,
                },
                trace,
            );
        }

        match tallies.iter_mut().find(|t| std::ptr::eq(t.rate, rate)) {
            Some(tally) => {
                tally.nights += 1;
                tally.total += tally.daily_rate;
            }
            None => {
                let daily = season::daily_rate(rate);
                tallies.push(SeasonTally {
                    rate,
                    daily_rate: daily,
                    nights: 1,
                    total: daily,
                });
            }
        }
    }

    let mut total = Decimal::ZERO;
    let mut breakdown = Vec::with_capacity(tallies.len() + 1);
    for tally in &tallies {
        trace.push(format!(
            "Seasonal: {} night(s) in '{}' ({} to {}) at {}/night",
            tally.nights,
            tally.rate.season_type,
            tally.rate.start,
            tally.rate.end,
            round_money(tally.daily_rate, 2)
        ));
        if i64::from(tally.rate.minimum_nights) > nights {
            trace.push(format!(
                "Seasonal: stay of {} night(s) is below the {} night minimum of '{}'",
                nights, tally.rate.minimum_nights, tally.rate.season_type
            ));
        }
        total += tally.total;

        let mut line = LineItem::new(
            format!("{} season", tally.rate.season_type),
            tally.nights,
            to_whole(tally.total),
        );
        line.price_per_night = Some(to_whole(tally.daily_rate));
        line.season_type = Some(tally.rate.season_type.clone());
        breakdown.push(line);
    }

    let mut method = PricingMethod::Seasonal;
    if !uncovered.is_empty() {
        let Some(fill) = season::first_rate_gap_fill(rates) else {
            trace.push("Seasonal: uncovered days and no rate to borrow".to_string());
            return Attempt::failure(trace);
        };
        let gap_nights = uncovered.len() as i64;
        let gap_total = fill.daily_rate * Decimal::from(gap_nights);
        trace.push(format!(
            "Seasonal: {} uncovered day(s) from {} priced at '{}' rate {}/night",
            gap_nights,
            uncovered[0],
            fill.source.season_type,
            round_money(fill.daily_rate, 2)
        ));
        total += gap_total;
        method = PricingMethod::Combined;

        let mut line = LineItem::new(
            format!("Uncovered days at {} rate", fill.source.season_type),
            gap_nights,
            to_whole(gap_total),
        );
        line.price_per_night = Some(to_whole(fill.daily_rate));
        line.season_type = Some(fill.source.season_type.clone());
        breakdown.push(line);
    }

    if total.is_zero() {
        trace.push("Seasonal: total is zero, no usable price".to_string());
        return Attempt::failure(trace);
    }

    trace.push(format!("Seasonal: total {}", round_money(total, 2)));
    Attempt::success(SourceQuote::priced(total, breakdown, method), trace)
}

/// Price each day at its month's rate divided by the month length.
///
/// Every day must have a monthly rate.
pub fn calculate_from_monthly_daily(
    rates: &[MonthlyRate],
    start: NaiveDate,
    end: NaiveDate,
) -> Attempt<SourceQuote> {
    let mut trace = Vec::new();
    let mut breakdown: Vec<LineItem> = Vec::new();
    let mut month_totals: Vec<Decimal> = Vec::new();
    let mut current: Option<(i32, u32)> = None;

    for day in stay_days(start, end) {
        let Some(rate) = rates.iter().find(|r| r.month_number == day.month() as i32) else {
            trace.push(format!(
                "Monthly daily: no monthly rate for month {} ({})",
                day.month(),
                day
            ));
            return Attempt::failure(trace);
        };
        let dim = days_in_month(day.year(), day.month());
        let daily = rate.price_per_month / Decimal::from(dim);

        if current != Some((day.year(), day.month())) {
            current = Some((day.year(), day.month()));
            let mut line = LineItem::new(format!("{} (daily rate)", month_label(day)), 0, 0);
            line.price_per_night = Some(to_whole(daily));
            line.price_per_month = Some(to_whole(rate.price_per_month));
            line.month_number = Some(day.month());
            breakdown.push(line);
            month_totals.push(Decimal::ZERO);
            trace.push(format!(
                "Monthly daily: {} at {}/{} days = {}/night",
                month_label(day),
                rate.price_per_month,
                dim,
                round_money(daily, 2)
            ));
        }

        if let (Some(line), Some(sum)) = (breakdown.last_mut(), month_totals.last_mut()) {
            line.nights += 1;
            *sum += daily;
        }
    }

    let mut total = Decimal::ZERO;
    for (line, sum) in breakdown.iter_mut().zip(&month_totals) {
        line.total = to_whole(*sum);
        total += *sum;
    }

    trace.push(format!("Monthly daily: total {}", round_money(total, 2)));
    Attempt::success(
        SourceQuote::priced(total, breakdown, PricingMethod::Monthly),
        trace,
    )
}

/// Price a long stay month by month, each month pro rata to the days used.
///
/// Every overlapped month must have a monthly rate.
pub fn calculate_long_term_from_monthly(
    rates: &[MonthlyRate],
    start: NaiveDate,
    end: NaiveDate,
) -> Attempt<SourceQuote> {
    let mut trace = Vec::new();
    let mut breakdown = Vec::new();
    let mut total = Decimal::ZERO;
    let mut cursor = start;

    while cursor < end {
        let Some(next_month) = first_of_next_month(cursor) else {
            trace.push(format!("Monthly proportional: date overflow after {}", cursor));
            return Attempt::failure(trace);
        };
        let period_end = next_month.min(end);
        let days = (period_end - cursor).num_days();
        let dim = days_in_month(cursor.year(), cursor.month());

        let Some(rate) = rates.iter().find(|r| r.month_number == cursor.month() as i32) else {
            trace.push(format!(
                "Monthly proportional: no monthly rate for {}",
                month_label(cursor)
            ));
            return Attempt::failure(trace);
        };

        let amount = rate.price_per_month * Decimal::from(days) / Decimal::from(dim);
        trace.push(format!(
            "Monthly proportional: {} {}/{} days of {} = {}",
            month_label(cursor),
            days,
            dim,
            rate.price_per_month,
            round_money(amount, 2)
        ));
        if i64::from(rate.minimum_days) > days {
            trace.push(format!(
                "Monthly proportional: {} day(s) in {} is below the {} day minimum",
                days,
                month_label(cursor),
                rate.minimum_days
            ));
        }

        let mut line = LineItem::new(
            format!("{} ({}/{} days)", month_label(cursor), days, dim),
            days,
            to_whole(amount),
        );
        line.price_per_month = Some(to_whole(rate.price_per_month));
        line.month_number = Some(cursor.month());
        breakdown.push(line);

        total += amount;
        cursor = period_end;
    }

    trace.push(format!("Monthly proportional: total {}", round_money(total, 2)));
    Attempt::success(
        SourceQuote::priced(total, breakdown, PricingMethod::Monthly),
        trace,
    )
}

/// Price from a monthly-equivalent amount annualized over 365 days.
fn annualized(
    monthly_equivalent: Decimal,
    nights: i64,
    label: &str,
    method: PricingMethod,
) -> SourceQuote {
    let annual = monthly_equivalent * Decimal::from(12);
    let daily = annual / Decimal::from(365);
    let total = annual * Decimal::from(nights) / Decimal::from(365);

    let mut line = LineItem::new(label, nights, to_whole(total));
    line.price_per_night = Some(to_whole(daily));
    line.price_per_month = Some(to_whole(monthly_equivalent));
    SourceQuote::priced(total, vec![line], method)
}

/// Price from the yearly rate, stored as a monthly equivalent.
pub fn calculate_from_year_price(yearly_rate: Option<Decimal>, nights: i64) -> Attempt<SourceQuote> {
    match yearly_rate.filter(|r| *r > Decimal::ZERO) {
        Some(rate) => {
            let quote = annualized(rate, nights, "Yearly rate", PricingMethod::Yearly);
            let trace = vec![format!(
                "Yearly: {} x 12 / 365 = {}/night for {} night(s), total {}",
                rate,
                round_money(rate * Decimal::from(12) / Decimal::from(365), 2),
                nights,
                round_money(quote.total, 2)
            )];
            Attempt::success(quote, trace)
        }
        None => Attempt::failure(vec!["Yearly: no yearly rate configured".to_string()]),
    }
}

/// Annualize the cheapest monthly rate.
pub fn calculate_from_cheapest_month(rates: &[MonthlyRate], nights: i64) -> Attempt<SourceQuote> {
    let cheapest = rates
        .iter()
        .filter(|r| r.price_per_month > Decimal::ZERO)
        .min_by(|a, b| a.price_per_month.cmp(&b.price_per_month));

    match cheapest {
        Some(rate) => {
            let mut quote = annualized(
                rate.price_per_month,
                nights,
                "Lowest monthly rate x 12",
                PricingMethod::Monthly,
            );
            if let Some(line) = quote.breakdown.first_mut() {
                line.month_number = Some(rate.month_number as u32);
            }
            let trace = vec![format!(
                "Yearly from monthly: lowest rate {} (month {}) x 12 over {} night(s), total {}",
                rate.price_per_month,
                rate.month_number,
                nights,
                round_money(quote.total, 2)
            )];
            Attempt::success(quote, trace)
        }
        None => Attempt::failure(vec!["Yearly from monthly: no priced monthly rates".to_string()]),
    }
}

/// Average the nightly equivalent of every priced season over the stay.
pub fn calculate_from_seasonal_average(rates: &[SeasonalRate], nights: i64) -> Attempt<SourceQuote> {
    let dailies: Vec<Decimal> = rates
        .iter()
        .filter(|r| !r.is_price_on_request())
        .map(season::daily_rate)
        .collect();

    if dailies.is_empty() {
        return Attempt::failure(vec!["Yearly from seasonal: no priced seasonal rates".to_string()]);
    }

    let average = dailies.iter().copied().sum::<Decimal>() / Decimal::from(dailies.len());
    let total = average * Decimal::from(nights);

    let mut line = LineItem::new("Average seasonal rate", nights, to_whole(total));
    line.price_per_night = Some(to_whole(average));
    let trace = vec![format!(
        "Yearly from seasonal: average of {} season(s) = {}/night, total {}",
        dailies.len(),
        round_money(average, 2),
        round_money(total, 2)
    )];

    Attempt::success(
        SourceQuote::priced(total, vec![line], PricingMethod::Seasonal),
        trace,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::PricingType;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn season(name: &str, start: &str, end: &str, price: Decimal) -> SeasonalRate {
        SeasonalRate {
            season_type: name.to_string(),
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            price_per_night: price,
            minimum_nights: 0,
            pricing_type: PricingType::PerNight,
        }
    }

    fn monthly(month: i32, price: Decimal) -> MonthlyRate {
        MonthlyRate {
            month_number: month,
            price_per_month: price,
            minimum_days: 0,
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(3));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(-2.5), 0), dec!(-3));
        assert_eq!(round_money(dec!(2.45), 1), dec!(2.5));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(0), 2), dec!(0));
    }

    #[test]
    fn test_to_whole() {
        assert_eq!(to_whole(dec!(9999.5)), 10000);
        assert_eq!(to_whole(dec!(9999.49)), 9999);
    }

    // ==================== seasonal tests ====================

    #[test]
    fn test_seasonal_single_season() {
        let rates = vec![season("high", "12-01", "02-28", dec!(5000))];
        let attempt = calculate_from_seasonal_prices(&rates, date(2025, 12, 28), date(2026, 1, 4), 7);
        let quote = attempt.value.unwrap();

        assert_eq!(quote.total, dec!(35000));
        assert_eq!(quote.method, PricingMethod::Seasonal);
        assert_eq!(quote.breakdown.len(), 1);
        assert_eq!(quote.breakdown[0].nights, 7);
        assert_eq!(quote.breakdown[0].season_type.as_deref(), Some("high"));
        assert!(!attempt.trace.is_empty());
    }

    #[test]
    fn test_seasonal_spans_two_seasons() {
        let rates = vec![
            season("high", "11-01", "04-30", dec!(5000)),
            season("low", "05-01", "10-31", dec!(3000)),
        ];
        // Apr 28, 29, 30 high; May 1, 2 low
        let quote = calculate_from_seasonal_prices(&rates, date(2025, 4, 28), date(2025, 5, 3), 5)
            .value
            .unwrap();

        assert_eq!(quote.total, dec!(21000));
        assert_eq!(quote.breakdown.len(), 2);
        assert_eq!(quote.breakdown[0].total, 15000);
        assert_eq!(quote.breakdown[1].total, 6000);
    }

    #[test]
    fn test_seasonal_price_on_request_short_circuits() {
        let rates = vec![
            season("low", "05-01", "10-31", dec!(3000)),
            season("festival", "11-01", "11-10", dec!(0)),
        ];
        let attempt = calculate_from_seasonal_prices(&rates, date(2025, 10, 30), date(2025, 11, 3), 4);
        let quote = attempt.value.unwrap();

        assert!(quote.price_on_request);
        assert!(quote.is_usable());
        assert_eq!(quote.total, dec!(0));
        assert_eq!(quote.breakdown[0].period_label, "Price on request");
        assert_eq!(quote.breakdown[0].nights, 4);
    }

    #[test]
    fn test_seasonal_per_period_rate() {
        let mut rate = season("june", "06-01", "06-30", dec!(30000));
        rate.pricing_type = PricingType::PerPeriod;
        let quote = calculate_from_seasonal_prices(&[rate], date(2025, 6, 10), date(2025, 6, 15), 5)
            .value
            .unwrap();
        assert_eq!(quote.total, dec!(5000));
        assert_eq!(quote.breakdown[0].price_per_night, Some(1000));
    }

    #[test]
    fn test_seasonal_gap_fill_borrows_first_rate() {
        let rates = vec![
            season("low", "06-01", "06-30", dec!(1000)),
            season("high", "07-05", "08-31", dec!(3000)),
        ];
        // Jun 29, 30 low; Jul 1-4 uncovered (low rate); Jul 5 high
        let attempt = calculate_from_seasonal_prices(&rates, date(2025, 6, 29), date(2025, 7, 6), 7);
        let quote = attempt.value.unwrap();

        assert_eq!(quote.total, dec!(2000) + dec!(4000) + dec!(3000));
        assert_eq!(quote.method, PricingMethod::Combined);
        let gap = quote.breakdown.last().unwrap();
        assert_eq!(gap.nights, 4);
        assert_eq!(gap.season_type.as_deref(), Some("low"));
        assert!(attempt.trace.iter().any(|l| l.contains("uncovered")));
    }

    #[test]
    fn test_seasonal_fails_without_rates() {
        let attempt = calculate_from_seasonal_prices(&[], date(2025, 6, 1), date(2025, 6, 5), 4);
        assert!(attempt.value.is_none());
        assert_eq!(attempt.trace.len(), 1);
    }

    #[test]
    fn test_seasonal_minimum_nights_noted_in_trace() {
        let mut rate = season("high", "12-01", "02-28", dec!(5000));
        rate.minimum_nights = 7;
        let attempt = calculate_from_seasonal_prices(&[rate], date(2025, 12, 10), date(2025, 12, 13), 3);
        assert!(attempt.value.is_some());
        assert!(attempt.trace.iter().any(|l| l.contains("minimum")));
    }

    // ==================== monthly daily tests ====================

    #[test]
    fn test_monthly_daily_divides_by_month_length() {
        let rates = vec![monthly(6, dec!(30000))];
        let quote = calculate_from_monthly_daily(&rates, date(2025, 6, 1), date(2025, 6, 11))
            .value
            .unwrap();
        assert_eq!(quote.total, dec!(10000));
        assert_eq!(quote.breakdown[0].nights, 10);
        assert_eq!(quote.breakdown[0].price_per_night, Some(1000));
    }

    #[test]
    fn test_monthly_daily_across_months() {
        let rates = vec![monthly(1, dec!(31000)), monthly(2, dec!(28000))];
        let quote = calculate_from_monthly_daily(&rates, date(2025, 1, 30), date(2025, 2, 3))
            .value
            .unwrap();
        assert_eq!(quote.total, dec!(4000));
        assert_eq!(quote.breakdown.len(), 2);
        assert_eq!(quote.breakdown[0].nights, 2);
        assert_eq!(quote.breakdown[1].nights, 2);
    }

    #[test]
    fn test_monthly_daily_fails_on_missing_month() {
        let rates = vec![monthly(1, dec!(31000))];
        let attempt = calculate_from_monthly_daily(&rates, date(2025, 1, 30), date(2025, 2, 3));
        assert!(attempt.value.is_none());
    }

    // ==================== long term tests ====================

    #[test]
    fn test_long_term_proportional_split() {
        let rates = vec![
            monthly(6, dec!(30000)),
            monthly(7, dec!(31000)),
            monthly(8, dec!(62000)),
        ];
        // Jun 16-30 (15 days), Jul (31 days), Aug 1-10 (10 days)
        let quote = calculate_long_term_from_monthly(&rates, date(2025, 6, 16), date(2025, 8, 11))
            .value
            .unwrap();

        assert_eq!(quote.breakdown.len(), 3);
        assert_eq!(quote.breakdown[0].total, 15000);
        assert_eq!(quote.breakdown[1].total, 31000);
        assert_eq!(quote.breakdown[2].total, 20000);
        assert_eq!(quote.total, dec!(66000));
        let nights: i64 = quote.breakdown.iter().map(|l| l.nights).sum();
        assert_eq!(nights, 56);
    }

    #[test]
    fn test_long_term_across_year_end() {
        let rates = vec![monthly(12, dec!(31000)), monthly(1, dec!(31000))];
        let quote = calculate_long_term_from_monthly(&rates, date(2025, 12, 1), date(2026, 2, 1))
            .value
            .unwrap();
        assert_eq!(quote.total, dec!(62000));
        assert_eq!(quote.breakdown[1].month_number, Some(1));
    }

    #[test]
    fn test_long_term_fails_on_missing_month() {
        let rates = vec![monthly(6, dec!(30000))];
        let attempt = calculate_long_term_from_monthly(&rates, date(2025, 6, 1), date(2025, 7, 10));
        assert!(attempt.value.is_none());
        assert!(attempt.trace.last().unwrap().contains("July 2025"));
    }

    // ==================== yearly tests ====================

    #[test]
    fn test_year_price_full_year() {
        let quote = calculate_from_year_price(Some(dec!(20000)), 365).value.unwrap();
        assert_eq!(to_whole(quote.total), 240000);
        assert_eq!(quote.method, PricingMethod::Yearly);
    }

    #[test]
    fn test_year_price_missing() {
        assert!(calculate_from_year_price(None, 30).value.is_none());
        assert!(calculate_from_year_price(Some(dec!(0)), 30).value.is_none());
    }

    #[test]
    fn test_cheapest_month_annualized() {
        let rates = vec![monthly(1, dec!(40000)), monthly(6, dec!(25000)), monthly(7, dec!(0))];
        let quote = calculate_from_cheapest_month(&rates, 365).value.unwrap();
        assert_eq!(quote.total, dec!(300000));
        assert_eq!(quote.breakdown[0].month_number, Some(6));
    }

    #[test]
    fn test_seasonal_average() {
        let rates = vec![
            season("low", "05-01", "10-31", dec!(1000)),
            season("high", "11-01", "04-30", dec!(3000)),
            season("event", "12-31", "12-31", dec!(0)),
        ];
        let quote = calculate_from_seasonal_average(&rates, 400).value.unwrap();
        assert_eq!(quote.total, dec!(800000));
        assert!(calculate_from_seasonal_average(&rates[2..], 400).value.is_none());
    }
}
