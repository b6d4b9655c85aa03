//! Period-class dispatch over the per-source calculators.
//!
//! `calculate_quote` is a pure function of the rate card and the stay dates.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::calculators::{self, round_money, to_whole, Attempt, SourceQuote};
use super::models::RateCard;
use super::period::{count_nights, PeriodClass};
use super::responses::{LineItem, PriceQuote, PricingMethod, CURRENCY};

/// Price a stay from a property's rates.
///
/// Returns `None` for an empty or inverted range, or when no source in the
/// period class's chain can price the stay.
pub fn calculate_quote(card: &RateCard, check_in: NaiveDate, check_out: NaiveDate) -> Option<PriceQuote> {
    let nights = count_nights(check_in, check_out);
    let class = PeriodClass::classify(nights)?;

    let mut trace = vec![format!(
        "Stay {} to {}: {} night(s), {} pricing",
        check_in,
        check_out,
        nights,
        class.label()
    )];

    let source = first_usable(card, class, check_in, check_out, nights, &mut trace);

    let Some(source) = source else {
        trace.push("No pricing source could price this stay".to_string());
        tracing::debug!(
            nights,
            class = class.label(),
            "No price available: {}",
            trace.join("; ")
        );
        return None;
    };

    let yearly_only_warning = card.is_yearly_only() && class != PeriodClass::Yearly;
    if yearly_only_warning {
        trace.push("Warning: only a yearly rate is configured; price is an annualized approximation".to_string());
    }

    let total_price = to_whole(source.total);
    let daily_average = to_whole(source.total / Decimal::from(nights));

    tracing::debug!(
        nights,
        class = class.label(),
        method = ?source.method,
        total_price,
        "Quote calculated"
    );

    Some(PriceQuote {
        total_price,
        currency: CURRENCY.to_string(),
        nights,
        daily_average,
        monthly_equivalent: daily_average * 30,
        breakdown: source.breakdown,
        pricing_method: source.method,
        yearly_only_warning,
        price_on_request: source.price_on_request,
        trace,
    })
}

/// A single pricing source a dispatcher can try
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Seasonal,
    MonthlyDaily,
    MonthlyDirect,
    MonthlyProportional,
    YearlyRate,
    CheapestMonth,
    SeasonalAverage,
}

/// Fallback order for each period class
fn chain(class: PeriodClass) -> [Source; 3] {
    match class {
        PeriodClass::ShortTerm => [Source::Seasonal, Source::MonthlyDaily, Source::YearlyRate],
        PeriodClass::MonthlyExact => [Source::MonthlyDirect, Source::Seasonal, Source::YearlyRate],
        PeriodClass::LongTerm => [
            Source::MonthlyProportional,
            Source::Seasonal,
            Source::YearlyRate,
        ],
        PeriodClass::Yearly => [
            Source::YearlyRate,
            Source::CheapestMonth,
            Source::SeasonalAverage,
        ],
    }
}

fn run_source(
    source: Source,
    card: &RateCard,
    start: NaiveDate,
    end: NaiveDate,
    nights: i64,
) -> Attempt<SourceQuote> {
    match source {
        Source::Seasonal => calculators::calculate_from_seasonal_prices(&card.seasonal, start, end, nights),
        Source::MonthlyDaily => calculators::calculate_from_monthly_daily(&card.monthly, start, end),
        Source::MonthlyDirect => monthly_direct(card, start, nights),
        Source::MonthlyProportional => {
            calculators::calculate_long_term_from_monthly(&card.monthly, start, end)
        }
        Source::YearlyRate => calculators::calculate_from_year_price(card.yearly, nights),
        Source::CheapestMonth => calculators::calculate_from_cheapest_month(&card.monthly, nights),
        Source::SeasonalAverage => calculators::calculate_from_seasonal_average(&card.seasonal, nights),
    }
}

/// Try each source of the class's chain until one returns a usable quote.
fn first_usable(
    card: &RateCard,
    class: PeriodClass,
    start: NaiveDate,
    end: NaiveDate,
    nights: i64,
    trace: &mut Vec<String>,
) -> Option<SourceQuote> {
    for source in chain(class) {
        let attempt = run_source(source, card, start, end, nights);
        trace.extend(attempt.trace);
        if let Some(quote) = attempt.value.filter(SourceQuote::is_usable) {
            return Some(quote);
        }
        tracing::trace!(?source, class = class.label(), "Pricing source failed, trying next");
    }
    None
}

/// Full monthly rate for the start month, undivided.
fn monthly_direct(card: &RateCard, start: NaiveDate, nights: i64) -> Attempt<SourceQuote> {
    let Some(rate) = card.monthly_rate(start.month()) else {
        return Attempt {
            value: None,
            trace: vec![format!("Monthly: no monthly rate for month {}", start.month())],
        };
    };

    let mut line = LineItem::new(
        format!("Monthly rate ({})", start.format("%B")),
        nights,
        to_whole(rate.price_per_month),
    );
    line.price_per_month = Some(to_whole(rate.price_per_month));
    line.month_number = Some(start.month());

    let mut trace = vec![format!(
        "Monthly: full rate {} for month {} ({} night(s))",
        round_money(rate.price_per_month, 2),
        start.month(),
        nights
    )];
    if i64::from(rate.minimum_days) > nights {
        trace.push(format!(
            "Monthly: stay of {} night(s) is below the {} day minimum",
            nights, rate.minimum_days
        ));
    }

    Attempt {
        value: Some(SourceQuote {
            total: rate.price_per_month,
            breakdown: vec![line],
            method: PricingMethod::Monthly,
            price_on_request: false,
        }),
        trace,
    }
}
