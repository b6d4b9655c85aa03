//! Database queries for the pricing engine.
//!
//! Read-only; rates are returned in the order the engine matches them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{BlockedDate, MonthlyRate, SeasonalRateRow};
use super::services::PricingError;

/// Check that a property exists and is not deleted
pub async fn property_exists(pool: &PgPool, property_id: Uuid) -> Result<bool, PricingError> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM properties
            WHERE id = $1 AND deleted_at IS NULL
        )
        "#,
    )
    .bind(property_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Seasonal prices for a property, ordered by season start
pub async fn get_seasonal_prices(
    pool: &PgPool,
    property_id: Uuid,
) -> Result<Vec<SeasonalRateRow>, PricingError> {
    let rows = sqlx::query_as::<_, SeasonalRateRow>(
        r#"
        SELECT
            season_type, start_date, end_date,
            price_per_night, minimum_nights, pricing_type
        FROM property_seasonal_prices
        WHERE property_id = $1
        ORDER BY start_date ASC
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Monthly prices for a property, ordered by month
pub async fn get_monthly_prices(
    pool: &PgPool,
    property_id: Uuid,
) -> Result<Vec<MonthlyRate>, PricingError> {
    let rates = sqlx::query_as::<_, MonthlyRate>(
        r#"
        SELECT month_number, price_per_month, COALESCE(minimum_days, 0) AS minimum_days
        FROM property_monthly_prices
        WHERE property_id = $1
          AND month_number BETWEEN 1 AND 12
        ORDER BY month_number ASC
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?;

    Ok(rates)
}

/// Yearly rate (monthly equivalent) stored on the property
pub async fn get_yearly_rate(
    pool: &PgPool,
    property_id: Uuid,
) -> Result<Option<Decimal>, PricingError> {
    let rate: Option<Option<Decimal>> = sqlx::query_scalar(
        r#"
        SELECT yearly_price
        FROM properties
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(property_id)
    .fetch_optional(pool)
    .await?;

    Ok(rate.flatten())
}

/// Blocked dates for a property within `from..=to`
pub async fn get_blocked_dates(
    pool: &PgPool,
    property_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<BlockedDate>, PricingError> {
    let dates = sqlx::query_as::<_, BlockedDate>(
        r#"
        SELECT blocked_date, reason
        FROM property_blocked_dates
        WHERE property_id = $1
          AND blocked_date BETWEEN $2 AND $3
        ORDER BY blocked_date ASC
        "#,
    )
    .bind(property_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(dates)
}
