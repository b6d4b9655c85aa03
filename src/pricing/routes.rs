//! HTTP routes for the pricing engine.
//!
//! JSON in, JSON out. Mounted under `/api/pricing` by the binary.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::cache::CacheStats;
use crate::error::{AppError, Result};
use crate::AppState;

use super::availability::MAX_NIGHTS;
use super::requests::{AvailablePeriodsRequest, CalculatePriceRequest};
use super::responses::{AvailablePeriodsResponse, PriceQuote};
use super::services::QuoteOutcome;

/// Pricing API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(quote))
        .route("/available-periods", post(available_periods))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/invalidate", post(invalidate_all))
        .route("/cache/invalidate/:property_id", post(invalidate_property))
}

async fn quote(
    State(state): State<AppState>,
    Json(req): Json<CalculatePriceRequest>,
) -> Result<Json<PriceQuote>> {
    let outcome = state
        .pricing
        .quote(req.property_id, req.check_in, req.check_out)
        .await?;

    match outcome {
        QuoteOutcome::Quoted(quote) => Ok(Json(quote)),
        QuoteOutcome::InvalidRange => Err(AppError::BadRequest(
            "check_out must be after check_in".to_string(),
        )),
        QuoteOutcome::PropertyNotFound => Err(AppError::NotFound),
        QuoteOutcome::NoPricingData => Err(AppError::PricingUnavailable(
            "No prices are configured for this property".to_string(),
        )),
        QuoteOutcome::Unpriceable => Err(AppError::PricingUnavailable(
            "Pricing is not available for these dates".to_string(),
        )),
    }
}

async fn available_periods(
    State(state): State<AppState>,
    Json(req): Json<AvailablePeriodsRequest>,
) -> Result<Json<AvailablePeriodsResponse>> {
    if req.nights <= 0 || req.nights > MAX_NIGHTS {
        return Err(AppError::BadRequest(format!(
            "nights must be between 1 and {}",
            MAX_NIGHTS
        )));
    }
    if matches!(req.month, Some(m) if !(1..=12).contains(&m)) {
        return Err(AppError::BadRequest("month must be between 1 and 12".to_string()));
    }

    let periods = state
        .pricing
        .find_available_periods(req.property_id, req.nights, req.month, req.year)
        .await;

    Ok(Json(AvailablePeriodsResponse {
        nights: req.nights,
        count: periods.len(),
        periods,
    }))
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

async fn invalidate_all(State(state): State<AppState>) -> Json<CacheStats> {
    state.cache.invalidate_all();
    Json(state.cache.stats())
}

async fn invalidate_property(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Json<CacheStats> {
    state.cache.invalidate_property(property_id).await;
    Json(state.cache.stats())
}
