//! Rental property pricing service.

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;

use cache::RateCache;
use pricing::PricingService;

/// Shared state for route handlers
#[derive(Clone)]
pub struct AppState {
    pub pricing: PricingService,
    pub cache: RateCache,
}
