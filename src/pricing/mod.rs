//! Price calculation engine for rental properties.
//!
//! Resolves a stay's price from seasonal, monthly and yearly rates using a
//! fallback chain chosen by stay length, and scans for the cheapest free
//! check-in dates.

pub mod availability;
pub mod calculators;
pub mod engine;
pub mod models;
pub mod period;
pub mod queries;
pub mod repository;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod season;
pub mod services;

// Re-export commonly used items
pub use calculators::round_money;
pub use engine::calculate_quote;
pub use period::PeriodClass;
pub use repository::{PgPricingRepository, PricingRepository};
pub use responses::{AvailablePeriod, LineItem, PriceQuote, PricingMethod};
pub use routes::router;
pub use services::{PricingError, PricingService, QuoteOutcome};
