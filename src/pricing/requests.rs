//! Request DTOs for pricing API endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

/// Request to quote a stay
#[derive(Debug, Deserialize)]
pub struct CalculatePriceRequest {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Request to find the cheapest available stays
#[derive(Debug, Deserialize)]
pub struct AvailablePeriodsRequest {
    pub property_id: Uuid,
    pub nights: i64,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_periods_request_optional_month() {
        let req: AvailablePeriodsRequest = serde_json::from_value(serde_json::json!({
            "property_id": "8f14e45f-ceea-467f-a0e6-0a1b2c3d4e5f",
            "nights": 7
        }))
        .unwrap();
        assert_eq!(req.nights, 7);
        assert!(req.month.is_none());
        assert!(req.year.is_none());
    }

    #[test]
    fn test_calculate_price_request_dates() {
        let req: CalculatePriceRequest = serde_json::from_value(serde_json::json!({
            "property_id": "8f14e45f-ceea-467f-a0e6-0a1b2c3d4e5f",
            "check_in": "2025-12-28",
            "check_out": "2026-01-04"
        }))
        .unwrap();
        assert_eq!(req.check_out, NaiveDate::from_ymd_opt(2026, 1, 4).unwrap());
    }
}
