//! Search request and record types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::offer::{Mode, Offer};
use crate::provider::ProviderError;

/// Largest party a single search can book for.
pub const MAX_PASSENGERS: u8 = 9;

/// What a user asked for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub mode: Mode,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub passengers: u8,
}

impl SearchRequest {
    /// One-way request for a single passenger.
    pub fn one_way(
        mode: Mode,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: NaiveDate,
    ) -> Self {
        Self {
            mode,
            origin: origin.into(),
            destination: destination.into(),
            departure_date,
            return_date: None,
            passengers: 1,
        }
    }

    pub fn with_return(mut self, return_date: NaiveDate) -> Self {
        self.return_date = Some(return_date);
        self
    }

    pub fn with_passengers(mut self, passengers: u8) -> Self {
        self.passengers = passengers;
        self
    }

    /// Trim free-text fields.
    pub fn normalized(mut self) -> Self {
        self.origin = self.origin.trim().to_string();
        self.destination = self.destination.trim().to_string();
        self
    }

    /// Check the request against the booking form rules.
    ///
    /// `today` is the earliest allowed departure date.
    pub fn validate(&self, today: NaiveDate) -> Result<(), SearchError> {
        if self.origin.trim().is_empty() {
            return Err(SearchError::invalid("origin", "cannot be empty"));
        }
        if self.destination.trim().is_empty() {
            return Err(SearchError::invalid("destination", "cannot be empty"));
        }
        if self.departure_date < today {
            return Err(SearchError::invalid(
                "departure_date",
                format!("cannot be before {}", today),
            ));
        }
        if let Some(return_date) = self.return_date {
            if return_date < self.departure_date {
                return Err(SearchError::invalid(
                    "return_date",
                    "cannot be before the departure date",
                ));
            }
        }
        if self.passengers == 0 || self.passengers > MAX_PASSENGERS {
            return Err(SearchError::invalid(
                "passengers",
                format!("must be between 1 and {}", MAX_PASSENGERS),
            ));
        }
        Ok(())
    }
}

/// A recorded search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRecord {
    pub id: String,
    #[serde(flatten)]
    pub request: SearchRequest,
    pub created_at: DateTime<Utc>,
}

/// A recorded search together with the offers synthesized for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub search: SearchRecord,
    /// Offers in ascending price order.
    pub offers: Vec<Offer>,
}

/// Filter for listing recorded searches.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    pub mode: Option<Mode>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchFilter {
    pub fn new() -> Self {
        Self {
            mode: None,
            limit: 100,
            offset: 0,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Errors from recording and querying searches.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid {field}: {reason}")]
    InvalidRequest { field: String, reason: String },

    #[error("Search not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl SearchError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SearchError::InvalidRequest {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn request() -> SearchRequest {
        SearchRequest::one_way(
            Mode::Flight,
            "Mumbai (BOM)",
            "Delhi (DEL)",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
    }

    fn invalid_field(result: Result<(), SearchError>) -> String {
        match result {
            Err(SearchError::InvalidRequest { field, .. }) => field,
            other => panic!("expected invalid request, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate(today()).is_ok());
        assert!(request()
            .with_return(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .with_passengers(9)
            .validate(today())
            .is_ok());
    }

    #[test]
    fn test_blank_origin_rejected() {
        let mut req = request();
        req.origin = "   ".to_string();
        assert_eq!(invalid_field(req.validate(today())), "origin");
    }

    #[test]
    fn test_blank_destination_rejected() {
        let mut req = request();
        req.destination = String::new();
        assert_eq!(invalid_field(req.validate(today())), "destination");
    }

    #[test]
    fn test_past_departure_rejected() {
        let req = request();
        let later = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(invalid_field(req.validate(later)), "departure_date");
    }

    #[test]
    fn test_return_before_departure_rejected() {
        let req = request().with_return(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
        assert_eq!(invalid_field(req.validate(today())), "return_date");
    }

    #[test]
    fn test_passenger_bounds() {
        assert_eq!(
            invalid_field(request().with_passengers(0).validate(today())),
            "passengers"
        );
        assert_eq!(
            invalid_field(request().with_passengers(10).validate(today())),
            "passengers"
        );
    }

    #[test]
    fn test_normalized_trims() {
        let mut req = request();
        req.origin = "  Pune ".to_string();
        let req = req.normalized();
        assert_eq!(req.origin, "Pune");
    }

    #[test]
    fn test_deserialize_request() {
        let json = r#"{
            "mode": "train",
            "origin": "Delhi",
            "destination": "Agra",
            "departure_date": "2025-07-04",
            "passengers": 2
        }"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.mode, Mode::Train);
        assert_eq!(req.return_date, None);
        assert_eq!(req.passengers, 2);
    }
}
