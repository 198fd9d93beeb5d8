//! Testing utilities shared by unit and integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use travelpair_core::testing::fixtures;
//!
//! let offer = fixtures::offer("o1", "mmt").price(4200).stops(1).build();
//! assert!(offer.is_consistent());
//! ```

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    use crate::offer::{Mode, Offer, RouteKind};
    use crate::provider::NewProvider;
    use crate::search::SearchRequest;

    /// Departure used by offers that don't set one.
    pub fn default_departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap()
    }

    /// Start building an offer with reasonable defaults.
    pub fn offer(id: &str, provider_id: &str) -> OfferBuilder {
        OfferBuilder {
            id: id.to_string(),
            search_id: "search-1".to_string(),
            provider_id: provider_id.to_string(),
            departure: default_departure(),
            duration_minutes: 360,
            price: 5000,
            currency: "INR".to_string(),
            stops: 0,
            carrier: "IndiGo".to_string(),
        }
    }

    /// Builder that keeps offer invariants intact.
    ///
    /// Arrival is derived from departure and duration, route kind from stops.
    #[derive(Debug, Clone)]
    pub struct OfferBuilder {
        id: String,
        search_id: String,
        provider_id: String,
        departure: DateTime<Utc>,
        duration_minutes: u32,
        price: u32,
        currency: String,
        stops: u8,
        carrier: String,
    }

    impl OfferBuilder {
        pub fn search(mut self, search_id: &str) -> Self {
            self.search_id = search_id.to_string();
            self
        }

        pub fn departing(mut self, departure: DateTime<Utc>) -> Self {
            self.departure = departure;
            self
        }

        pub fn duration(mut self, minutes: u32) -> Self {
            self.duration_minutes = minutes;
            self
        }

        pub fn price(mut self, price: u32) -> Self {
            self.price = price;
            self
        }

        pub fn stops(mut self, stops: u8) -> Self {
            self.stops = stops;
            self
        }

        pub fn carrier(mut self, carrier: &str) -> Self {
            self.carrier = carrier.to_string();
            self
        }

        pub fn build(self) -> Offer {
            Offer {
                booking_reference: format!("REF{}", self.id.to_uppercase()),
                id: self.id,
                search_id: self.search_id,
                provider_id: self.provider_id,
                route_kind: RouteKind::from_stops(self.stops),
                departure: self.departure,
                arrival: self.departure + Duration::minutes(i64::from(self.duration_minutes)),
                duration_minutes: self.duration_minutes,
                price: self.price,
                currency: self.currency,
                stops: self.stops,
                carrier: self.carrier,
            }
        }
    }

    /// A one-way, one-passenger request departing on `date`.
    pub fn search_request(mode: Mode, date: NaiveDate) -> SearchRequest {
        match mode {
            Mode::Flight => SearchRequest::one_way(mode, "Mumbai (BOM)", "Delhi (DEL)", date),
            Mode::Train => SearchRequest::one_way(mode, "Delhi", "Jaipur", date),
        }
    }

    /// Two flight providers and one train provider, all active.
    pub fn providers() -> Vec<NewProvider> {
        vec![
            NewProvider::new("skyfare", "SkyFare", Mode::Flight)
                .with_logo("https://example.com/skyfare.png"),
            NewProvider::new("railnet", "RailNet", Mode::Train),
            NewProvider::new("jetdeals", "JetDeals", Mode::Flight),
        ]
    }
}
