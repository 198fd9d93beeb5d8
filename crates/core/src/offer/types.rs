//! Types shared by offer synthesis and ranking.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Transport category of a search, provider or offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Flight,
    Train,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Flight => "flight",
            Mode::Train => "train",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown mode: {0}")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flight" => Ok(Mode::Flight),
            "train" => Ok(Mode::Train),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

/// Whether an offer is nonstop or has intermediate stops.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Direct,
    Connecting,
}

impl RouteKind {
    /// Route kind implied by a stop count.
    pub fn from_stops(stops: u8) -> Self {
        if stops == 0 {
            RouteKind::Direct
        } else {
            RouteKind::Connecting
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Direct => "direct",
            RouteKind::Connecting => "connecting",
        }
    }
}

/// A single synthesized ticket option returned for a search.
///
/// Offers are only built by [`synthesize`](super::synthesize), which keeps
/// `arrival == departure + duration_minutes` and `route_kind` consistent
/// with `stops`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offer {
    /// Identifier, unique within a search.
    pub id: String,
    /// Search this offer was synthesized for.
    pub search_id: String,
    /// Provider selling this offer.
    pub provider_id: String,
    pub route_kind: RouteKind,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub duration_minutes: u32,
    /// Price in whole currency units.
    pub price: u32,
    /// ISO 4217 currency code.
    pub currency: String,
    pub stops: u8,
    /// Operating airline or railway.
    pub carrier: String,
    pub booking_reference: String,
}

impl Offer {
    pub fn is_direct(&self) -> bool {
        self.route_kind == RouteKind::Direct
    }

    /// Duration rendered as `"{hours}h {minutes}m"`.
    pub fn duration_label(&self) -> String {
        format!(
            "{}h {}m",
            self.duration_minutes / 60,
            self.duration_minutes % 60
        )
    }

    /// Checks the timing and route-kind invariants.
    pub fn is_consistent(&self) -> bool {
        let timing = self.departure + Duration::minutes(i64::from(self.duration_minutes))
            == self.arrival;
        let route = (self.stops == 0) == self.is_direct();
        timing && route
    }
}

/// Key used to order ranked offers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Price,
    Duration,
    Departure,
}

impl SortKey {
    /// Parse a sort key, returning `None` for anything unrecognized.
    ///
    /// Callers treat `None` as "keep the incoming order".
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" => Some(SortKey::Price),
            "duration" => Some(SortKey::Duration),
            "departure" => Some(SortKey::Departure),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Price => "price",
            SortKey::Duration => "duration",
            SortKey::Departure => "departure",
        }
    }
}

/// Filter and sort parameters for [`rank`](super::rank).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCriteria {
    /// Sort key; `None` keeps the input order.
    #[serde(default)]
    pub sort: Option<SortKey>,
    /// Keep only direct offers.
    #[serde(default)]
    pub direct_only: bool,
    /// Keep only offers with at most this many stops.
    #[serde(default)]
    pub max_stops: Option<u8>,
}

impl RankCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    pub fn direct_only(mut self, direct_only: bool) -> Self {
        self.direct_only = direct_only;
        self
    }

    pub fn with_max_stops(mut self, max_stops: u8) -> Self {
        self.max_stops = Some(max_stops);
        self
    }
}
