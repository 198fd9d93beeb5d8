//! Search storage trait.

use super::{SearchError, SearchFilter, SearchRecord, SearchRequest};
use crate::offer::Offer;

/// Trait for search storage backends.
///
/// Stores both the search records and the offers synthesized for them.
pub trait SearchStore: Send + Sync {
    /// Record a new search.
    fn create(&self, request: SearchRequest) -> Result<SearchRecord, SearchError>;

    /// Get a search by ID.
    fn get(&self, id: &str) -> Result<Option<SearchRecord>, SearchError>;

    /// List searches matching the filter, most recent first.
    fn list(&self, filter: &SearchFilter) -> Result<Vec<SearchRecord>, SearchError>;

    /// Total number of recorded searches.
    fn count(&self) -> Result<i64, SearchError>;

    /// Replace the offers stored for a search.
    fn save_offers(&self, search_id: &str, offers: &[Offer]) -> Result<(), SearchError>;

    /// Offers for a search, in the order they were saved.
    fn offers(&self, search_id: &str) -> Result<Vec<Offer>, SearchError>;
}
