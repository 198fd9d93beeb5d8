//! Search recording and offer retrieval.

mod service;
mod sqlite_store;
mod store;
mod types;

pub use service::SearchService;
pub use sqlite_store::SqliteSearchStore;
pub use store::SearchStore;
pub use types::{
    SearchError, SearchFilter, SearchOutcome, SearchRecord, SearchRequest, MAX_PASSENGERS,
};
