//! Ticket providers (airlines aggregators, rail operators) shown in results.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteProviderStore;
pub use store::{seed_providers, ProviderError, ProviderStore};
pub use types::{NewProvider, Provider, ProviderFilter};
