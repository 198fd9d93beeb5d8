//! Provider storage trait and error type.

use std::fmt;

use super::{NewProvider, Provider, ProviderFilter};

/// Error type for provider operations.
#[derive(Debug)]
pub enum ProviderError {
    /// Provider not found.
    NotFound(String),
    /// Database error.
    Database(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotFound(id) => write!(f, "Provider not found: {}", id),
            ProviderError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Trait for provider storage backends.
///
/// Listing returns providers in registration order, which is the order
/// offers are synthesized in.
pub trait ProviderStore: Send + Sync {
    /// Register a provider, or overwrite the one with the same ID.
    fn upsert(&self, provider: NewProvider) -> Result<Provider, ProviderError>;

    /// Get a provider by ID.
    fn get(&self, id: &str) -> Result<Option<Provider>, ProviderError>;

    /// List providers matching the filter.
    fn list(&self, filter: &ProviderFilter) -> Result<Vec<Provider>, ProviderError>;

    /// Total number of registered providers.
    fn count(&self) -> Result<i64, ProviderError>;

    /// Enable or disable a provider.
    fn set_active(&self, id: &str, active: bool) -> Result<Provider, ProviderError>;
}

/// Register `providers` if the store is empty.
///
/// Returns how many providers were inserted. A store that already holds
/// providers is left as is, so edits made at runtime survive restarts.
pub fn seed_providers(
    store: &dyn ProviderStore,
    providers: &[NewProvider],
) -> Result<usize, ProviderError> {
    if store.count()? > 0 {
        return Ok(0);
    }
    for provider in providers {
        store.upsert(provider.clone())?;
    }
    Ok(providers.len())
}
