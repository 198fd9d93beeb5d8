pub mod config;
pub mod metrics;
pub mod offer;
pub mod provider;
pub mod search;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SearchConfig, ServerConfig,
};
pub use offer::{
    group_by_provider, rank, synthesize, synthesize_with_policy, Mode, Offer, ParseModeError,
    ProviderGroup, RankCriteria, RouteKind, SortKey, SynthesisPolicy,
};
pub use provider::{
    seed_providers, NewProvider, Provider, ProviderError, ProviderFilter, ProviderStore,
    SqliteProviderStore,
};
pub use search::{
    SearchError, SearchFilter, SearchOutcome, SearchRecord, SearchRequest, SearchService,
    SearchStore, SqliteSearchStore,
};
