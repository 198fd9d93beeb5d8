//! Search orchestration: record a search, synthesize offers, serve rankings.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use super::{SearchError, SearchFilter, SearchOutcome, SearchRecord, SearchRequest, SearchStore};
use crate::metrics;
use crate::offer::{rank, synthesize_with_policy, Mode, Offer, RankCriteria, SynthesisPolicy};
use crate::provider::{Provider, ProviderFilter, ProviderStore};

/// Ties provider and search storage to offer synthesis and ranking.
pub struct SearchService {
    providers: Arc<dyn ProviderStore>,
    searches: Arc<dyn SearchStore>,
    policy: SynthesisPolicy,
    rng: Mutex<StdRng>,
}

impl SearchService {
    /// Create a service. With `seed` set, offer synthesis is reproducible
    /// across runs; otherwise the generator is seeded from the OS.
    pub fn new(
        providers: Arc<dyn ProviderStore>,
        searches: Arc<dyn SearchStore>,
        policy: SynthesisPolicy,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            providers,
            searches,
            policy,
            rng: Mutex::new(rng),
        }
    }

    /// Active providers, optionally restricted to one mode.
    pub fn providers(&self, mode: Option<Mode>) -> Result<Vec<Provider>, SearchError> {
        let mut filter = ProviderFilter::active();
        if let Some(mode) = mode {
            filter = filter.with_mode(mode);
        }
        Ok(self.providers.list(&filter)?)
    }

    /// Validate and record a search, then synthesize and store its offers.
    pub fn run_search(&self, request: SearchRequest) -> Result<SearchOutcome, SearchError> {
        self.run_search_on(request, Utc::now().date_naive())
    }

    /// Same as [`run_search`](Self::run_search) with an explicit current date.
    pub fn run_search_on(
        &self,
        request: SearchRequest,
        today: NaiveDate,
    ) -> Result<SearchOutcome, SearchError> {
        let request = request.normalized();
        let mode = request.mode;

        if let Err(e) = request.validate(today) {
            metrics::SEARCHES_TOTAL
                .with_label_values(&[mode.as_str(), "invalid"])
                .inc();
            return Err(e);
        }

        let result = self.record_and_synthesize(request);

        let outcome_label = if result.is_ok() { "ok" } else { "error" };
        metrics::SEARCHES_TOTAL
            .with_label_values(&[mode.as_str(), outcome_label])
            .inc();

        result
    }

    fn record_and_synthesize(&self, request: SearchRequest) -> Result<SearchOutcome, SearchError> {
        let mode = request.mode;
        let departure_date = request.departure_date;

        let search = self.searches.create(request)?;
        info!(
            search_id = %search.id,
            mode = %mode,
            origin = %search.request.origin,
            destination = %search.request.destination,
            "Search recorded"
        );

        let provider_ids: Vec<String> = self
            .providers(Some(mode))?
            .into_iter()
            .map(|p| p.id)
            .collect();

        if provider_ids.is_empty() {
            warn!(search_id = %search.id, mode = %mode, "No active providers for mode");
        }

        let offers = {
            // The generator holds no invariant a panicking holder could break.
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            synthesize_with_policy(
                &search.id,
                &provider_ids,
                mode,
                departure_date,
                &self.policy,
                &mut *rng,
            )
        };

        self.searches.save_offers(&search.id, &offers)?;

        metrics::PROVIDERS_PER_SEARCH
            .with_label_values(&[mode.as_str()])
            .observe(provider_ids.len() as f64);
        metrics::OFFERS_PER_SEARCH
            .with_label_values(&[mode.as_str()])
            .observe(offers.len() as f64);

        info!(
            search_id = %search.id,
            providers = provider_ids.len(),
            offers = offers.len(),
            "Offers synthesized"
        );

        Ok(SearchOutcome { search, offers })
    }

    /// Get a recorded search.
    pub fn search(&self, id: &str) -> Result<SearchRecord, SearchError> {
        self.searches
            .get(id)?
            .ok_or_else(|| SearchError::NotFound(id.to_string()))
    }

    /// Recently recorded searches.
    pub fn recent_searches(
        &self,
        filter: &SearchFilter,
    ) -> Result<Vec<SearchRecord>, SearchError> {
        self.searches.list(filter)
    }

    /// Number of recorded searches.
    pub fn search_count(&self) -> Result<i64, SearchError> {
        self.searches.count()
    }

    /// Offers of a recorded search, filtered and ordered by `criteria`.
    pub fn offers(
        &self,
        search_id: &str,
        criteria: &RankCriteria,
    ) -> Result<Vec<Offer>, SearchError> {
        // Distinguish "unknown search" from "search with no offers".
        self.search(search_id)?;
        let offers = self.searches.offers(search_id)?;

        let sort_label = criteria.sort.map(|k| k.as_str()).unwrap_or("none");
        metrics::RANK_REQUESTS.with_label_values(&[sort_label]).inc();

        Ok(rank(&offers, criteria))
    }
}
