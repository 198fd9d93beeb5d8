//! Search API handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use travelpair_core::{
    group_by_provider, Mode, Offer, ParseModeError, Provider, ProviderFilter, RankCriteria,
    SearchError, SearchFilter, SearchRecord, SearchRequest, SortKey,
};

use crate::state::AppState;

/// Maximum allowed limit for search listings
const MAX_LIMIT: i64 = 1000;

/// Default limit for search listings
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for starting a search
#[derive(Debug, Deserialize)]
pub struct CreateSearchBody {
    /// "flight" or "train"
    pub mode: String,
    pub origin: String,
    pub destination: String,
    /// Calendar date, `YYYY-MM-DD`
    pub departure_date: String,
    /// Calendar date, `YYYY-MM-DD`
    pub return_date: Option<String>,
    /// Defaults to one passenger
    pub passengers: Option<u8>,
}

impl CreateSearchBody {
    fn into_request(self) -> Result<SearchRequest, SearchError> {
        let mode: Mode = self
            .mode
            .parse()
            .map_err(|e: ParseModeError| SearchError::invalid("mode", e.to_string()))?;
        let departure_date = parse_date("departure_date", &self.departure_date)?;
        let return_date = self
            .return_date
            .as_deref()
            .map(|s| parse_date("return_date", s))
            .transpose()?;

        let mut request =
            SearchRequest::one_way(mode, self.origin, self.destination, departure_date)
                .with_passengers(self.passengers.unwrap_or(1));
        if let Some(return_date) = return_date {
            request = request.with_return(return_date);
        }
        Ok(request)
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, SearchError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SearchError::invalid(field, format!("expected YYYY-MM-DD, got '{}'", value))
    })
}

/// Query parameters for listing searches
#[derive(Debug, Deserialize)]
pub struct ListSearchesParams {
    pub mode: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for ranking offers
#[derive(Debug, Default, Deserialize)]
pub struct OffersParams {
    /// "price", "duration" or "departure"; anything else keeps stored order
    pub sort: Option<String>,
    pub direct_only: Option<bool>,
    pub max_stops: Option<u8>,
}

impl OffersParams {
    fn criteria(&self) -> RankCriteria {
        let mut criteria = RankCriteria::new().direct_only(self.direct_only.unwrap_or(false));
        if let Some(key) = self.sort.as_deref().and_then(SortKey::parse) {
            criteria = criteria.sorted_by(key);
        }
        if let Some(max_stops) = self.max_stops {
            criteria = criteria.with_max_stops(max_stops);
        }
        criteria
    }
}

/// Response for a newly run search
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub search: SearchRecord,
    pub offer_count: usize,
}

/// Response for listing searches
#[derive(Debug, Serialize)]
pub struct ListSearchesResponse {
    pub searches: Vec<SearchRecord>,
    pub limit: i64,
    pub offset: i64,
}

/// Offer joined with its provider's display details
#[derive(Debug, Serialize)]
pub struct OfferView {
    #[serde(flatten)]
    pub offer: Offer,
    pub provider_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_logo_url: Option<String>,
    pub duration_label: String,
}

impl OfferView {
    fn new(offer: Offer, provider: &Provider) -> Self {
        Self {
            duration_label: offer.duration_label(),
            provider_name: provider.name.clone(),
            provider_logo_url: provider.logo_url.clone(),
            offer,
        }
    }
}

/// Per-provider summary of the ranked offers
#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub provider_id: String,
    pub provider_name: String,
    pub count: usize,
    pub cheapest: u32,
}

/// Response for ranked offers
#[derive(Debug, Serialize)]
pub struct OffersResponse {
    pub search_id: String,
    pub criteria: RankCriteria,
    pub offers: Vec<OfferView>,
    pub count: usize,
    pub providers: Vec<ProviderSummary>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status and JSON body returned on failure
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a search error to its HTTP status.
pub(crate) fn error_response(e: SearchError) -> ApiError {
    let status = match &e {
        SearchError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        SearchError::NotFound(_) => StatusCode::NOT_FOUND,
        SearchError::Database(_) | SearchError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Run a search: record it and synthesize offers from active providers
pub async fn create_search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSearchBody>,
) -> Result<(StatusCode, Json<SearchResponse>), ApiError> {
    let request = body.into_request().map_err(error_response)?;
    let outcome = state.service().run_search(request).map_err(error_response)?;

    let delay_ms = state.config().search.result_delay_ms;
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok((
        StatusCode::CREATED,
        Json(SearchResponse {
            offer_count: outcome.offers.len(),
            search: outcome.search,
        }),
    ))
}

/// List recent searches, most recent first
pub async fn list_searches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListSearchesParams>,
) -> Result<Json<ListSearchesResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = SearchFilter::new().with_limit(limit).with_offset(offset);
    if let Some(ref mode) = params.mode {
        match mode.parse::<Mode>() {
            Ok(mode) => filter = filter.with_mode(mode),
            Err(e) => return Err(error_response(SearchError::invalid("mode", e.to_string()))),
        }
    }

    match state.service().recent_searches(&filter) {
        Ok(searches) => Ok(Json(ListSearchesResponse {
            searches,
            limit,
            offset,
        })),
        Err(e) => Err(error_response(e)),
    }
}

/// Get a search by ID
pub async fn get_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SearchRecord>, ApiError> {
    state.service().search(&id).map(Json).map_err(error_response)
}

/// Filter and order the offers of a search
pub async fn list_offers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<OffersParams>,
) -> Result<Json<OffersResponse>, ApiError> {
    let criteria = params.criteria();
    let ranked = state
        .service()
        .offers(&id, &criteria)
        .map_err(error_response)?;

    // Inactive providers still label offers recorded while they were active.
    let providers: HashMap<String, Provider> = state
        .provider_store()
        .list(&ProviderFilter::default())
        .map_err(|e| error_response(e.into()))?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    let mut offers = Vec::with_capacity(ranked.len());
    for offer in ranked {
        match providers.get(&offer.provider_id) {
            Some(provider) => offers.push(OfferView::new(offer, provider)),
            None => warn!(
                search_id = %id,
                offer_id = %offer.id,
                provider_id = %offer.provider_id,
                "Skipping offer from unknown provider"
            ),
        }
    }

    let shown: Vec<Offer> = offers.iter().map(|view| view.offer.clone()).collect();
    let summaries = group_by_provider(&shown)
        .into_iter()
        .filter_map(|group| {
            let provider = providers.get(&group.provider_id)?;
            Some(ProviderSummary {
                cheapest: group.offers.iter().map(|o| o.price).min().unwrap_or(0),
                count: group.offers.len(),
                provider_name: provider.name.clone(),
                provider_id: group.provider_id,
            })
        })
        .collect();

    Ok(Json(OffersResponse {
        search_id: id,
        criteria,
        count: offers.len(),
        offers,
        providers: summaries,
    }))
}
