//! Provider API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use travelpair_core::{Mode, Provider};

use super::searches::{error_response, ApiError, ErrorResponse};
use crate::state::AppState;

/// Query parameters for listing providers
#[derive(Debug, Deserialize)]
pub struct ListProvidersParams {
    /// Restrict to one travel mode ("flight" or "train")
    pub mode: Option<String>,
}

/// Response for listing providers
#[derive(Debug, Serialize)]
pub struct ListProvidersResponse {
    pub providers: Vec<Provider>,
    pub total: usize,
}

/// List active providers, optionally for one mode
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProvidersParams>,
) -> Result<Json<ListProvidersResponse>, ApiError> {
    let mode = match params.mode.as_deref().map(str::parse::<Mode>).transpose() {
        Ok(mode) => mode,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ));
        }
    };

    match state.service().providers(mode) {
        Ok(providers) => Ok(Json(ListProvidersResponse {
            total: providers.len(),
            providers,
        })),
        Err(e) => Err(error_response(e)),
    }
}
