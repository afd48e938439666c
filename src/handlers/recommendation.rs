use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    response::IntoResponse,
};
use tracing::{debug, instrument};

use super::success;
use crate::error::AppResult;
use crate::models::{AppState, Principal};
use crate::services::recommendation::RecommendationService;

/// Ranked services for the caller, best match first.
///
/// GET /api/recommendations
///
/// Users who never took the quiz get permissive defaults rather than an error.
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> AppResult<impl IntoResponse> {
    debug!("Computing recommendations");

    let set = RecommendationService::recommend(
        state.store.as_ref(),
        &state.taxonomy,
        principal.user_id,
        state.default_preferred_budget,
    )
    .await?;

    Ok(success(set))
}
