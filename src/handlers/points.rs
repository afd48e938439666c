use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    response::IntoResponse,
};
use tracing::instrument;

use super::success;
use crate::error::AppResult;
use crate::models::{AppState, Principal};
use crate::services::points::PointsService;

/// GET /api/points
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn get_points(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> AppResult<impl IntoResponse> {
    let summary = PointsService::summary(state.store.as_ref(), &principal).await?;
    Ok(success(summary))
}
