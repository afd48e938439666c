use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;
use uuid::Uuid;

use super::{ApiJson, ApiPath, success};
use crate::error::AppResult;
use crate::models::{AppState, Principal};
use crate::services::trust::{ReviewInput, TrustService};

/// POST /api/bookings/{id}/review ReviewInput
///
/// # Returns
///
/// - `201 Created` - `{ success, pointsAwarded, trustDelta, trustScore, hardSellReportFiled }`
/// - `409 Conflict` - Booking not completed or already reviewed
/// - `422 Unprocessable Entity` - Rating outside 1-5
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        booking_id = %booking_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(booking_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> AppResult<impl IntoResponse> {
    let outcome =
        TrustService::submit_review(state.store.as_ref(), &principal, booking_id, input).await?;
    Ok((StatusCode::CREATED, success(outcome)))
}
