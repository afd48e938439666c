use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tracing::{debug, instrument};

use super::{ApiJson, success};
use crate::error::AppResult;
use crate::models::{AppState, Principal, QuizAnswers, UserPreference};
use crate::services::preference::PreferenceService;

#[derive(Serialize)]
pub struct PreferenceResponse {
    pub preference: UserPreference,
}

/// Submits the style quiz and stores the normalized preference.
///
/// POST /api/preferences QuizAnswers
///
/// # Returns
///
/// - `200 OK` - `{ success, preference, pointsAwarded }`
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not a user
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiJson(answers): ApiJson<QuizAnswers>,
) -> AppResult<impl IntoResponse> {
    debug!("Processing quiz submission");

    let outcome = PreferenceService::submit_quiz(
        state.store.as_ref(),
        &principal,
        &answers,
        state.default_preferred_budget,
    )
    .await?;

    Ok((StatusCode::OK, success(outcome)))
}

/// GET /api/preferences
///
/// `404 Not Found` until the quiz has been submitted.
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn get_preference(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> AppResult<impl IntoResponse> {
    let preference = PreferenceService::get(state.store.as_ref(), &principal).await?;
    Ok(success(PreferenceResponse { preference }))
}
