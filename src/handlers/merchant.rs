use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use tracing::instrument;
use uuid::Uuid;

use super::{ApiPath, success};
use crate::error::AppResult;
use crate::models::AppState;
use crate::services::trust::TrustService;

/// GET /api/merchants/{id}/trust-score
#[instrument(skip_all, fields(merchant_id = %merchant_id))]
pub async fn get_trust_score(
    State(state): State<Arc<AppState>>,
    ApiPath(merchant_id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let view = TrustService::merchant_trust_score(state.store.as_ref(), merchant_id).await?;
    Ok(success(view))
}
