use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{ApiJson, ApiPath, success};
use crate::error::AppResult;
use crate::models::{AppState, Principal};
use crate::services::escrow::{CompletionInput, CreatePaymentInput, EscrowService};

/// Places the booking's payment into escrow.
///
/// POST /api/bookings/{id}/payment CreatePaymentInput
///
/// # Returns
///
/// - `201 Created` - `{ success, paymentId, pointsAwarded, payment }`
/// - `403 Forbidden` - Booking belongs to someone else
/// - `404 Not Found` - Unknown booking
/// - `409 Conflict` - Payment already exists or booking closed
/// - `422 Unprocessable Entity` - Invalid amount, currency or payment method
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        booking_id = %booking_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(booking_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CreatePaymentInput>,
) -> AppResult<impl IntoResponse> {
    debug!("Processing escrow payment request");
    let receipt =
        EscrowService::create_payment(state.store.as_ref(), &principal, booking_id, input).await?;
    Ok((StatusCode::CREATED, success(receipt)))
}

/// GET /api/bookings/{id}/payment
///
/// Owner-only. Includes the payouts created by a release.
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        booking_id = %booking_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(booking_id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let detail = EscrowService::get_payment(state.store.as_ref(), &principal, booking_id).await?;
    Ok(success(detail))
}

/// Confirms (or declines to confirm) that the service was delivered.
///
/// POST /api/bookings/{id}/complete `{ "serviceCompleted": bool }`
///
/// # Returns
///
/// - `200 OK` - `{ success, released, payment, payout }`
/// - `409 Conflict` - Payment already processed or booking cancelled
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        booking_id = %booking_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn confirm_completion(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(booking_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CompletionInput>,
) -> AppResult<impl IntoResponse> {
    let outcome = EscrowService::confirm_completion(
        state.store.as_ref(),
        &principal,
        booking_id,
        input.service_completed,
    )
    .await?;
    Ok(success(outcome))
}
