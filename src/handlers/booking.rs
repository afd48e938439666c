use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::{ApiJson, ApiPath, success};
use crate::error::AppResult;
use crate::models::{AppState, Booking, Principal};
use crate::services::booking::{BookingService, CreateBookingInput};

#[derive(Serialize)]
pub struct BookingResponse {
    pub booking: Booking,
}

/// POST /api/bookings CreateBookingInput
///
/// # Returns
///
/// - `201 Created` - Booking in `pending` status at the listed price
/// - `404 Not Found` - Unknown service
/// - `409 Conflict` - Service is inactive
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<CreateBookingInput>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingService::create(state.store.as_ref(), &principal, input).await?;
    Ok((StatusCode::CREATED, success(BookingResponse { booking })))
}

/// GET /api/bookings/{id}
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        booking_id = %booking_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(booking_id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingService::get(state.store.as_ref(), &principal, booking_id).await?;
    Ok(success(BookingResponse { booking }))
}

/// POST /api/bookings/{id}/confirm
///
/// Merchant-only. `409 Conflict` unless the booking is `pending`.
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        booking_id = %booking_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(booking_id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingService::confirm(state.store.as_ref(), &principal, booking_id).await?;
    Ok(success(BookingResponse { booking }))
}

/// POST /api/bookings/{id}/cancel
#[instrument(
    skip_all,
    fields(
        user_id = %principal.user_id,
        booking_id = %booking_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(booking_id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingService::cancel(state.store.as_ref(), &principal, booking_id).await?;
    Ok(success(BookingResponse { booking }))
}
