use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::require_role;
use crate::models::{Booking, BookingStatus, NewBooking, Principal, Role};
use crate::store::Store;
use crate::utils::validator::validate_currency;

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub service_id: Uuid,
    #[serde(default = "default_currency")]
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
}

/// Admins pass; everyone else must be the booking's user.
pub(crate) fn ensure_booking_owner(principal: &Principal, booking: &Booking) -> AppResult<()> {
    if principal.role == Role::Admin || booking.user_id == principal.user_id {
        return Ok(());
    }
    warn!(
        user_id = %principal.user_id,
        booking_id = %booking.id,
        "Caller does not own booking"
    );
    Err(AppError::Forbidden("Booking does not belong to you"))
}

pub(crate) async fn fetch_booking(store: &dyn Store, booking_id: Uuid) -> AppResult<Booking> {
    store
        .fetch_booking(booking_id)
        .await?
        .ok_or(AppError::NotFound("Booking not found"))
}

pub struct BookingService;

impl BookingService {
    /// Books an active service at its listed price. The booking starts `Pending`.
    #[instrument(skip_all, fields(user_id = %principal.user_id, service_id = %input.service_id))]
    pub async fn create(
        store: &dyn Store,
        principal: &Principal,
        input: CreateBookingInput,
    ) -> AppResult<Booking> {
        require_role(principal, Role::User)?;
        input.validate()?;

        let service = store
            .fetch_service(input.service_id)
            .await?
            .ok_or(AppError::NotFound("Service not found"))?;
        if !service.is_active {
            return Err(AppError::Conflict("Service is not accepting bookings"));
        }

        let booking = store
            .insert_booking(NewBooking {
                user_id: principal.user_id,
                service_id: service.id,
                merchant_id: service.merchant_id,
                total_amount: service.price,
                currency: input.currency.to_ascii_uppercase(),
            })
            .await?;

        info!(booking_id = %booking.id, "Booking created");
        Ok(booking)
    }

    /// Visible to the booking's user and to the owner of its merchant.
    #[instrument(skip(store, principal), fields(user_id = %principal.user_id))]
    pub async fn get(store: &dyn Store, principal: &Principal, booking_id: Uuid) -> AppResult<Booking> {
        let booking = fetch_booking(store, booking_id).await?;
        if ensure_booking_owner(principal, &booking).is_ok() {
            return Ok(booking);
        }

        let merchant_owner = store
            .fetch_merchant(booking.merchant_id)
            .await?
            .map(|merchant| merchant.owner_user_id);
        if principal.role == Role::Merchant && merchant_owner == Some(principal.user_id) {
            return Ok(booking);
        }

        Err(AppError::Forbidden("Booking does not belong to you"))
    }

    /// Merchant accepts a pending booking.
    #[instrument(skip(store, principal), fields(user_id = %principal.user_id))]
    pub async fn confirm(
        store: &dyn Store,
        principal: &Principal,
        booking_id: Uuid,
    ) -> AppResult<Booking> {
        require_role(principal, Role::Merchant)?;

        let booking = fetch_booking(store, booking_id).await?;
        let merchant = store
            .fetch_merchant(booking.merchant_id)
            .await?
            .ok_or(AppError::NotFound("Merchant not found"))?;
        if principal.role != Role::Admin && merchant.owner_user_id != principal.user_id {
            warn!(merchant_id = %merchant.id, "Caller does not manage this merchant");
            return Err(AppError::Forbidden("Booking belongs to another merchant"));
        }

        let booking = store
            .transition_booking(booking_id, &[BookingStatus::Pending], BookingStatus::Confirmed)
            .await?;

        info!("Booking confirmed by merchant");
        Ok(booking)
    }

    /// User cancels a booking that has not reached a terminal state. A pending
    /// escrow payment stays on record and can no longer be released.
    #[instrument(skip(store, principal), fields(user_id = %principal.user_id))]
    pub async fn cancel(
        store: &dyn Store,
        principal: &Principal,
        booking_id: Uuid,
    ) -> AppResult<Booking> {
        require_role(principal, Role::User)?;

        let booking = fetch_booking(store, booking_id).await?;
        ensure_booking_owner(principal, &booking)?;

        let booking = store
            .transition_booking(booking_id, BookingStatus::CANCELLABLE, BookingStatus::Cancelled)
            .await?;

        info!("Booking cancelled");
        Ok(booking)
    }
}
