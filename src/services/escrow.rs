//! # Escrow Ledger
//!
//! Per-booking custody of the customer's payment.
//!
//! ## Payment States
//!
//! - no payment - Booking exists, nothing collected yet
//! - `Pending` - Funds held; created by the booking's user
//! - `Released` - The user confirmed delivery; a payout exists and the booking
//!   is completed (terminal)
//!
//! Entitlement and input checks run before the store is touched. Duplicate
//! payments and double releases are rejected by the store itself.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::booking::{ensure_booking_owner, fetch_booking};
use crate::error::{AppError, AppResult};
use crate::middleware::require_role;
use crate::models::{
    EscrowPayment, NewEscrowPayment, PaymentStatus, Payout, PointsAward, PointsReason, Principal,
    Role,
};
use crate::store::Store;
use crate::utils::constant::MAX_PAYMENT_METHOD_LENGTH;
use crate::utils::validator::{validate_currency, validate_not_blank};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentInput {
    /// Minor currency units.
    #[validate(range(min = 1))]
    pub amount: i64,
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
    #[validate(
        length(min = 1, max = MAX_PAYMENT_METHOD_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_id: Uuid,
    pub points_awarded: i64,
    pub payment: EscrowPayment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionInput {
    pub service_completed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub released: bool,
    pub payment: EscrowPayment,
    pub payout: Option<Payout>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetail {
    pub payment: EscrowPayment,
    pub payouts: Vec<Payout>,
}

pub struct EscrowService;

impl EscrowService {
    /// Places the booking's payment in escrow and grants the booking points.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` - non-positive amount, bad currency or payment method
    /// - `NotFound` - no such booking
    /// - `Forbidden` - caller does not own the booking
    /// - `Conflict` - a payment already exists or the booking is closed
    #[instrument(skip_all, fields(user_id = %principal.user_id, booking_id = %booking_id))]
    pub async fn create_payment(
        store: &dyn Store,
        principal: &Principal,
        booking_id: Uuid,
        input: CreatePaymentInput,
    ) -> AppResult<PaymentReceipt> {
        require_role(principal, Role::User)?;
        input.validate()?;

        let booking = fetch_booking(store, booking_id).await?;
        ensure_booking_owner(principal, &booking)?;

        let created = store
            .create_escrow_payment(
                NewEscrowPayment {
                    booking_id,
                    amount: input.amount,
                    currency: input.currency.to_ascii_uppercase(),
                    payment_method: input.payment_method.trim().to_string(),
                },
                PointsAward::new(
                    booking.user_id,
                    PointsReason::BookingMade,
                    format!("Booking {booking_id} paid into escrow"),
                ),
            )
            .await?;

        let points_awarded = created.points.as_ref().map_or(0, |tx| tx.points);
        info!(
            payment_id = %created.payment.id,
            amount = created.payment.amount,
            points_awarded,
            "Escrow payment created"
        );

        Ok(PaymentReceipt {
            payment_id: created.payment.id,
            points_awarded,
            payment: created.payment,
        })
    }

    /// Releases the escrow when `service_completed` is true. A false answer
    /// changes nothing and reports the payment's current release state.
    ///
    /// # Errors
    ///
    /// - `NotFound` - no such booking or no payment
    /// - `Forbidden` - caller does not own the booking
    /// - `Conflict` - already released, or the booking was cancelled
    #[instrument(
        skip_all,
        fields(
            user_id = %principal.user_id,
            booking_id = %booking_id,
            service_completed = service_completed
        )
    )]
    pub async fn confirm_completion(
        store: &dyn Store,
        principal: &Principal,
        booking_id: Uuid,
        service_completed: bool,
    ) -> AppResult<CompletionOutcome> {
        require_role(principal, Role::User)?;

        let booking = fetch_booking(store, booking_id).await?;
        ensure_booking_owner(principal, &booking)?;

        if !service_completed {
            let payment = store
                .fetch_escrow_payment(booking_id)
                .await?
                .ok_or(AppError::NotFound("Payment not found"))?;
            // An earlier release stands; report it rather than hide it.
            let released = payment.status == PaymentStatus::Released;
            let payout = if released {
                store.fetch_payouts(booking_id).await?.into_iter().next()
            } else {
                None
            };
            debug!(released, "Service not confirmed, escrow left unchanged");
            return Ok(CompletionOutcome {
                released,
                payment,
                payout,
            });
        }

        let settlement = store
            .release_escrow_payment(booking_id, OffsetDateTime::now_utc())
            .await?;

        info!(
            payout_id = %settlement.payout.id,
            merchant_id = %settlement.payout.merchant_id,
            amount = settlement.payout.amount,
            "Escrow released to merchant payout"
        );

        Ok(CompletionOutcome {
            released: true,
            payment: settlement.payment,
            payout: Some(settlement.payout),
        })
    }

    /// Owner-only view of the booking's payment and its payouts.
    #[instrument(skip_all, fields(user_id = %principal.user_id, booking_id = %booking_id))]
    pub async fn get_payment(
        store: &dyn Store,
        principal: &Principal,
        booking_id: Uuid,
    ) -> AppResult<PaymentDetail> {
        let booking = fetch_booking(store, booking_id).await?;
        ensure_booking_owner(principal, &booking)?;

        let payment = store
            .fetch_escrow_payment(booking_id)
            .await?
            .ok_or(AppError::NotFound("Payment not found"))?;
        let payouts = store.fetch_payouts(booking_id).await?;

        Ok(PaymentDetail { payment, payouts })
    }
}
