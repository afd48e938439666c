//! # Booking, Escrow and Payout Records
//!
//! A booking owns at most one [`EscrowPayment`]. Releasing that payment
//! produces exactly one [`Payout`] for the merchant and completes the booking.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Booking lifecycle.
///
/// # Status Flow
///
/// - `Pending` - Created by the user, awaiting merchant confirmation
/// - `Confirmed` - Accepted by the merchant
/// - `Completed` - The user confirmed delivery and escrow was released (terminal)
/// - `Cancelled` - Cancelled before completion (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status_str = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        };
        write!(f, "{status_str}")
    }
}

impl BookingStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Statuses from which a booking may still be cancelled.
    pub const CANCELLABLE: &'static [BookingStatus] =
        &[BookingStatus::Pending, BookingStatus::Confirmed];
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub merchant_id: Uuid,
    pub status: BookingStatus,
    pub total_amount: i64,
    pub currency: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub merchant_id: Uuid,
    pub total_amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Released,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EscrowPayment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub status: PaymentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub released_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewEscrowPayment {
    pub booking_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payout_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Settled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payout {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub booking_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: PayoutStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Everything written by a successful escrow release.
#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub payment: EscrowPayment,
    pub payout: Payout,
    pub booking: Booking,
}
