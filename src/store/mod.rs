//! # Persistence
//!
//! The [`Store`] trait is the engine's only view of durable state. Each method
//! is one atomic unit: every "read, check, write" sequence it performs is
//! isolated from concurrent calls touching the same rows, and multi-row
//! effects (payment + points, release + payout + status) commit together or
//! not at all.
//!
//! ## Implementations
//!
//! - [`PgStore`] - PostgreSQL via `sqlx`, relying on row locks, conditional
//!   updates and unique constraints
//! - [`MemoryStore`] - In-process tables behind one async mutex, for development
//!   and tests

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Booking, BookingStatus, CatalogEntry, EscrowPayment, FeedbackOutcome, FeedbackSubmission,
    HardSellReport, Merchant, NewBooking, NewEscrowPayment, NewMerchant, NewServiceListing,
    Payout, PointsAward, PointsSummary, PointsTransaction, ServiceListing, Settlement,
    UserPreference,
};

/// Result of creating an escrow payment: the payment and the points granted
/// alongside it.
#[derive(Debug, Clone)]
pub struct PaymentCreated {
    pub payment: EscrowPayment,
    pub points: Option<PointsTransaction>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // --- catalog ---

    async fn insert_merchant(&self, merchant: NewMerchant) -> AppResult<Merchant>;

    async fn fetch_merchant(&self, merchant_id: Uuid) -> AppResult<Option<Merchant>>;

    async fn insert_service(&self, service: NewServiceListing) -> AppResult<ServiceListing>;

    async fn fetch_service(&self, service_id: Uuid) -> AppResult<Option<ServiceListing>>;

    /// Active services joined with their merchant's current trust score.
    async fn fetch_active_catalog(&self) -> AppResult<Vec<CatalogEntry>>;

    // --- preferences ---

    /// Inserts or overwrites the user's preference record.
    async fn upsert_preference(&self, preference: &UserPreference) -> AppResult<()>;

    async fn fetch_preference(&self, user_id: Uuid) -> AppResult<Option<UserPreference>>;

    // --- bookings ---

    async fn insert_booking(&self, booking: NewBooking) -> AppResult<Booking>;

    async fn fetch_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>>;

    /// Moves the booking to `to` only if its current status is one of `from`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`](crate::error::AppError::NotFound) - no such booking
    /// - [`AppError::Conflict`](crate::error::AppError::Conflict) - status not in `from`
    async fn transition_booking(
        &self,
        booking_id: Uuid,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Booking>;

    // --- escrow ---

    /// Creates the booking's single escrow payment, copies amount and currency
    /// onto the booking, and grants `award`.
    ///
    /// # Errors
    ///
    /// - `NotFound` - the booking does not exist
    /// - `Conflict` - a payment already exists, or the booking is terminal
    async fn create_escrow_payment(
        &self,
        payment: NewEscrowPayment,
        award: PointsAward,
    ) -> AppResult<PaymentCreated>;

    async fn fetch_escrow_payment(&self, booking_id: Uuid) -> AppResult<Option<EscrowPayment>>;

    /// Releases the pending payment, creates its payout and completes the
    /// booking, all in one transaction.
    ///
    /// # Errors
    ///
    /// - `NotFound` - no payment exists for the booking
    /// - `Conflict` - the payment was already released or the booking was cancelled
    async fn release_escrow_payment(
        &self,
        booking_id: Uuid,
        released_at: OffsetDateTime,
    ) -> AppResult<Settlement>;

    async fn fetch_payouts(&self, booking_id: Uuid) -> AppResult<Vec<Payout>>;

    // --- feedback & trust ---

    /// Records the review, applies the trust delta as a relative increment,
    /// files the hard-sell report if present and grants the review points.
    ///
    /// # Errors
    ///
    /// - `Conflict` - the booking already has feedback
    async fn submit_feedback(&self, submission: FeedbackSubmission) -> AppResult<FeedbackOutcome>;

    async fn fetch_hard_sell_reports(&self, merchant_id: Uuid) -> AppResult<Vec<HardSellReport>>;

    async fn merchant_trust_score(&self, merchant_id: Uuid) -> AppResult<Option<f64>>;

    // --- points ---

    /// Appends a ledger entry and increments the balance. Returns `None` when a
    /// one-time reason was already granted to the user.
    async fn award_points(&self, award: PointsAward) -> AppResult<Option<PointsTransaction>>;

    async fn points_summary(&self, user_id: Uuid) -> AppResult<PointsSummary>;
}

/// Clamps an adjusted trust score into the allowed range.
pub(crate) fn clamp_trust(score: f64) -> f64 {
    use crate::utils::constant::{TRUST_SCORE_CEILING, TRUST_SCORE_FLOOR};
    score.clamp(TRUST_SCORE_FLOOR, TRUST_SCORE_CEILING)
}
