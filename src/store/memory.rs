use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{PaymentCreated, Store, clamp_trust};
use crate::error::{AppError, AppResult};
use crate::models::{
    Booking, BookingStatus, CatalogEntry, EscrowPayment, Feedback, FeedbackOutcome,
    FeedbackSubmission, HardSellReport, Merchant, NewBooking, NewEscrowPayment, NewMerchant,
    NewServiceListing, PaymentStatus, Payout, PayoutStatus, PointsAward, PointsSummary,
    PointsTransaction, ServiceListing, Settlement, UserPreference,
};

#[derive(Default)]
struct Tables {
    balances: HashMap<Uuid, i64>,
    merchants: HashMap<Uuid, Merchant>,
    services: HashMap<Uuid, ServiceListing>,
    preferences: HashMap<Uuid, UserPreference>,
    bookings: HashMap<Uuid, Booking>,
    /// Keyed by booking id: one payment per booking.
    payments: HashMap<Uuid, EscrowPayment>,
    payouts: Vec<Payout>,
    /// Keyed by booking id: one feedback per booking.
    feedback: HashMap<Uuid, Feedback>,
    hard_sell_reports: Vec<HardSellReport>,
    points: Vec<PointsTransaction>,
}

impl Tables {
    fn award(&mut self, award: &PointsAward) -> Option<PointsTransaction> {
        if award.reason.is_one_time()
            && self
                .points
                .iter()
                .any(|tx| tx.user_id == award.user_id && tx.reason == award.reason)
        {
            debug!(user_id = %award.user_id, reason = ?award.reason, "One-time points already granted");
            return None;
        }

        let transaction = PointsTransaction {
            id: Uuid::new_v4(),
            user_id: award.user_id,
            points: award.points(),
            reason: award.reason,
            description: award.description.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        *self.balances.entry(award.user_id).or_insert(0) += transaction.points;
        self.points.push(transaction.clone());
        Some(transaction)
    }
}

/// In-process [`Store`]. Every operation holds the single table lock for its
/// whole duration, which makes each one atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_merchant(&self, merchant: NewMerchant) -> AppResult<Merchant> {
        let merchant = Merchant {
            id: Uuid::new_v4(),
            owner_user_id: merchant.owner_user_id,
            name: merchant.name,
            trust_score: clamp_trust(merchant.trust_score),
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables
            .lock()
            .await
            .merchants
            .insert(merchant.id, merchant.clone());
        Ok(merchant)
    }

    async fn fetch_merchant(&self, merchant_id: Uuid) -> AppResult<Option<Merchant>> {
        Ok(self.tables.lock().await.merchants.get(&merchant_id).cloned())
    }

    async fn insert_service(&self, service: NewServiceListing) -> AppResult<ServiceListing> {
        let mut tables = self.tables.lock().await;
        if !tables.merchants.contains_key(&service.merchant_id) {
            return Err(AppError::NotFound("Merchant not found"));
        }

        let service = ServiceListing {
            id: Uuid::new_v4(),
            merchant_id: service.merchant_id,
            title: service.title,
            description: service.description,
            price: service.price,
            duration_minutes: service.duration_minutes,
            category: service.category,
            is_active: service.is_active,
            tags: service.tags,
        };
        tables.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn fetch_service(&self, service_id: Uuid) -> AppResult<Option<ServiceListing>> {
        Ok(self.tables.lock().await.services.get(&service_id).cloned())
    }

    async fn fetch_active_catalog(&self) -> AppResult<Vec<CatalogEntry>> {
        let tables = self.tables.lock().await;
        let catalog = tables
            .services
            .values()
            .filter(|service| service.is_active)
            .filter_map(|service| {
                let merchant = tables.merchants.get(&service.merchant_id)?;
                Some(CatalogEntry {
                    service: service.clone(),
                    merchant_trust_score: merchant.trust_score,
                })
            })
            .collect();
        Ok(catalog)
    }

    async fn upsert_preference(&self, preference: &UserPreference) -> AppResult<()> {
        self.tables
            .lock()
            .await
            .preferences
            .insert(preference.user_id, preference.clone());
        Ok(())
    }

    async fn fetch_preference(&self, user_id: Uuid) -> AppResult<Option<UserPreference>> {
        Ok(self.tables.lock().await.preferences.get(&user_id).cloned())
    }

    async fn insert_booking(&self, booking: NewBooking) -> AppResult<Booking> {
        let now = OffsetDateTime::now_utc();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: booking.user_id,
            service_id: booking.service_id,
            merchant_id: booking.merchant_id,
            status: BookingStatus::Pending,
            total_amount: booking.total_amount,
            currency: booking.currency,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .await
            .bookings
            .insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn fetch_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.tables.lock().await.bookings.get(&booking_id).cloned())
    }

    #[instrument(skip(self, from))]
    async fn transition_booking(
        &self,
        booking_id: Uuid,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;
        let booking = tables
            .bookings
            .get_mut(&booking_id)
            .ok_or(AppError::NotFound("Booking not found"))?;

        if !from.contains(&booking.status) {
            debug!(current = %booking.status, "Booking transition rejected");
            return Err(AppError::Conflict("Booking status does not allow this action"));
        }

        booking.status = to;
        booking.updated_at = OffsetDateTime::now_utc();
        Ok(booking.clone())
    }

    async fn create_escrow_payment(
        &self,
        payment: NewEscrowPayment,
        award: PointsAward,
    ) -> AppResult<PaymentCreated> {
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;
        let now = OffsetDateTime::now_utc();

        let booking = tables
            .bookings
            .get_mut(&payment.booking_id)
            .ok_or(AppError::NotFound("Booking not found"))?;
        if booking.status.is_terminal() {
            return Err(AppError::Conflict("Booking is no longer open for payment"));
        }
        if tables.payments.contains_key(&payment.booking_id) {
            return Err(AppError::Conflict("Payment already exists for this booking"));
        }

        booking.total_amount = payment.amount;
        booking.currency = payment.currency.clone();
        booking.updated_at = now;

        let payment = EscrowPayment {
            id: Uuid::new_v4(),
            booking_id: payment.booking_id,
            amount: payment.amount,
            currency: payment.currency,
            payment_method: payment.payment_method,
            status: PaymentStatus::Pending,
            created_at: now,
            released_at: None,
        };
        tables.payments.insert(payment.booking_id, payment.clone());
        let points = tables.award(&award);

        Ok(PaymentCreated { payment, points })
    }

    async fn fetch_escrow_payment(&self, booking_id: Uuid) -> AppResult<Option<EscrowPayment>> {
        Ok(self.tables.lock().await.payments.get(&booking_id).cloned())
    }

    async fn release_escrow_payment(
        &self,
        booking_id: Uuid,
        released_at: OffsetDateTime,
    ) -> AppResult<Settlement> {
        let mut tables = self.tables.lock().await;

        let booking_status = tables
            .bookings
            .get(&booking_id)
            .map(|booking| booking.status)
            .ok_or(AppError::NotFound("Booking not found"))?;
        let payment = tables
            .payments
            .get(&booking_id)
            .ok_or(AppError::NotFound("Payment not found"))?;

        if payment.status == PaymentStatus::Released {
            return Err(AppError::Conflict("Payment already processed"));
        }
        if booking_status == BookingStatus::Cancelled {
            return Err(AppError::Conflict("Booking has been cancelled"));
        }

        let payment = {
            let payment = tables
                .payments
                .get_mut(&booking_id)
                .ok_or(AppError::Internal)?;
            payment.status = PaymentStatus::Released;
            payment.released_at = Some(released_at);
            payment.clone()
        };

        let booking = {
            let booking = tables
                .bookings
                .get_mut(&booking_id)
                .ok_or(AppError::Internal)?;
            booking.status = BookingStatus::Completed;
            booking.updated_at = released_at;
            booking.clone()
        };

        let payout = Payout {
            id: Uuid::new_v4(),
            merchant_id: booking.merchant_id,
            booking_id,
            amount: payment.amount,
            currency: payment.currency.clone(),
            status: PayoutStatus::Pending,
            created_at: released_at,
        };
        tables.payouts.push(payout.clone());

        Ok(Settlement {
            payment,
            payout,
            booking,
        })
    }

    async fn fetch_payouts(&self, booking_id: Uuid) -> AppResult<Vec<Payout>> {
        Ok(self
            .tables
            .lock()
            .await
            .payouts
            .iter()
            .filter(|payout| payout.booking_id == booking_id)
            .cloned()
            .collect())
    }

    async fn submit_feedback(&self, submission: FeedbackSubmission) -> AppResult<FeedbackOutcome> {
        let mut tables = self.tables.lock().await;
        let now = OffsetDateTime::now_utc();

        if tables.feedback.contains_key(&submission.booking_id) {
            return Err(AppError::Conflict("Booking already reviewed"));
        }
        let merchant = tables
            .merchants
            .get_mut(&submission.merchant_id)
            .ok_or(AppError::NotFound("Merchant not found"))?;
        let previous_trust_score = merchant.trust_score;
        merchant.trust_score = clamp_trust(previous_trust_score + submission.trust_delta);
        let trust_score = merchant.trust_score;

        let feedback = Feedback {
            id: Uuid::new_v4(),
            booking_id: submission.booking_id,
            user_id: submission.user_id,
            merchant_id: submission.merchant_id,
            rating: submission.rating,
            comment: submission.comment,
            hard_sell_reported: submission.hard_sell_reported,
            created_at: now,
        };
        tables.feedback.insert(feedback.booking_id, feedback.clone());

        let hard_sell_report = submission.hard_sell_note.map(|note| HardSellReport {
            id: Uuid::new_v4(),
            user_id: submission.user_id,
            merchant_id: submission.merchant_id,
            booking_id: submission.booking_id,
            note,
            created_at: now,
        });
        if let Some(report) = &hard_sell_report {
            tables.hard_sell_reports.push(report.clone());
        }

        let points_awarded = tables
            .award(&submission.award)
            .map_or(0, |transaction| transaction.points);

        Ok(FeedbackOutcome {
            feedback,
            hard_sell_report,
            previous_trust_score,
            trust_score,
            points_awarded,
        })
    }

    async fn fetch_hard_sell_reports(&self, merchant_id: Uuid) -> AppResult<Vec<HardSellReport>> {
        Ok(self
            .tables
            .lock()
            .await
            .hard_sell_reports
            .iter()
            .filter(|report| report.merchant_id == merchant_id)
            .cloned()
            .collect())
    }

    async fn merchant_trust_score(&self, merchant_id: Uuid) -> AppResult<Option<f64>> {
        Ok(self
            .tables
            .lock()
            .await
            .merchants
            .get(&merchant_id)
            .map(|merchant| merchant.trust_score))
    }

    async fn award_points(&self, award: PointsAward) -> AppResult<Option<PointsTransaction>> {
        Ok(self.tables.lock().await.award(&award))
    }

    async fn points_summary(&self, user_id: Uuid) -> AppResult<PointsSummary> {
        let tables = self.tables.lock().await;
        let balance = tables.balances.get(&user_id).copied().unwrap_or(0);
        let transactions = tables
            .points
            .iter()
            .rev()
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .collect();
        Ok(PointsSummary {
            balance,
            transactions,
        })
    }
}
