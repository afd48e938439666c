use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{PaymentCreated, Store};
use crate::error::{AppError, AppResult};
use crate::models::{
    Availability, Booking, BookingStatus, BudgetBand, CatalogEntry, DayOfWeek, EscrowPayment,
    Feedback, FeedbackOutcome, FeedbackSubmission, HardSellReport, Merchant, NewBooking,
    NewEscrowPayment, NewMerchant, NewServiceListing, PaymentStatus, Payout, PayoutStatus,
    PointsAward, PointsSummary, PointsTransaction, ServiceListing, Settlement, TimeOfDay,
    UserPreference,
};
use crate::utils::constant::{TRUST_SCORE_CEILING, TRUST_SCORE_FLOOR};

const BOOKING_COLUMNS: &str =
    "id, user_id, service_id, merchant_id, status, total_amount, currency, created_at, updated_at";
const PAYMENT_COLUMNS: &str =
    "id, booking_id, amount, currency, payment_method, status, created_at, released_at";
const SERVICE_COLUMNS: &str =
    "id, merchant_id, title, description, price, duration_minutes, category, is_active, tags";

/// PostgreSQL-backed [`Store`].
///
/// Schema lives in `migrations/`. Uniqueness of payments, payouts and feedback
/// per booking is enforced by unique constraints; escrow release locks the
/// booking row and flips the payment with a conditional update.
#[derive(Clone)]
pub struct PgStore {
    db_pool: PgPool,
}

impl PgStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await
    }
}

/// Maps a unique-constraint violation to [`AppError::Conflict`].
fn conflict_on_unique(e: sqlx::Error, message: &'static str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            debug!(constraint = ?db_err.constraint(), "Unique constraint rejected write");
            AppError::Conflict(message)
        }
        _ => AppError::Db(e),
    }
}

/// Appends a points transaction and bumps the balance inside an open
/// transaction. The user row lock serializes one-time checks per user.
async fn award_in_tx(
    conn: &mut PgConnection,
    award: &PointsAward,
) -> Result<Option<PointsTransaction>, sqlx::Error> {
    sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
        .bind(award.user_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(award.user_id)
        .execute(&mut *conn)
        .await?;

    if award.reason.is_one_time() {
        let already_granted: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM points_transactions WHERE user_id = $1 AND reason = $2)",
        )
        .bind(award.user_id)
        .bind(award.reason)
        .fetch_one(&mut *conn)
        .await?;

        if already_granted {
            debug!(user_id = %award.user_id, reason = ?award.reason, "One-time points already granted");
            return Ok(None);
        }
    }

    let transaction = sqlx::query_as::<_, PointsTransaction>(
        r#"
        INSERT INTO points_transactions (id, user_id, points, reason, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, points, reason, description, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(award.user_id)
    .bind(award.points())
    .bind(award.reason)
    .bind(&award.description)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query("UPDATE users SET points_balance = points_balance + $1 WHERE id = $2")
        .bind(transaction.points)
        .bind(award.user_id)
        .execute(&mut *conn)
        .await?;

    Ok(Some(transaction))
}

async fn lock_booking(conn: &mut PgConnection, booking_id: Uuid) -> AppResult<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(booking_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::NotFound("Booking not found"))
}

#[derive(FromRow)]
struct PreferenceRow {
    user_id: Uuid,
    service_type: Option<String>,
    hair_concerns: Vec<String>,
    facial_concerns: Vec<String>,
    style_preference: Option<String>,
    budget_min: i64,
    budget_max: Option<i64>,
    budget_preferred: i64,
    visit_frequency: Option<String>,
    lifestyle: Option<String>,
    available_times: Vec<String>,
    available_days: Vec<String>,
    updated_at: OffsetDateTime,
}

impl From<PreferenceRow> for UserPreference {
    fn from(row: PreferenceRow) -> Self {
        UserPreference {
            user_id: row.user_id,
            service_type: row.service_type,
            hair_concerns: row.hair_concerns,
            facial_concerns: row.facial_concerns,
            style_preference: row.style_preference,
            budget: BudgetBand::new(row.budget_min, row.budget_max, row.budget_preferred),
            visit_frequency: row.visit_frequency,
            lifestyle: row.lifestyle,
            availability: Availability {
                times: row
                    .available_times
                    .iter()
                    .filter_map(|t| TimeOfDay::parse(t))
                    .collect(),
                days: row
                    .available_days
                    .iter()
                    .filter_map(|d| DayOfWeek::parse(d))
                    .collect(),
            },
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_merchant(&self, merchant: NewMerchant) -> AppResult<Merchant> {
        let merchant = sqlx::query_as::<_, Merchant>(
            r#"
            INSERT INTO merchants (id, owner_user_id, name, trust_score)
            VALUES ($1, $2, $3, LEAST(GREATEST($4, $5), $6))
            RETURNING id, owner_user_id, name, trust_score, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(merchant.owner_user_id)
        .bind(&merchant.name)
        .bind(merchant.trust_score)
        .bind(TRUST_SCORE_FLOOR)
        .bind(TRUST_SCORE_CEILING)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(merchant)
    }

    async fn fetch_merchant(&self, merchant_id: Uuid) -> AppResult<Option<Merchant>> {
        let merchant = sqlx::query_as::<_, Merchant>(
            "SELECT id, owner_user_id, name, trust_score, created_at FROM merchants WHERE id = $1",
        )
        .bind(merchant_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(merchant)
    }

    async fn insert_service(&self, service: NewServiceListing) -> AppResult<ServiceListing> {
        let result = sqlx::query_as::<_, ServiceListing>(&format!(
            r#"
            INSERT INTO services (id, merchant_id, title, description, price,
                                  duration_minutes, category, is_active, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SERVICE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(service.merchant_id)
        .bind(&service.title)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(service.category)
        .bind(service.is_active)
        .bind(&service.tags)
        .fetch_one(&self.db_pool)
        .await;

        match result {
            Ok(service) => Ok(service),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(AppError::NotFound("Merchant not found"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_service(&self, service_id: Uuid) -> AppResult<Option<ServiceListing>> {
        let service = sqlx::query_as::<_, ServiceListing>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(service_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(service)
    }

    async fn fetch_active_catalog(&self) -> AppResult<Vec<CatalogEntry>> {
        let catalog = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT s.id, s.merchant_id, s.title, s.description, s.price, s.duration_minutes,
                   s.category, s.is_active, s.tags, m.trust_score AS merchant_trust_score
            FROM services s
            JOIN merchants m ON m.id = s.merchant_id
            WHERE s.is_active
            "#,
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(catalog)
    }

    async fn upsert_preference(&self, preference: &UserPreference) -> AppResult<()> {
        let times: Vec<&str> = preference
            .availability
            .times
            .iter()
            .map(TimeOfDay::as_str)
            .collect();
        let days: Vec<&str> = preference
            .availability
            .days
            .iter()
            .map(DayOfWeek::as_str)
            .collect();

        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, service_type, hair_concerns, facial_concerns,
                                          style_preference, budget_min, budget_max, budget_preferred,
                                          visit_frequency, lifestyle, available_times, available_days,
                                          updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (user_id)
            DO UPDATE SET
                service_type = EXCLUDED.service_type,
                hair_concerns = EXCLUDED.hair_concerns,
                facial_concerns = EXCLUDED.facial_concerns,
                style_preference = EXCLUDED.style_preference,
                budget_min = EXCLUDED.budget_min,
                budget_max = EXCLUDED.budget_max,
                budget_preferred = EXCLUDED.budget_preferred,
                visit_frequency = EXCLUDED.visit_frequency,
                lifestyle = EXCLUDED.lifestyle,
                available_times = EXCLUDED.available_times,
                available_days = EXCLUDED.available_days,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(preference.user_id)
        .bind(&preference.service_type)
        .bind(&preference.hair_concerns)
        .bind(&preference.facial_concerns)
        .bind(&preference.style_preference)
        .bind(preference.budget.min)
        .bind(preference.budget.max)
        .bind(preference.budget.preferred)
        .bind(&preference.visit_frequency)
        .bind(&preference.lifestyle)
        .bind(&times)
        .bind(&days)
        .bind(preference.updated_at)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn fetch_preference(&self, user_id: Uuid) -> AppResult<Option<UserPreference>> {
        let row = sqlx::query_as::<_, PreferenceRow>(
            r#"
            SELECT user_id, service_type, hair_concerns, facial_concerns, style_preference,
                   budget_min, budget_max, budget_preferred, visit_frequency, lifestyle,
                   available_times, available_days, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(UserPreference::from))
    }

    async fn insert_booking(&self, booking: NewBooking) -> AppResult<Booking> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (id, user_id, service_id, merchant_id, status, total_amount, currency)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(booking.user_id)
        .bind(booking.service_id)
        .bind(booking.merchant_id)
        .bind(BookingStatus::Pending)
        .bind(booking.total_amount)
        .bind(&booking.currency)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(booking)
    }

    async fn fetch_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(booking)
    }

    #[instrument(skip(self, from))]
    async fn transition_booking(
        &self,
        booking_id: Uuid,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Booking> {
        let mut tx = self.db_pool.begin().await?;

        let current = lock_booking(&mut tx, booking_id).await?;
        if !from.contains(&current.status) {
            debug!(current = %current.status, "Booking transition rejected");
            return Err(AppError::Conflict("Booking status does not allow this action"));
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = $2, updated_at = now() WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(to)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    #[instrument(skip_all, fields(booking_id = %payment.booking_id))]
    async fn create_escrow_payment(
        &self,
        payment: NewEscrowPayment,
        award: PointsAward,
    ) -> AppResult<PaymentCreated> {
        let mut tx = self.db_pool.begin().await?;

        let booking = lock_booking(&mut tx, payment.booking_id).await?;
        if booking.status.is_terminal() {
            return Err(AppError::Conflict("Booking is no longer open for payment"));
        }

        let created = sqlx::query_as::<_, EscrowPayment>(&format!(
            r#"
            INSERT INTO escrow_payments (id, booking_id, amount, currency, payment_method, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(payment.booking_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.payment_method)
        .bind(PaymentStatus::Pending)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Payment already exists for this booking"))?;

        sqlx::query(
            "UPDATE bookings SET total_amount = $1, currency = $2, updated_at = now() WHERE id = $3",
        )
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.booking_id)
        .execute(&mut *tx)
        .await?;

        let points = award_in_tx(&mut tx, &award).await?;

        tx.commit().await?;
        Ok(PaymentCreated {
            payment: created,
            points,
        })
    }

    async fn fetch_escrow_payment(&self, booking_id: Uuid) -> AppResult<Option<EscrowPayment>> {
        let payment = sqlx::query_as::<_, EscrowPayment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM escrow_payments WHERE booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(payment)
    }

    #[instrument(skip(self))]
    async fn release_escrow_payment(
        &self,
        booking_id: Uuid,
        released_at: OffsetDateTime,
    ) -> AppResult<Settlement> {
        // Locking the booking first serializes concurrent releases: the second
        // caller only proceeds after the first commits and then sees `released`.
        let mut tx = self.db_pool.begin().await?;
        let booking = lock_booking(&mut tx, booking_id).await?;

        let payment_status: Option<PaymentStatus> = sqlx::query_scalar(
            "SELECT status FROM escrow_payments WHERE booking_id = $1 FOR UPDATE",
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?;

        match payment_status {
            None => return Err(AppError::NotFound("Payment not found")),
            Some(PaymentStatus::Released) => {
                return Err(AppError::Conflict("Payment already processed"));
            }
            Some(PaymentStatus::Pending) => {}
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(AppError::Conflict("Booking has been cancelled"));
        }

        let payment = sqlx::query_as::<_, EscrowPayment>(&format!(
            r#"
            UPDATE escrow_payments SET status = 'released', released_at = $2
            WHERE booking_id = $1 AND status = 'pending'
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(released_at)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            warn!("Payment changed state while locked");
            AppError::Conflict("Payment already processed")
        })?;

        let payout = sqlx::query_as::<_, Payout>(
            r#"
            INSERT INTO payouts (id, merchant_id, booking_id, amount, currency, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, merchant_id, booking_id, amount, currency, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.merchant_id)
        .bind(booking_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(PayoutStatus::Pending)
        .bind(released_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Payment already processed"))?;

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(BookingStatus::Completed)
        .bind(released_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Settlement {
            payment,
            payout,
            booking,
        })
    }

    async fn fetch_payouts(&self, booking_id: Uuid) -> AppResult<Vec<Payout>> {
        let payouts = sqlx::query_as::<_, Payout>(
            r#"
            SELECT id, merchant_id, booking_id, amount, currency, status, created_at
            FROM payouts
            WHERE booking_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(payouts)
    }

    #[instrument(skip_all, fields(booking_id = %submission.booking_id))]
    async fn submit_feedback(&self, submission: FeedbackSubmission) -> AppResult<FeedbackOutcome> {
        let mut tx = self.db_pool.begin().await?;

        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (id, booking_id, user_id, merchant_id, rating, comment, hard_sell_reported)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, booking_id, user_id, merchant_id, rating, comment, hard_sell_reported, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(submission.booking_id)
        .bind(submission.user_id)
        .bind(submission.merchant_id)
        .bind(submission.rating)
        .bind(&submission.comment)
        .bind(submission.hard_sell_reported)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Booking already reviewed"))?;

        // The row lock serializes concurrent reviews of the same merchant, so
        // the score read here is the one the increment applies to.
        let previous_trust_score: f64 = sqlx::query_scalar(
            "SELECT trust_score FROM merchants WHERE id = $1 FOR UPDATE",
        )
        .bind(submission.merchant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Merchant not found"))?;

        let trust_score: f64 = sqlx::query_scalar(
            r#"
            UPDATE merchants
            SET trust_score = LEAST(GREATEST(trust_score + $1, $2), $3)
            WHERE id = $4
            RETURNING trust_score
            "#,
        )
        .bind(submission.trust_delta)
        .bind(TRUST_SCORE_FLOOR)
        .bind(TRUST_SCORE_CEILING)
        .bind(submission.merchant_id)
        .fetch_one(&mut *tx)
        .await?;

        let hard_sell_report = match &submission.hard_sell_note {
            Some(note) => Some(
                sqlx::query_as::<_, HardSellReport>(
                    r#"
                    INSERT INTO hard_sell_reports (id, user_id, merchant_id, booking_id, note)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, user_id, merchant_id, booking_id, note, created_at
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(submission.user_id)
                .bind(submission.merchant_id)
                .bind(submission.booking_id)
                .bind(note)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        let points_awarded = award_in_tx(&mut tx, &submission.award)
            .await?
            .map_or(0, |transaction| transaction.points);

        tx.commit().await?;
        Ok(FeedbackOutcome {
            feedback,
            hard_sell_report,
            previous_trust_score,
            trust_score,
            points_awarded,
        })
    }

    async fn fetch_hard_sell_reports(&self, merchant_id: Uuid) -> AppResult<Vec<HardSellReport>> {
        let reports = sqlx::query_as::<_, HardSellReport>(
            r#"
            SELECT id, user_id, merchant_id, booking_id, note, created_at
            FROM hard_sell_reports
            WHERE merchant_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(merchant_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(reports)
    }

    async fn merchant_trust_score(&self, merchant_id: Uuid) -> AppResult<Option<f64>> {
        let score = sqlx::query_scalar("SELECT trust_score FROM merchants WHERE id = $1")
            .bind(merchant_id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(score)
    }

    async fn award_points(&self, award: PointsAward) -> AppResult<Option<PointsTransaction>> {
        let mut tx = self.db_pool.begin().await?;
        let transaction = award_in_tx(&mut tx, &award).await.map_err(|e| {
            conflict_on_unique(e, "One-time points already granted")
        })?;
        tx.commit().await?;
        Ok(transaction)
    }

    async fn points_summary(&self, user_id: Uuid) -> AppResult<PointsSummary> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT points_balance FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.db_pool)
                .await?;

        let transactions = sqlx::query_as::<_, PointsTransaction>(
            r#"
            SELECT id, user_id, points, reason, description, created_at
            FROM points_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(PointsSummary {
            balance: balance.unwrap_or(0),
            transactions,
        })
    }
}
