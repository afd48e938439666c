//! Store guarantees checked against a real PostgreSQL database.
//!
//! Each test gets a fresh migrated database from `#[sqlx::test]`, so
//! `DATABASE_URL` must point at a server the test user may create databases on.

use glowtrust::error::AppError;
use glowtrust::models::{
    Booking, FeedbackSubmission, NewBooking, NewEscrowPayment, NewMerchant, NewServiceListing,
    PaymentStatus, PointsAward, PointsReason, Principal, Role, ServiceCategory,
};
use glowtrust::services::trust::{ReviewInput, TrustService};
use glowtrust::store::{PgStore, Store};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

async fn seed_booking(store: &PgStore, trust_score: f64) -> Booking {
    let merchant = store
        .insert_merchant(NewMerchant {
            owner_user_id: Uuid::new_v4(),
            name: "Harbour Street Spa".to_string(),
            trust_score,
        })
        .await
        .unwrap();
    let service = store
        .insert_service(NewServiceListing {
            merchant_id: merchant.id,
            title: "Deep Tissue Massage".to_string(),
            description: "Sixty minutes, focused on back and shoulders".to_string(),
            price: 9_500,
            duration_minutes: 60,
            category: ServiceCategory::Wellness,
            is_active: true,
            tags: vec!["relaxation".to_string()],
        })
        .await
        .unwrap();
    store
        .insert_booking(NewBooking {
            user_id: Uuid::new_v4(),
            service_id: service.id,
            merchant_id: merchant.id,
            total_amount: service.price,
            currency: "USD".to_string(),
        })
        .await
        .unwrap()
}

async fn pay(store: &PgStore, booking: &Booking) {
    store
        .create_escrow_payment(
            NewEscrowPayment {
                booking_id: booking.id,
                amount: booking.total_amount,
                currency: "USD".to_string(),
                payment_method: "card".to_string(),
            },
            PointsAward::new(booking.user_id, PointsReason::BookingMade, "Booking paid"),
        )
        .await
        .unwrap();
}

fn submission(booking: &Booking, rating: i16, trust_delta: f64) -> FeedbackSubmission {
    FeedbackSubmission {
        booking_id: booking.id,
        user_id: booking.user_id,
        merchant_id: booking.merchant_id,
        rating,
        comment: None,
        hard_sell_reported: false,
        hard_sell_note: None,
        trust_delta,
        award: PointsAward::new(booking.user_id, PointsReason::ReviewSubmitted, "Review"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_releases_produce_one_payout(pool: PgPool) {
    let store = PgStore::new(pool);
    let booking = seed_booking(&store, 80.0).await;
    pay(&store, &booking).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let booking_id = booking.id;
            tokio::spawn(async move {
                store
                    .release_escrow_payment(booking_id, OffsetDateTime::now_utc())
                    .await
            })
        })
        .collect();

    let mut released = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(settlement) => {
                released += 1;
                assert_eq!(settlement.payout.amount, 9_500);
                assert_eq!(settlement.booking.status.to_string(), "completed");
            }
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Payment already processed"),
            Err(e) => panic!("Unexpected error: {e}"),
        }
    }
    assert_eq!(released, 1);

    let payouts = store.fetch_payouts(booking.id).await.unwrap();
    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].merchant_id, booking.merchant_id);

    let payment = store.fetch_escrow_payment(booking.id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Released);
    assert!(payment.released_at.is_some());

    // Sequential retry after the fact is rejected the same way
    let again = store
        .release_escrow_payment(booking.id, OffsetDateTime::now_utc())
        .await;
    assert!(matches!(again, Err(AppError::Conflict("Payment already processed"))));
}

#[sqlx::test(migrations = "./migrations")]
async fn second_payment_conflicts_and_earns_nothing(pool: PgPool) {
    let store = PgStore::new(pool);
    let booking = seed_booking(&store, 80.0).await;
    pay(&store, &booking).await;

    let second = store
        .create_escrow_payment(
            NewEscrowPayment {
                booking_id: booking.id,
                amount: 1_000,
                currency: "EUR".to_string(),
                payment_method: "wallet".to_string(),
            },
            PointsAward::new(booking.user_id, PointsReason::BookingMade, "Booking paid"),
        )
        .await;
    assert!(matches!(
        second,
        Err(AppError::Conflict("Payment already exists for this booking"))
    ));

    let payment = store.fetch_escrow_payment(booking.id).await.unwrap().unwrap();
    assert_eq!(payment.amount, 9_500);
    assert_eq!(payment.currency, "USD");

    let summary = store.points_summary(booking.user_id).await.unwrap();
    assert_eq!(summary.balance, 20);
    assert_eq!(summary.transactions.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_feedback_conflicts_without_moving_trust(pool: PgPool) {
    let store = PgStore::new(pool);
    let booking = seed_booking(&store, 80.0).await;

    let outcome = store.submit_feedback(submission(&booking, 4, 2.0)).await.unwrap();
    assert_eq!(outcome.previous_trust_score, 80.0);
    assert_eq!(outcome.trust_score, 82.0);
    assert_eq!(outcome.points_awarded, 10);

    let second = store.submit_feedback(submission(&booking, 5, 5.0)).await;
    assert!(matches!(second, Err(AppError::Conflict("Booking already reviewed"))));

    assert_eq!(
        store.merchant_trust_score(booking.merchant_id).await.unwrap(),
        Some(82.0)
    );
    let summary = store.points_summary(booking.user_id).await.unwrap();
    assert_eq!(summary.balance, 10);
}

#[sqlx::test(migrations = "./migrations")]
async fn trust_increment_is_clamped_to_range(pool: PgPool) {
    let store = PgStore::new(pool);
    let high = seed_booking(&store, 98.0).await;
    let low = seed_booking(&store, 5.0).await;

    let outcome = store.submit_feedback(submission(&high, 5, 5.0)).await.unwrap();
    assert_eq!(outcome.previous_trust_score, 98.0);
    assert_eq!(outcome.trust_score, 100.0);

    let outcome = store.submit_feedback(submission(&low, 1, -12.0)).await.unwrap();
    assert_eq!(outcome.previous_trust_score, 5.0);
    assert_eq!(outcome.trust_score, 0.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn quiz_bonus_is_granted_once(pool: PgPool) {
    let store = PgStore::new(pool);
    let user_id = Uuid::new_v4();

    let first = store
        .award_points(PointsAward::new(user_id, PointsReason::QuizCompleted, "Quiz"))
        .await
        .unwrap();
    assert_eq!(first.map(|transaction| transaction.points), Some(50));

    let second = store
        .award_points(PointsAward::new(user_id, PointsReason::QuizCompleted, "Quiz again"))
        .await
        .unwrap();
    assert!(second.is_none());

    // Repeatable reasons keep accruing
    for _ in 0..2 {
        store
            .award_points(PointsAward::new(user_id, PointsReason::AiInteraction, "Chat"))
            .await
            .unwrap();
    }

    let summary = store.points_summary(user_id).await.unwrap();
    assert_eq!(summary.balance, 60);
    assert_eq!(summary.transactions.len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn hard_sell_review_costs_twelve_and_files_one_report(pool: PgPool) {
    let store = PgStore::new(pool);
    let booking = seed_booking(&store, 80.0).await;
    pay(&store, &booking).await;
    store
        .release_escrow_payment(booking.id, OffsetDateTime::now_utc())
        .await
        .unwrap();

    let principal = Principal {
        user_id: booking.user_id,
        email: "client@example.com".to_string(),
        role: Role::User,
    };
    let outcome = TrustService::submit_review(
        &store,
        &principal,
        booking.id,
        ReviewInput {
            rating: 1,
            comment: Some("Spent the session selling oils".to_string()),
            hard_sell_reported: true,
            hard_sell_note: Some("Pressured into a $150 aromatherapy kit".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.trust_delta, -12.0);
    assert_eq!(outcome.trust_score, 68.0);
    assert!(outcome.hard_sell_report_filed);
    assert_eq!(outcome.points_awarded, 10);

    let reports = store.fetch_hard_sell_reports(booking.merchant_id).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].booking_id, booking.id);
    assert_eq!(reports[0].note, "Pressured into a $150 aromatherapy kit");

    assert_eq!(
        store.merchant_trust_score(booking.merchant_id).await.unwrap(),
        Some(68.0)
    );
}
