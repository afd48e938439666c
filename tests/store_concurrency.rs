use std::sync::Arc;

use glowtrust::error::AppError;
use glowtrust::models::{
    Booking, NewBooking, NewEscrowPayment, NewMerchant, NewServiceListing, PointsAward,
    PointsReason, ServiceCategory,
};
use glowtrust::store::{MemoryStore, Store};
use time::OffsetDateTime;
use uuid::Uuid;

async fn seed_booking(store: &MemoryStore) -> Booking {
    let merchant = store
        .insert_merchant(NewMerchant {
            owner_user_id: Uuid::new_v4(),
            name: "Concurrent Studio".to_string(),
            trust_score: 50.0,
        })
        .await
        .unwrap();
    let service = store
        .insert_service(NewServiceListing {
            merchant_id: merchant.id,
            title: "Cut & Colour".to_string(),
            description: String::new(),
            price: 12_000,
            duration_minutes: 90,
            category: ServiceCategory::Beauty,
            is_active: true,
            tags: Vec::new(),
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

fn new_payment(booking: &Booking) -> NewEscrowPayment {
    NewEscrowPayment {
        booking_id: booking.id,
        amount: booking.total_amount,
        currency: "USD".to_string(),
        payment_method: "card".to_string(),
    }
}

fn booking_award(booking: &Booking) -> PointsAward {
    PointsAward::new(booking.user_id, PointsReason::BookingMade, "Booking paid")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_releases_produce_one_payout() {
    let store = Arc::new(MemoryStore::new());
    let booking = seed_booking(&store).await;
    store
        .create_escrow_payment(new_payment(&booking), booking_award(&booking))
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let booking_id = booking.id;
            tokio::spawn(async move {
                store
                    .release_escrow_payment(booking_id, OffsetDateTime::now_utc())
                    .await
            })
        })
        .collect();

    let mut released = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => released += 1,
            Err(AppError::Conflict(msg)) => {
                assert_eq!(msg, "Payment already processed");
                conflicts += 1;
            }
            Err(e) => panic!("Unexpected error: {e}"),
        }
    }

    assert_eq!(released, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.fetch_payouts(booking.id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_payments_create_one_escrow() {
    let store = Arc::new(MemoryStore::new());
    let booking = seed_booking(&store).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let payment = new_payment(&booking);
            let award = booking_award(&booking);
            tokio::spawn(async move { store.create_escrow_payment(payment, award).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("Unexpected error: {e}"),
        }
    }

    assert_eq!(created, 1);

    // Points follow the single winning payment
    let summary = store.points_summary(booking.user_id).await.unwrap();
    assert_eq!(summary.balance, 20);
    assert_eq!(summary.transactions.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reviews_apply_every_trust_delta_once() {
    let store = Arc::new(MemoryStore::new());
    let merchant = store
        .insert_merchant(NewMerchant {
            owner_user_id: Uuid::new_v4(),
            name: "Busy Salon".to_string(),
            trust_score: 50.0,
        })
        .await
        .unwrap();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let store = Arc::clone(&store);
            let merchant_id = merchant.id;
            tokio::spawn(async move {
                let user_id = Uuid::new_v4();
                store
                    .submit_feedback(glowtrust::models::FeedbackSubmission {
                        booking_id: Uuid::new_v4(),
                        user_id,
                        merchant_id,
                        rating: 4,
                        comment: None,
                        hard_sell_reported: false,
                        hard_sell_note: None,
                        trust_delta: 2.0,
                        award: PointsAward::new(user_id, PointsReason::ReviewSubmitted, "Review"),
                    })
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // No lost updates: 50 + 5 * 2
    assert_eq!(store.merchant_trust_score(merchant.id).await.unwrap(), Some(60.0));
}
