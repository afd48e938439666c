mod common;

use glowtrust::models::{NewServiceListing, Role, ServiceCategory};
use glowtrust::store::Store;
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use common::spawn_app;

#[tokio::test]
async fn booking_starts_pending_at_listed_price() {
    let app = spawn_app().await;
    let (user, token) = app.principal(Role::User);
    let merchant = app.seed_merchant(Uuid::new_v4(), 70.0).await;
    let service = app
        .seed_service(merchant.id, "Brow Lamination", 6_500, ServiceCategory::Beauty, &[])
        .await;

    let response = app
        .post(
            "/api/bookings",
            &token,
            &json!({ "serviceId": service.id, "currency": "eur" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["booking"]["status"], "pending");
    assert_eq!(body["booking"]["total_amount"], 6_500);
    assert_eq!(body["booking"]["currency"], "EUR");
    assert_eq!(body["booking"]["user_id"], user.user_id.to_string());
    assert_eq!(body["booking"]["merchant_id"], merchant.id.to_string());
}

#[tokio::test]
async fn merchant_confirms_then_user_cancels() {
    let app = spawn_app().await;
    let (_, user_token) = app.principal(Role::User);
    let (owner, owner_token) = app.principal(Role::Merchant);
    let (_, rival_token) = app.principal(Role::Merchant);

    let merchant = app.seed_merchant(owner.user_id, 70.0).await;
    let service = app
        .seed_service(merchant.id, "Keratin Treatment", 18_000, ServiceCategory::Beauty, &[])
        .await;
    let booking_id = app.book(&user_token, service.id).await;
    let confirm = format!("/api/bookings/{booking_id}/confirm");

    // Users cannot confirm, and neither can other merchants
    let response = app.post(&confirm, &user_token, &json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.post(&confirm, &rival_token, &json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Booking belongs to another merchant");

    let response = app.post(&confirm, &owner_token, &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["booking"]["status"], "confirmed");

    let response = app.post(&confirm, &owner_token, &json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let cancel = format!("/api/bookings/{booking_id}/cancel");
    let response = app.post(&cancel, &user_token, &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["booking"]["status"], "cancelled");

    let response = app.post(&cancel, &user_token, &json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn booking_is_visible_to_user_and_owning_merchant_only() {
    let app = spawn_app().await;
    let (_, user_token) = app.principal(Role::User);
    let (owner, owner_token) = app.principal(Role::Merchant);
    let (_, stranger_token) = app.principal(Role::User);
    let (_, rival_token) = app.principal(Role::Merchant);
    let (_, admin_token) = app.principal(Role::Admin);

    let merchant = app.seed_merchant(owner.user_id, 70.0).await;
    let service = app
        .seed_service(merchant.id, "Scalp Treatment", 7_000, ServiceCategory::Beauty, &[])
        .await;
    let booking_id = app.book(&user_token, service.id).await;
    let path = format!("/api/bookings/{booking_id}");

    for token in [&user_token, &owner_token, &admin_token] {
        assert_eq!(app.get(&path, token).await.status(), StatusCode::OK);
    }
    for token in [&stranger_token, &rival_token] {
        assert_eq!(app.get(&path, token).await.status(), StatusCode::FORBIDDEN);
    }

    let response = app
        .get(&format!("/api/bookings/{}", Uuid::new_v4()), &user_token)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_or_inactive_service_cannot_be_booked() {
    let app = spawn_app().await;
    let (_, token) = app.principal(Role::User);
    let merchant = app.seed_merchant(Uuid::new_v4(), 70.0).await;

    let response = app
        .post("/api/bookings", &token, &json!({ "serviceId": Uuid::new_v4() }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let retired = app
        .store
        .insert_service(NewServiceListing {
            merchant_id: merchant.id,
            title: "Retired Peel".to_string(),
            description: String::new(),
            price: 9_000,
            duration_minutes: 45,
            category: ServiceCategory::Beauty,
            is_active: false,
            tags: Vec::new(),
        })
        .await
        .unwrap();

    let response = app
        .post("/api/bookings", &token, &json!({ "serviceId": retired.id }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Service is not accepting bookings");
}

#[tokio::test]
async fn merchants_cannot_create_bookings() {
    let app = spawn_app().await;
    let (_, token) = app.principal(Role::Merchant);
    let merchant = app.seed_merchant(Uuid::new_v4(), 70.0).await;
    let service = app
        .seed_service(merchant.id, "Pedicure", 4_500, ServiceCategory::Beauty, &[])
        .await;

    let response = app
        .post("/api/bookings", &token, &json!({ "serviceId": service.id }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
