#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use glowtrust::models::{
    AppState, Merchant, NewMerchant, NewServiceListing, Principal, Role, ServiceCategory,
    ServiceListing, Taxonomy,
};
use glowtrust::services::jwt::JwtService;
use glowtrust::store::{MemoryStore, Store};
use glowtrust::utils::constant::DEFAULT_PREFERRED_BUDGET;
use reqwest::{Client, Response};
use secrecy::SecretSlice;
use serde_json::Value;
use tokio::net::TcpListener;
use uuid::Uuid;

const TEST_JWT_SECRET: &[u8] = b"glowtrust-test-secret";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("glowtrust=debug")
            .with_test_writer()
            .try_init();
    });
}

pub fn test_jwt_service() -> JwtService {
    JwtService::from_secret(&SecretSlice::from(TEST_JWT_SECRET.to_vec()))
}

/// A running app on a random port, plus direct access to its store for
/// seeding and for assertions the HTTP surface does not expose.
pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub jwt_service: JwtService,
    pub client: Client,
}

/// Spawns the application backed by a fresh [`MemoryStore`].
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn spawn_app() -> TestApp {
    init_tracing_once();

    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        Arc::clone(&store) as Arc<dyn Store>,
        test_jwt_service(),
        Taxonomy::builtin(),
        DEFAULT_PREFERRED_BUDGET,
    ));

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, glowtrust::app(state)).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    TestApp {
        address,
        store,
        jwt_service: test_jwt_service(),
        client,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// Signs a token for a fresh principal with the given role.
    pub fn principal(&self, role: Role) -> (Principal, String) {
        let user_id = Uuid::new_v4();
        let principal = Principal {
            user_id,
            email: format!("{user_id}@example.com"),
            role,
        };
        let token = self.token_for(&principal);
        (principal, token)
    }

    pub fn token_for(&self, principal: &Principal) -> String {
        self.jwt_service
            .issue_access_token(principal, Duration::from_secs(3600))
            .expect("Failed to issue test token")
    }

    pub async fn seed_merchant(&self, owner_user_id: Uuid, trust_score: f64) -> Merchant {
        self.store
            .insert_merchant(NewMerchant {
                owner_user_id,
                name: "Test Studio".to_string(),
                trust_score,
            })
            .await
            .expect("Failed to seed merchant")
    }

    pub async fn seed_service(
        &self,
        merchant_id: Uuid,
        title: &str,
        price: i64,
        category: ServiceCategory,
        tags: &[&str],
    ) -> ServiceListing {
        self.store
            .insert_service(NewServiceListing {
                merchant_id,
                title: title.to_string(),
                description: String::new(),
                price,
                duration_minutes: 60,
                category,
                is_active: true,
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
            })
            .await
            .expect("Failed to seed service")
    }

    pub async fn get(&self, path: &str, token: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, token: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a booking through the API and returns its id.
    pub async fn book(&self, token: &str, service_id: Uuid) -> Uuid {
        let response = self
            .post(
                "/api/bookings",
                token,
                &serde_json::json!({ "serviceId": service_id }),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["booking"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("Booking response should carry an id")
    }
}
