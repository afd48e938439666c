use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "service_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Beauty,
    Wellness,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Merchant {
    pub id: Uuid,
    /// The principal that manages this merchant.
    pub owner_user_id: Uuid,
    pub name: String,
    pub trust_score: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMerchant {
    pub owner_user_id: Uuid,
    pub name: String,
    /// Baseline trust score chosen at onboarding.
    pub trust_score: f64,
}

/// A bookable service. Prices are integer minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceListing {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub duration_minutes: i32,
    pub category: ServiceCategory,
    pub is_active: bool,
    /// Taxonomy tag ids.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServiceListing {
    pub merchant_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub duration_minutes: i32,
    pub category: ServiceCategory,
    pub is_active: bool,
    pub tags: Vec<String>,
}

/// An active service joined with its merchant's current trust score.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CatalogEntry {
    #[sqlx(flatten)]
    pub service: ServiceListing,
    pub merchant_trust_score: f64,
}
