use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::points::PointsAward;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub merchant_id: Uuid,
    /// Between 1 and 5
    pub rating: i16,
    pub comment: Option<String>,
    pub hard_sell_reported: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HardSellReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub merchant_id: Uuid,
    pub booking_id: Uuid,
    pub note: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated review together with the trust and points effects it causes.
/// The store writes all of it in one transaction.
#[derive(Debug, Clone)]
pub struct FeedbackSubmission {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub merchant_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub hard_sell_reported: bool,
    /// Present only when a hard-sell report must be filed.
    pub hard_sell_note: Option<String>,
    pub trust_delta: f64,
    pub award: PointsAward,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackOutcome {
    pub feedback: Feedback,
    pub hard_sell_report: Option<HardSellReport>,
    /// Merchant trust score before the adjustment.
    pub previous_trust_score: f64,
    /// Merchant trust score after the adjustment.
    pub trust_score: f64,
    pub points_awarded: i64,
}
