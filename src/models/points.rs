use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::utils::constant::{
    AI_INTERACTION_POINTS, BOOKING_MADE_POINTS, QUIZ_COMPLETED_POINTS, REVIEW_SUBMITTED_POINTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "points_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PointsReason {
    QuizCompleted,
    BookingMade,
    ReviewSubmitted,
    AiInteraction,
}

impl PointsReason {
    /// Points granted for this reason.
    pub fn points(&self) -> i64 {
        match self {
            PointsReason::QuizCompleted => QUIZ_COMPLETED_POINTS,
            PointsReason::BookingMade => BOOKING_MADE_POINTS,
            PointsReason::ReviewSubmitted => REVIEW_SUBMITTED_POINTS,
            PointsReason::AiInteraction => AI_INTERACTION_POINTS,
        }
    }

    /// One-time reasons are granted at most once per user.
    #[inline]
    pub fn is_one_time(&self) -> bool {
        matches!(self, PointsReason::QuizCompleted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PointsTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub points: i64,
    pub reason: PointsReason,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A request to append one ledger entry.
#[derive(Debug, Clone)]
pub struct PointsAward {
    pub user_id: Uuid,
    pub reason: PointsReason,
    pub description: String,
}

impl PointsAward {
    pub fn new(user_id: Uuid, reason: PointsReason, description: impl Into<String>) -> Self {
        Self {
            user_id,
            reason,
            description: description.into(),
        }
    }

    pub fn points(&self) -> i64 {
        self.reason.points()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsSummary {
    pub balance: i64,
    /// Newest first.
    pub transactions: Vec<PointsTransaction>,
}
