//! # Trust Score Accumulator
//!
//! Reviews move a merchant's trust score by two independent deltas:
//!
//! - rating: 5 → +5, 4 → +2, 3 → 0, 1–2 → −2
//! - hard-sell: a report with a non-blank note files a [`HardSellReport`] and
//!   costs a further −10
//!
//! Both are summed and applied as one relative increment by the store, in the
//! same transaction as the feedback row. The result is clamped to [0, 100].
//!
//! [`HardSellReport`]: crate::models::HardSellReport

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::booking::{ensure_booking_owner, fetch_booking};
use crate::error::{AppError, AppResult};
use crate::middleware::require_role;
use crate::models::{
    BookingStatus, FeedbackSubmission, PointsAward, PointsReason, Principal, Role,
};
use crate::store::Store;
use crate::utils::constant::{HARD_SELL_PENALTY, MAX_TEXT_FIELD_LENGTH};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = MAX_TEXT_FIELD_LENGTH))]
    pub comment: Option<String>,
    #[serde(default)]
    pub hard_sell_reported: bool,
    #[validate(length(max = MAX_TEXT_FIELD_LENGTH))]
    pub hard_sell_note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub points_awarded: i64,
    /// Change actually applied to the score, after clamping.
    pub trust_delta: f64,
    pub trust_score: f64,
    pub hard_sell_report_filed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustScoreView {
    pub merchant_id: Uuid,
    pub trust_score: f64,
}

pub struct TrustService;

impl TrustService {
    pub fn rating_delta(rating: i16) -> f64 {
        match rating {
            5 => 5.0,
            4 => 2.0,
            3 => 0.0,
            _ => -2.0,
        }
    }

    /// The note to file when a hard-sell report qualifies: flag set and a
    /// non-blank note.
    pub fn hard_sell_note(reported: bool, note: Option<&str>) -> Option<String> {
        if !reported {
            return None;
        }
        note.map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_owned)
    }

    /// Records a review of a completed booking and adjusts the merchant's trust.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` - rating outside 1–5 or oversized text
    /// - `NotFound` - no such booking
    /// - `Forbidden` - caller does not own the booking
    /// - `Conflict` - booking not completed yet, or already reviewed
    #[instrument(skip_all, fields(user_id = %principal.user_id, booking_id = %booking_id))]
    pub async fn submit_review(
        store: &dyn Store,
        principal: &Principal,
        booking_id: Uuid,
        input: ReviewInput,
    ) -> AppResult<ReviewOutcome> {
        require_role(principal, Role::User)?;
        input.validate()?;

        let booking = fetch_booking(store, booking_id).await?;
        ensure_booking_owner(principal, &booking)?;
        if booking.status != BookingStatus::Completed {
            warn!(status = %booking.status, "Review attempted before completion");
            return Err(AppError::Conflict("Booking must be completed before review"));
        }

        let hard_sell_note =
            Self::hard_sell_note(input.hard_sell_reported, input.hard_sell_note.as_deref());
        let mut trust_delta = Self::rating_delta(input.rating);
        if hard_sell_note.is_some() {
            trust_delta += HARD_SELL_PENALTY;
        }

        let comment = input
            .comment
            .map(|comment| comment.trim().to_owned())
            .filter(|comment| !comment.is_empty());

        let outcome = store
            .submit_feedback(FeedbackSubmission {
                booking_id,
                user_id: booking.user_id,
                merchant_id: booking.merchant_id,
                rating: input.rating,
                comment,
                hard_sell_reported: input.hard_sell_reported,
                hard_sell_note,
                trust_delta,
                award: PointsAward::new(
                    booking.user_id,
                    PointsReason::ReviewSubmitted,
                    format!("Review for booking {booking_id}"),
                ),
            })
            .await?;

        let applied_delta = outcome.trust_score - outcome.previous_trust_score;
        info!(
            merchant_id = %booking.merchant_id,
            requested_delta = trust_delta,
            applied_delta,
            trust_score = outcome.trust_score,
            "Review recorded"
        );

        Ok(ReviewOutcome {
            points_awarded: outcome.points_awarded,
            trust_delta: applied_delta,
            trust_score: outcome.trust_score,
            hard_sell_report_filed: outcome.hard_sell_report.is_some(),
        })
    }

    /// Current stored score; no caching, so the latest review is always visible.
    pub async fn merchant_trust_score(
        store: &dyn Store,
        merchant_id: Uuid,
    ) -> AppResult<TrustScoreView> {
        let trust_score = store
            .merchant_trust_score(merchant_id)
            .await?
            .ok_or(AppError::NotFound("Merchant not found"))?;

        Ok(TrustScoreView {
            merchant_id,
            trust_score,
        })
    }
}
