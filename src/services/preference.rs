use serde::Serialize;
use tracing::{info, instrument};

use super::points::PointsService;
use crate::error::{AppError, AppResult};
use crate::middleware::require_role;
use crate::models::{PointsReason, Principal, QuizAnswers, Role, UserPreference};
use crate::store::Store;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub preference: UserPreference,
    pub points_awarded: i64,
}

pub struct PreferenceService;

impl PreferenceService {
    /// Normalizes and stores the quiz answers, overwriting any earlier record.
    /// The quiz bonus is granted once per user.
    #[instrument(skip_all, fields(user_id = %principal.user_id))]
    pub async fn submit_quiz(
        store: &dyn Store,
        principal: &Principal,
        answers: &QuizAnswers,
        default_preferred_budget: i64,
    ) -> AppResult<QuizOutcome> {
        require_role(principal, Role::User)?;

        let preference = answers.normalize(principal.user_id, default_preferred_budget);
        store.upsert_preference(&preference).await?;

        let points_awarded = PointsService::award(
            store,
            principal.user_id,
            PointsReason::QuizCompleted,
            "Completed the style quiz",
        )
        .await?;

        info!(points_awarded, "Preference quiz saved");
        Ok(QuizOutcome {
            preference,
            points_awarded,
        })
    }

    pub async fn get(store: &dyn Store, principal: &Principal) -> AppResult<UserPreference> {
        store
            .fetch_preference(principal.user_id)
            .await?
            .ok_or(AppError::NotFound("Preference not found"))
    }
}
