use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{PointsAward, PointsReason, PointsSummary, Principal};
use crate::store::Store;

pub struct PointsService;

impl PointsService {
    /// Grants `reason`'s points to the user. One-time reasons that were
    /// already granted yield 0, not an error.
    #[instrument(skip(store, description))]
    pub async fn award(
        store: &dyn Store,
        user_id: Uuid,
        reason: PointsReason,
        description: impl Into<String>,
    ) -> AppResult<i64> {
        let granted = store
            .award_points(PointsAward::new(user_id, reason, description))
            .await?;

        match granted {
            Some(transaction) => {
                debug!(points = transaction.points, "Points awarded");
                Ok(transaction.points)
            }
            None => {
                debug!("One-time reason already granted, skipping");
                Ok(0)
            }
        }
    }

    /// Balance and ledger, newest first.
    pub async fn summary(store: &dyn Store, principal: &Principal) -> AppResult<PointsSummary> {
        store.points_summary(principal.user_id).await
    }
}
