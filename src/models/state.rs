use std::sync::Arc;

use tracing::{debug, info};

use crate::models::Taxonomy;
use crate::services::jwt::JwtService;
use crate::store::Store;

/// Application state shared across requests. Needs to be thread-safe.
///
/// Holds no per-request mutable data: every durable change goes through
/// [`Store`], which is the only synchronization point between requests.
pub struct AppState {
    /// Persistence collaborator (Postgres in production, in-memory otherwise).
    pub store: Arc<dyn Store>,
    /// JWT service for principal validation.
    pub jwt_service: JwtService,
    /// Tag taxonomy used to resolve service tags during scoring.
    pub taxonomy: Taxonomy,
    /// Preferred budget (minor units) for unrecognized budget labels.
    pub default_preferred_budget: i64,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence backend
    /// * `jwt_service` - Service for JWT token operations
    /// * `taxonomy` - Tag taxonomy for scoring
    /// * `default_preferred_budget` - Fallback preferred budget in minor units
    pub fn new(
        store: Arc<dyn Store>,
        jwt_service: JwtService,
        taxonomy: Taxonomy,
        default_preferred_budget: i64,
    ) -> Self {
        info!("Initializing application state");
        debug!(
            taxonomy_size = taxonomy.len(),
            default_preferred_budget, "Loaded scoring configuration"
        );

        Self {
            store,
            jwt_service,
            taxonomy,
            default_preferred_budget,
        }
    }
}
