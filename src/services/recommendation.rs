use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    CatalogEntry, ServiceCategory, TagCategory, Taxonomy, UserPreference, fuzzy_matches,
};
use crate::store::Store;
use crate::utils::constant::{
    CONCERN_MATCH_POINTS, LIFESTYLE_POINTS, MAINTENANCE_POINTS, MATCH_PERCENTAGE_FULL_SCORE,
    MAX_RECOMMENDATIONS, PREFERRED_BUDGET_POINTS, QUICK_SERVICE_MAX_MINUTES,
    RELAXING_SERVICE_MIN_MINUTES, STYLE_MATCH_POINTS, TRUST_BASE_CAP, TRUST_BASE_DIVISOR,
};

static MAINTENANCE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(maintenance|touch[- ]?ups?|trims?|refresh|roots?|fill|upkeep)\b")
        .expect("Failed to compile maintenance title regex")
});

/// One ranked service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub service_id: Uuid,
    pub title: String,
    pub merchant_id: Uuid,
    pub category: ServiceCategory,
    pub score: f64,
    /// One entry per contributing rule, in rule order.
    pub reasons: Vec<String>,
    pub match_percentage: u8,
    pub price: i64,
    pub duration_minutes: i32,
    pub merchant_trust_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
    pub user_profile: UserPreference,
}

pub struct RecommendationService;

impl RecommendationService {
    /// Scores one catalog entry for the user.
    ///
    /// Returns `None` when the entry is inactive, falls outside the user's
    /// category set or budget band, or earns no points at all.
    pub fn score_candidate(
        preference: &UserPreference,
        entry: &CatalogEntry,
        taxonomy: &Taxonomy,
    ) -> Option<Recommendation> {
        let service = &entry.service;

        // Hard filters
        if !service.is_active {
            return None;
        }
        if !preference.categories().contains(&service.category) {
            trace!(service_id = %service.id, "Filtered out by category");
            return None;
        }
        if !preference.budget.contains(service.price) {
            trace!(service_id = %service.id, price = service.price, "Filtered out by budget");
            return None;
        }

        let mut score = 0.0;
        let mut reasons = Vec::new();

        // Reputation
        let trust = entry.merchant_trust_score;
        let trust_points = (trust / TRUST_BASE_DIVISOR).min(TRUST_BASE_CAP).max(0.0);
        if trust_points > 0.0 {
            score += trust_points;
            reasons.push(format!("Trusted merchant (trust score {trust})"));
        }

        // Taxonomy overlap, one pass per category so reasons stay grouped
        for tag in taxonomy.resolve(&service.tags) {
            if tag.category == TagCategory::HairConcern
                && preference
                    .hair_concerns
                    .iter()
                    .any(|concern| fuzzy_matches(concern, &tag.name))
            {
                score += CONCERN_MATCH_POINTS;
                reasons.push(format!("Addresses your hair concern: {}", tag.name));
            }
        }
        for tag in taxonomy.resolve(&service.tags) {
            if tag.category == TagCategory::FacialConcern
                && preference
                    .facial_concerns
                    .iter()
                    .any(|concern| fuzzy_matches(concern, &tag.name))
            {
                score += CONCERN_MATCH_POINTS;
                reasons.push(format!("Addresses your skin concern: {}", tag.name));
            }
        }
        if let Some(style) = preference.style_preference.as_deref() {
            for tag in taxonomy.resolve(&service.tags) {
                if tag.category == TagCategory::StylePreference && fuzzy_matches(style, &tag.name) {
                    score += STYLE_MATCH_POINTS;
                    reasons.push(format!("Matches your style: {}", tag.name));
                }
            }
        }

        if service.price <= preference.budget.preferred {
            score += PREFERRED_BUDGET_POINTS;
            reasons.push("Within your preferred budget".to_string());
        }

        if preference.is_high_cadence() && MAINTENANCE_TITLE.is_match(&service.title) {
            score += MAINTENANCE_POINTS;
            reasons.push("Good for regular maintenance visits".to_string());
        }

        if preference.wants_quick_services() && service.duration_minutes <= QUICK_SERVICE_MAX_MINUTES
        {
            score += LIFESTYLE_POINTS;
            reasons.push("Quick service for a busy schedule".to_string());
        }
        if preference.wants_relaxing_services()
            && service.duration_minutes >= RELAXING_SERVICE_MIN_MINUTES
        {
            score += LIFESTYLE_POINTS;
            reasons.push("Longer session for relaxation".to_string());
        }

        if score <= 0.0 {
            return None;
        }

        trace!(service_id = %service.id, score, "Candidate scored");

        Some(Recommendation {
            service_id: service.id,
            title: service.title.clone(),
            merchant_id: service.merchant_id,
            category: service.category,
            score,
            reasons,
            match_percentage: Self::match_percentage(score),
            price: service.price,
            duration_minutes: service.duration_minutes,
            merchant_trust_score: trust,
        })
    }

    /// `min(round(score / 20 * 100), 100)`. The denominator is fixed, so any
    /// score of 20 or more reads as a full match.
    pub fn match_percentage(score: f64) -> u8 {
        let percentage = (score / MATCH_PERCENTAGE_FULL_SCORE * 100.0).round();
        percentage.clamp(0.0, 100.0) as u8
    }

    /// Scores the catalog and returns the top results, highest score first.
    /// Ties go to the cheaper service, then to the lower service id.
    pub fn rank(
        preference: &UserPreference,
        catalog: &[CatalogEntry],
        taxonomy: &Taxonomy,
    ) -> Vec<Recommendation> {
        let mut ranked: Vec<Recommendation> = catalog
            .iter()
            .filter_map(|entry| Self::score_candidate(preference, entry, taxonomy))
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.price.cmp(&b.price))
                .then_with(|| a.service_id.cmp(&b.service_id))
        });
        ranked.truncate(MAX_RECOMMENDATIONS);
        ranked
    }

    /// Loads the user's preference (or a permissive default) and the active
    /// catalog, then ranks. Reads trust scores fresh on every call.
    #[instrument(skip(store, taxonomy))]
    pub async fn recommend(
        store: &dyn Store,
        taxonomy: &Taxonomy,
        user_id: Uuid,
        default_preferred_budget: i64,
    ) -> AppResult<RecommendationSet> {
        let preference = match store.fetch_preference(user_id).await? {
            Some(preference) => preference,
            None => {
                debug!("No stored preference, using permissive defaults");
                UserPreference::empty(user_id, default_preferred_budget)
            }
        };

        let catalog = store.fetch_active_catalog().await?;
        let recommendations = Self::rank(&preference, &catalog, taxonomy);

        debug!(
            candidates = catalog.len(),
            returned = recommendations.len(),
            "Recommendations computed"
        );

        Ok(RecommendationSet {
            recommendations,
            user_profile: preference,
        })
    }
}
