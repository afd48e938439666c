use glowtrust::models::{
    CatalogEntry, QuizAnswers, ServiceCategory, ServiceListing, Taxonomy, UserPreference,
};
use glowtrust::services::recommendation::RecommendationService;
use glowtrust::utils::constant::DEFAULT_PREFERRED_BUDGET;
use uuid::Uuid;

fn entry(
    title: &str,
    price: i64,
    duration_minutes: i32,
    category: ServiceCategory,
    tags: &[&str],
    trust: f64,
) -> CatalogEntry {
    CatalogEntry {
        service: ServiceListing {
            id: Uuid::new_v4(),
            merchant_id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            price,
            duration_minutes,
            category,
            is_active: true,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        },
        merchant_trust_score: trust,
    }
}

fn preference(answers: QuizAnswers) -> UserPreference {
    answers.normalize(Uuid::new_v4(), DEFAULT_PREFERRED_BUDGET)
}

fn open_preference() -> UserPreference {
    UserPreference::empty(Uuid::new_v4(), DEFAULT_PREFERRED_BUDGET)
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test_log::test]
fn trusted_natural_look_service_outranks_cheaper_untagged_one() {
    let taxonomy = Taxonomy::builtin();
    let pref = preference(QuizAnswers {
        service_type: Some("Hair Services".to_string()),
        budget_range: Some("$50-$100".to_string()),
        style_preference: Some("Natural Look".to_string()),
        ..Default::default()
    });

    let natural = entry(
        "Soft Balayage",
        8_000,
        120,
        ServiceCategory::Beauty,
        &["natural_look"],
        92.0,
    );
    let cheap_untagged = entry("Express Blowout", 4_500, 30, ServiceCategory::Beauty, &[], 60.0);
    let cheap_in_band = entry("Wash & Style", 5_500, 30, ServiceCategory::Beauty, &[], 60.0);

    let ranked = RecommendationService::rank(
        &pref,
        &[cheap_untagged.clone(), cheap_in_band.clone(), natural.clone()],
        &taxonomy,
    );

    assert_eq!(ranked[0].service_id, natural.service.id);
    assert!(approx_eq(ranked[0].score, 12.2), "got {}", ranked[0].score);
    assert_eq!(ranked[0].match_percentage, 61);

    // $45 is below the $50 floor of the band
    assert!(
        ranked
            .iter()
            .all(|r| r.service_id != cheap_untagged.service.id)
    );

    let in_band = ranked
        .iter()
        .find(|r| r.service_id == cheap_in_band.service.id)
        .expect("In-band service should be ranked");
    assert!(approx_eq(in_band.score, 9.0), "got {}", in_band.score);
}

#[test_log::test]
fn reasons_follow_rule_order() {
    let taxonomy = Taxonomy::builtin();
    let pref = preference(QuizAnswers {
        hair_concerns: Some(r#"["frizz"]"#.to_string()),
        style_preference: Some("natural".to_string()),
        budget_range: Some("Under $100".to_string()),
        visit_frequency: Some("Weekly".to_string()),
        lifestyle: Some("Busy professional".to_string()),
        ..Default::default()
    });

    let service = entry(
        "Frizz Control Touch-Up",
        5_000,
        45,
        ServiceCategory::Beauty,
        &["frizz", "natural_look"],
        80.0,
    );

    let scored = RecommendationService::score_candidate(&pref, &service, &taxonomy)
        .expect("Service should be scored");

    assert!(approx_eq(scored.score, 23.0), "got {}", scored.score);
    assert_eq!(scored.match_percentage, 100);
    assert_eq!(
        scored.reasons,
        vec![
            "Trusted merchant (trust score 80)",
            "Addresses your hair concern: Frizz",
            "Matches your style: Natural Look",
            "Within your preferred budget",
            "Good for regular maintenance visits",
            "Quick service for a busy schedule",
        ]
    );
}

#[test_log::test]
fn facial_concern_only_matches_facial_tags() {
    let taxonomy = Taxonomy::builtin();
    let pref = preference(QuizAnswers {
        facial_concerns: Some("Acne, dull skin".to_string()),
        ..Default::default()
    });

    // "dryness" is a hair concern; it must not count for facial concerns
    let facial = entry(
        "Clarifying Facial",
        20_000,
        60,
        ServiceCategory::Beauty,
        &["acne", "dull_skin", "dryness"],
        50.0,
    );

    let scored = RecommendationService::score_candidate(&pref, &facial, &taxonomy).unwrap();
    assert!(approx_eq(scored.score, 5.0 + 10.0), "got {}", scored.score);
}

#[test_log::test]
fn relaxing_lifestyle_rewards_long_sessions_only() {
    let taxonomy = Taxonomy::builtin();
    let pref = preference(QuizAnswers {
        lifestyle: Some("I like to relax and be pampered".to_string()),
        ..Default::default()
    });

    let long = entry("Hot Stone Massage", 20_000, 90, ServiceCategory::Wellness, &[], 50.0);
    let short = entry("Chair Massage", 20_000, 30, ServiceCategory::Wellness, &[], 50.0);

    let long = RecommendationService::score_candidate(&pref, &long, &taxonomy).unwrap();
    let short = RecommendationService::score_candidate(&pref, &short, &taxonomy).unwrap();

    assert!(approx_eq(long.score, 7.0));
    assert!(approx_eq(short.score, 5.0));
}

#[test_log::test]
fn maintenance_bonus_needs_high_cadence() {
    let taxonomy = Taxonomy::builtin();
    let service = entry("Root Touch Up", 20_000, 60, ServiceCategory::Beauty, &[], 50.0);

    let monthly = preference(QuizAnswers {
        visit_frequency: Some("Monthly".to_string()),
        ..Default::default()
    });
    let biweekly = preference(QuizAnswers {
        visit_frequency: Some("Bi-weekly".to_string()),
        ..Default::default()
    });

    let monthly = RecommendationService::score_candidate(&monthly, &service, &taxonomy).unwrap();
    let biweekly = RecommendationService::score_candidate(&biweekly, &service, &taxonomy).unwrap();

    assert!(approx_eq(biweekly.score - monthly.score, 2.0));
}

#[test_log::test]
fn recommendations_never_leave_category_or_budget() {
    let taxonomy = Taxonomy::builtin();
    let pref = preference(QuizAnswers {
        service_type: Some("Massage/Spa".to_string()),
        budget_range: Some("$60-$120".to_string()),
        ..Default::default()
    });

    let catalog: Vec<CatalogEntry> = [1_000, 5_999, 6_000, 9_000, 12_000, 12_001, 50_000]
        .into_iter()
        .flat_map(|price| {
            [
                entry("Massage", price, 60, ServiceCategory::Wellness, &[], 70.0),
                entry("Haircut", price, 60, ServiceCategory::Beauty, &[], 70.0),
            ]
        })
        .collect();

    let ranked = RecommendationService::rank(&pref, &catalog, &taxonomy);

    assert_eq!(ranked.len(), 3);
    for recommendation in &ranked {
        assert_eq!(recommendation.category, ServiceCategory::Wellness);
        assert!((6_000..=12_000).contains(&recommendation.price));
    }
}

#[test_log::test]
fn score_is_monotonic_in_trust() {
    let taxonomy = Taxonomy::builtin();
    let pref = preference(QuizAnswers {
        style_preference: Some("Classic".to_string()),
        ..Default::default()
    });

    let mut previous = f64::MIN;
    for trust in (0..=100).step_by(5) {
        let candidate = entry(
            "Classic Manicure",
            3_000,
            45,
            ServiceCategory::Beauty,
            &["classic"],
            trust as f64,
        );
        let score = RecommendationService::score_candidate(&pref, &candidate, &taxonomy)
            .map_or(0.0, |r| r.score);
        assert!(score >= previous, "score dropped at trust {trust}");
        previous = score;
    }
}

#[test_log::test]
fn ties_prefer_lower_price_and_results_are_capped() {
    let taxonomy = Taxonomy::builtin();
    let pref = open_preference();

    let mut catalog: Vec<CatalogEntry> = (0..15)
        .map(|i| entry("Service", 9_000 - i * 100, 60, ServiceCategory::Beauty, &[], 50.0))
        .collect();
    catalog.reverse();

    let ranked = RecommendationService::rank(&pref, &catalog, &taxonomy);

    assert_eq!(ranked.len(), 10);
    let prices: Vec<i64> = ranked.iter().map(|r| r.price).collect();
    let mut sorted = prices.clone();
    sorted.sort();
    assert_eq!(prices, sorted, "equal scores should be ordered by price");
    assert_eq!(prices[0], 9_000 - 14 * 100);
}

#[test_log::test]
fn zero_score_and_inactive_services_are_dropped() {
    let taxonomy = Taxonomy::builtin();
    let pref = open_preference();

    // No trust, above the preferred budget, no tags: nothing contributes
    let worthless = entry("Consultation", 20_000, 60, ServiceCategory::Beauty, &[], 0.0);
    let mut inactive = entry("Retired Service", 1_000, 60, ServiceCategory::Beauty, &[], 90.0);
    inactive.service.is_active = false;

    assert!(RecommendationService::score_candidate(&pref, &worthless, &taxonomy).is_none());
    assert!(RecommendationService::score_candidate(&pref, &inactive, &taxonomy).is_none());
}

#[test_log::test]
fn unknown_and_repeated_tags_score_once() {
    let taxonomy = Taxonomy::builtin();
    let pref = preference(QuizAnswers {
        hair_concerns: Some("Frizz".to_string()),
        ..Default::default()
    });

    let service = entry(
        "Smoothing Treatment",
        20_000,
        60,
        ServiceCategory::Beauty,
        &["frizz", "frizz", "not_a_tag"],
        0.0,
    );

    let scored = RecommendationService::score_candidate(&pref, &service, &taxonomy).unwrap();
    assert!(approx_eq(scored.score, 5.0));
    assert_eq!(scored.reasons.len(), 1);
}

#[test]
fn match_percentage_is_capped() {
    assert_eq!(RecommendationService::match_percentage(0.2), 1);
    assert_eq!(RecommendationService::match_percentage(10.0), 50);
    assert_eq!(RecommendationService::match_percentage(20.0), 100);
    assert_eq!(RecommendationService::match_percentage(35.0), 100);
}
