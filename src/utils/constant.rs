//! # Application Constants
//!
//! Scoring weights, trust adjustments, points amounts, and input limits.

/// Trust score contributes `trust / TRUST_BASE_DIVISOR` to a service's score...
pub const TRUST_BASE_DIVISOR: f64 = 10.0;
/// ...capped at this value.
pub const TRUST_BASE_CAP: f64 = 10.0;

/// Points per distinct hair or facial concern tag match.
pub const CONCERN_MATCH_POINTS: f64 = 5.0;
/// Points per style preference tag match.
pub const STYLE_MATCH_POINTS: f64 = 3.0;
/// Flat bonus when the price is at or below the preferred budget.
pub const PREFERRED_BUDGET_POINTS: f64 = 3.0;
/// Bonus for maintenance services when the user visits often.
pub const MAINTENANCE_POINTS: f64 = 2.0;
/// Bonus for short services (quick lifestyle) or long ones (relaxing lifestyle).
pub const LIFESTYLE_POINTS: f64 = 2.0;

/// Services at or below this duration suit a "quick" lifestyle.
pub const QUICK_SERVICE_MAX_MINUTES: i32 = 60;
/// Services at or above this duration suit a "relaxing" lifestyle.
pub const RELAXING_SERVICE_MIN_MINUTES: i32 = 90;

/// Fixed normalization constant for the match percentage. Not adaptive:
/// any score at or above this reads as a 100% match.
pub const MATCH_PERCENTAGE_FULL_SCORE: f64 = 20.0;

/// Maximum number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Fallback preferred budget (minor units) for unrecognized budget labels.
pub const DEFAULT_PREFERRED_BUDGET: i64 = 10_000;

/// Trust score bounds applied on every increment.
pub const TRUST_SCORE_FLOOR: f64 = 0.0;
pub const TRUST_SCORE_CEILING: f64 = 100.0;

/// Penalty applied when a review carries a hard-sell report with a note.
pub const HARD_SELL_PENALTY: f64 = -10.0;

/// Loyalty points per reason.
pub const QUIZ_COMPLETED_POINTS: i64 = 50;
pub const BOOKING_MADE_POINTS: i64 = 20;
pub const REVIEW_SUBMITTED_POINTS: i64 = 10;
pub const AI_INTERACTION_POINTS: i64 = 5;

/// Maximum length for review comments and hard-sell notes, in bytes.
pub const MAX_TEXT_FIELD_LENGTH: u64 = 2000;

/// Maximum length of a payment-method tag.
pub const MAX_PAYMENT_METHOD_LENGTH: u64 = 32;
