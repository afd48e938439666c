//! # User Preferences
//!
//! Raw quiz answers arrive as loosely formatted strings; [`QuizAnswers::normalize`]
//! turns them into a typed [`UserPreference`]. Normalization never fails: a
//! field that cannot be understood falls back to a permissive default so that
//! a missing signal never hides a service from the user.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use super::listing::ServiceCategory;

/// Quiz answers as submitted by the client. Every field is optional and
/// list-like fields may be JSON-encoded arrays or comma-separated text.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswers {
    pub service_type: Option<String>,
    pub hair_concerns: Option<String>,
    pub facial_concerns: Option<String>,
    pub style_preference: Option<String>,
    pub budget_range: Option<String>,
    pub visit_frequency: Option<String>,
    pub lifestyle: Option<String>,
    /// JSON object: `{"times": ["morning"], "days": ["saturday"]}`
    pub availability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    pub user_id: Uuid,
    pub service_type: Option<String>,
    pub hair_concerns: Vec<String>,
    pub facial_concerns: Vec<String>,
    pub style_preference: Option<String>,
    pub budget: BudgetBand,
    pub visit_frequency: Option<String>,
    pub lifestyle: Option<String>,
    pub availability: Availability,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserPreference {
    /// Preference for a user who never took the quiz: every filter open.
    pub fn empty(user_id: Uuid, default_preferred_budget: i64) -> Self {
        Self {
            user_id,
            service_type: None,
            hair_concerns: Vec::new(),
            facial_concerns: Vec::new(),
            style_preference: None,
            budget: BudgetBand::unrestricted(default_preferred_budget),
            visit_frequency: None,
            lifestyle: None,
            availability: Availability::default(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    /// Categories implied by the declared service-type interest. Unknown or
    /// missing interest keeps every category.
    pub fn categories(&self) -> BTreeSet<ServiceCategory> {
        let all = || BTreeSet::from([ServiceCategory::Beauty, ServiceCategory::Wellness]);
        let Some(service_type) = self.service_type.as_deref() else {
            return all();
        };

        match service_type.trim().to_lowercase().as_str() {
            "hair services" | "facial/skin care" | "facial services" | "skin care"
            | "nail services" | "makeup" => BTreeSet::from([ServiceCategory::Beauty]),
            "massage/spa" | "massage" | "spa" | "wellness" => {
                BTreeSet::from([ServiceCategory::Wellness])
            }
            _ => all(),
        }
    }

    /// Weekly or bi-weekly visitors.
    pub fn is_high_cadence(&self) -> bool {
        self.visit_frequency.as_deref().is_some_and(|frequency| {
            matches!(
                frequency.trim().to_lowercase().as_str(),
                "weekly" | "bi-weekly" | "biweekly"
            )
        })
    }

    pub fn wants_quick_services(&self) -> bool {
        self.lifestyle.as_deref().is_some_and(|lifestyle| {
            let lifestyle = lifestyle.to_lowercase();
            lifestyle.contains("quick") || lifestyle.contains("busy")
        })
    }

    pub fn wants_relaxing_services(&self) -> bool {
        self.lifestyle.as_deref().is_some_and(|lifestyle| {
            let lifestyle = lifestyle.to_lowercase();
            lifestyle.contains("relax") || lifestyle.contains("pamper")
        })
    }
}

/// Price range in minor currency units. `min <= preferred`, and
/// `preferred <= max` when `max` is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBand {
    pub min: i64,
    /// `None` means no upper bound.
    pub max: Option<i64>,
    pub preferred: i64,
}

impl BudgetBand {
    pub fn new(min: i64, max: Option<i64>, preferred: i64) -> Self {
        let (min, max) = match max {
            Some(max) if max < min => (max, Some(min)),
            _ => (min, max),
        };
        let min = min.max(0);
        let preferred = preferred.max(min);
        let preferred = max.map_or(preferred, |max| preferred.min(max));
        Self {
            min,
            max,
            preferred,
        }
    }

    pub fn unrestricted(preferred: i64) -> Self {
        Self::new(0, None, preferred)
    }

    pub fn contains(&self, price: i64) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }

    /// Parses labels such as `"$50-$100"`, `"Under $50"` or `"$200+"`.
    /// Amounts are in major units and converted to minor units.
    pub fn parse(label: Option<&str>, default_preferred: i64) -> Self {
        static RANGE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\$?\s*(\d+(?:\.\d{1,2})?)\s*(?:-|–|to)\s*\$?\s*(\d+(?:\.\d{1,2})?)$")
                .expect("Failed to compile budget range regex")
        });
        static UNDER: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^(?:under|below|less than|up to)\s*\$?\s*(\d+(?:\.\d{1,2})?)$")
                .expect("Failed to compile budget ceiling regex")
        });
        static OVER: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\$?\s*(\d+(?:\.\d{1,2})?)\s*(?:\+|and up|or more)$")
                .expect("Failed to compile budget floor regex")
        });

        let Some(label) = label.map(|l| l.trim().to_lowercase()).filter(|l| !l.is_empty())
        else {
            return Self::unrestricted(default_preferred);
        };

        if let Some(caps) = RANGE.captures(&label) {
            let (Some(min), Some(max)) = (to_minor_units(&caps[1]), to_minor_units(&caps[2]))
            else {
                return Self::unrestricted(default_preferred);
            };
            return Self::new(min, Some(max), min + (max - min) / 2);
        }
        if let Some(max) = UNDER.captures(&label).and_then(|caps| to_minor_units(&caps[1])) {
            return Self::new(0, Some(max), max);
        }
        if let Some(min) = OVER.captures(&label).and_then(|caps| to_minor_units(&caps[1])) {
            return Self::new(min, None, min);
        }

        warn!(%label, "Unrecognized budget label, using unrestricted band");
        Self::unrestricted(default_preferred)
    }
}

fn to_minor_units(amount: &str) -> Option<i64> {
    let value: f64 = amount.parse().ok()?;
    let minor = (value * 100.0).round();
    (minor.is_finite() && minor <= i64::MAX as f64).then_some(minor as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "morning" => Some(TimeOfDay::Morning),
            "afternoon" => Some(TimeOfDay::Afternoon),
            "evening" | "night" => Some(TimeOfDay::Evening),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        let day = match value.get(..3)? {
            "mon" => DayOfWeek::Monday,
            "tue" => DayOfWeek::Tuesday,
            "wed" => DayOfWeek::Wednesday,
            "thu" => DayOfWeek::Thursday,
            "fri" => DayOfWeek::Friday,
            "sat" => DayOfWeek::Saturday,
            "sun" => DayOfWeek::Sunday,
            _ => return None,
        };
        Some(day)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub times: BTreeSet<TimeOfDay>,
    pub days: BTreeSet<DayOfWeek>,
}

impl Availability {
    fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparseable availability, treating as unrestricted");
                return Self::default();
            }
        };

        let labels = |key: &str| -> Vec<String> {
            value
                .get(key)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            times: labels("times")
                .iter()
                .filter_map(|t| TimeOfDay::parse(t))
                .collect(),
            days: labels("days")
                .iter()
                .filter_map(|d| DayOfWeek::parse(d))
                .collect(),
        }
    }
}

impl QuizAnswers {
    /// Builds the canonical preference record for `user_id`.
    pub fn normalize(&self, user_id: Uuid, default_preferred_budget: i64) -> UserPreference {
        UserPreference {
            user_id,
            service_type: clean_label(self.service_type.as_deref()),
            hair_concerns: parse_list("hair_concerns", self.hair_concerns.as_deref()),
            facial_concerns: parse_list("facial_concerns", self.facial_concerns.as_deref()),
            style_preference: clean_label(self.style_preference.as_deref()),
            budget: BudgetBand::parse(self.budget_range.as_deref(), default_preferred_budget),
            visit_frequency: clean_label(self.visit_frequency.as_deref()),
            lifestyle: clean_label(self.lifestyle.as_deref()),
            availability: Availability::parse(self.availability.as_deref()),
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

fn clean_label(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Parses a list answer. Accepts a JSON array of strings, a single JSON
/// string, or comma-separated text. Anything else is an empty list.
/// The result keeps first-seen order and drops case-insensitive duplicates.
fn parse_list(field: &'static str, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };

    let items: Vec<String> = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Ok(Value::String(single)) => vec![single],
        Ok(other) => {
            warn!(field, kind = ?other, "Unexpected JSON shape in quiz answer, ignoring");
            return Vec::new();
        }
        Err(_) if raw.starts_with('[') || raw.starts_with('{') => {
            warn!(field, "Malformed JSON in quiz answer, ignoring");
            return Vec::new();
        }
        Err(_) => raw.split(',').map(str::to_owned).collect(),
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty() && seen.insert(item.to_lowercase()))
        .collect()
}
