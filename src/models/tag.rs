//! # Tag Taxonomy
//!
//! The fixed set of labels that services carry and that user concerns are
//! matched against. Every tag belongs to exactly one [`TagCategory`] and is
//! identified by its string id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    HairConcern,
    FacialConcern,
    StylePreference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTag {
    pub id: String,
    pub name: String,
    pub category: TagCategory,
}

/// Lookup table from tag id to tag.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    tags: HashMap<String, TaxonomyTag>,
}

const BUILTIN_TAGS: &[(&str, &str, TagCategory)] = &[
    ("frizz", "Frizz", TagCategory::HairConcern),
    ("dryness", "Dryness", TagCategory::HairConcern),
    ("hair_loss", "Hair Loss", TagCategory::HairConcern),
    ("split_ends", "Split Ends", TagCategory::HairConcern),
    ("oily_scalp", "Oily Scalp", TagCategory::HairConcern),
    ("dandruff", "Dandruff", TagCategory::HairConcern),
    ("color_damage", "Color Damage", TagCategory::HairConcern),
    ("acne", "Acne", TagCategory::FacialConcern),
    ("dark_spots", "Dark Spots", TagCategory::FacialConcern),
    ("fine_lines", "Fine Lines", TagCategory::FacialConcern),
    ("dull_skin", "Dull Skin", TagCategory::FacialConcern),
    ("sensitive_skin", "Sensitive Skin", TagCategory::FacialConcern),
    ("large_pores", "Large Pores", TagCategory::FacialConcern),
    ("natural_look", "Natural Look", TagCategory::StylePreference),
    ("glamorous", "Glamorous", TagCategory::StylePreference),
    ("trendy", "Trendy", TagCategory::StylePreference),
    ("classic", "Classic", TagCategory::StylePreference),
    ("bold", "Bold", TagCategory::StylePreference),
    ("minimalist", "Minimalist", TagCategory::StylePreference),
];

impl Taxonomy {
    /// The taxonomy shipped with the engine.
    pub fn builtin() -> Self {
        Self::from_tags(BUILTIN_TAGS.iter().map(|(id, name, category)| TaxonomyTag {
            id: (*id).to_string(),
            name: (*name).to_string(),
            category: *category,
        }))
    }

    /// Loads a taxonomy from a JSON array of `{ "id", "name", "category" }` objects.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let tags: Vec<TaxonomyTag> = serde_json::from_str(content)?;
        Ok(Self::from_tags(tags))
    }

    fn from_tags(tags: impl IntoIterator<Item = TaxonomyTag>) -> Self {
        Self {
            tags: tags.into_iter().map(|tag| (tag.id.clone(), tag)).collect(),
        }
    }

    pub fn get(&self, tag_id: &str) -> Option<&TaxonomyTag> {
        self.tags.get(tag_id)
    }

    pub fn contains(&self, tag_id: &str) -> bool {
        self.tags.contains_key(tag_id)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Resolves tag ids to tags, skipping ids unknown to the taxonomy and
    /// repeated ids.
    pub fn resolve<'a>(&'a self, tag_ids: &'a [String]) -> impl Iterator<Item = &'a TaxonomyTag> {
        let mut seen = Vec::with_capacity(tag_ids.len());
        tag_ids.iter().filter_map(move |id| {
            if seen.contains(&id) {
                return None;
            }
            seen.push(id);
            self.tags.get(id)
        })
    }
}

/// Best-effort fuzzy comparison between a user-entered string and a tag name:
/// case-insensitive substring containment in either direction. Blank input
/// never matches.
pub fn fuzzy_matches(user_value: &str, tag_name: &str) -> bool {
    let user_value = user_value.trim().to_lowercase();
    let tag_name = tag_name.trim().to_lowercase();
    if user_value.is_empty() || tag_name.is_empty() {
        return false;
    }
    user_value.contains(&tag_name) || tag_name.contains(&user_value)
}
