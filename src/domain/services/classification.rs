//! Keyword heuristics for tagging curated entities
//!
//! Both rules are deliberately naive substring checks on the suggestion
//! text. They exist for artifact tagging and the curation balancing
//! policy only and must not leak into core control flow.

use crate::domain::value_objects::{EntityCategory, GenderSignal};

const MILITARY_KEYWORDS: &[&str] = &[
    "military", "soldier", "commander", "general", "army", "fleet", "war",
];

const ALIEN_KEYWORDS: &[&str] = &["alien", "xeno", "extraterrestrial", "offworld"];

/// Assign a coarse category by keyword presence in the description.
///
/// Military keywords win over alien keywords; anything else is "general".
pub fn categorize(description: &str) -> EntityCategory {
    let text = description.to_lowercase();
    if MILITARY_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        EntityCategory::Military
    } else if ALIEN_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        EntityCategory::Alien
    } else {
        EntityCategory::General
    }
}

/// Infer a gender cue by substring search for "male"/"female".
///
/// "female" is checked first because "male" is a substring of it.
pub fn gender_signal(text: &str) -> GenderSignal {
    let text = text.to_lowercase();
    if text.contains("female") {
        GenderSignal::Female
    } else if text.contains("male") {
        GenderSignal::Male
    } else {
        GenderSignal::Unstated
    }
}
