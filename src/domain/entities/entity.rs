//! Curated world-building entities and their registries

use crate::domain::services::classification;
use crate::domain::value_objects::EntityCategory;

/// What kind of world-building element an entity describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Character,
    Location,
}

/// A curated character or location accepted by the operator.
///
/// Entities are immutable once accepted. They are never edited, only
/// appended to a registry.
#[derive(Debug, Clone)]
pub struct StoryEntity {
    pub kind: EntityKind,
    /// Free-text description as returned by the model (role, traits,
    /// backstory or physical/political description).
    pub description: String,
    /// Coarse tag derived from keywords in the description.
    pub category: EntityCategory,
}

impl StoryEntity {
    pub fn new(kind: EntityKind, description: impl Into<String>) -> Self {
        let description = description.into();
        let category = classification::categorize(&description);
        Self {
            kind,
            description,
            category,
        }
    }

    /// First non-empty line of the description, used when a short handle
    /// is needed in prompts.
    pub fn summary_line(&self) -> &str {
        self.description
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// Ordered, accepted entity sets for one run.
///
/// Nothing enters a registry without passing the curation accept gate.
/// Side characters are expendable: they may be replaced wholesale
/// between books, never merged.
#[derive(Debug, Clone, Default)]
pub struct WorldRegistries {
    pub locations: Vec<StoryEntity>,
    pub main_characters: Vec<StoryEntity>,
    pub side_characters: Vec<StoryEntity>,
}
