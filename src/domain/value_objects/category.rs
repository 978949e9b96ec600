//! Coarse category tags assigned to curated entities

use serde::{Deserialize, Serialize};

/// Coarse category for a curated entity, derived from keyword matching
/// on the description text. Used only for tagging persisted artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Military,
    Alien,
    General,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Military => "military",
            Self::Alien => "alien",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
