//! Domain layer - Core story data with no external dependencies
//!
//! This layer contains:
//! - Entities: StoryEntity, StoryState, Outline, StoryBible
//! - Value Objects: entity categories, gender tally
//! - Domain Services: keyword classification heuristics

pub mod entities;
pub mod services;
pub mod value_objects;
