//! Entities - Story data accumulated over a generation run

mod bible;
mod entity;
mod outline;
mod story_state;

pub use bible::StoryBible;
pub use entity::{EntityKind, StoryEntity, WorldRegistries};
pub use outline::{ChapterOutline, Outline};
pub use story_state::{normalize_heading, ChapterRecord, StoryState};
