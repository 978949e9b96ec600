//! The fixed, pre-generated per-chapter plan

use serde::{Deserialize, Serialize};

/// One planned chapter: number, title and a short summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterOutline {
    pub chapter: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

/// Ordered chapter plan, produced once and read-only afterward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outline {
    pub chapters: Vec<ChapterOutline>,
}

impl Outline {
    pub fn new(chapters: Vec<ChapterOutline>) -> Self {
        Self { chapters }
    }

    pub fn for_chapter(&self, number: u32) -> Option<&ChapterOutline> {
        self.chapters.iter().find(|c| c.chapter == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_number() {
        let outline = Outline::new(vec![
            ChapterOutline {
                chapter: 1,
                title: "Arrival".to_string(),
                summary: "The crew docks.".to_string(),
            },
            ChapterOutline {
                chapter: 2,
                title: "Descent".to_string(),
                summary: String::new(),
            },
        ]);

        assert_eq!(outline.for_chapter(2).unwrap().title, "Descent");
        assert!(outline.for_chapter(3).is_none());
    }
}
