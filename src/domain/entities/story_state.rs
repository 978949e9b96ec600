//! StoryState - the append-only narrative accumulator

/// One successfully generated chapter, tagged with its position.
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub book: u32,
    pub chapter: u32,
    pub text: String,
}

/// Append-only accumulator for the generation run.
///
/// Mutated exactly once per successful chapter and never rolled back.
/// A failed chapter is skipped and leaves no record; subsequent
/// chapters keep their own positional indices.
#[derive(Debug, Default)]
pub struct StoryState {
    records: Vec<ChapterRecord>,
}

impl StoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_chapter(&mut self, book: u32, chapter: u32, text: String) {
        self.records.push(ChapterRecord {
            book,
            chapter,
            text,
        });
    }

    pub fn records(&self) -> &[ChapterRecord] {
        &self.records
    }

    pub fn chapter_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full narrative text: all chapter segments in generation order.
    pub fn full_text(&self) -> String {
        self.records
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Tail of the accumulated narrative, capped at `max_chars`
    /// characters. Serves as the "story so far" summary in prompts.
    pub fn recent_context(&self, max_chars: usize) -> String {
        let full = self.full_text();
        let total = full.chars().count();
        if total <= max_chars {
            return full;
        }
        full.chars().skip(total - max_chars).collect()
    }
}

/// Ensure a chapter body carries the heading marker the exporter splits
/// on. Bodies that already start with one are left untouched.
pub fn normalize_heading(number: u32, title: Option<&str>, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.starts_with("## Chapter") {
        return trimmed.to_string();
    }
    match title {
        Some(title) => format!("## Chapter {}: {}\n\n{}", number, title, trimmed),
        None => format!("## Chapter {}\n\n{}", number, trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_is_ordered() {
        let mut state = StoryState::new();
        state.append_chapter(1, 1, "first".to_string());
        state.append_chapter(1, 2, "second".to_string());
        state.append_chapter(2, 1, "third".to_string());

        assert_eq!(state.chapter_count(), 3);
        let books: Vec<_> = state.records().iter().map(|r| (r.book, r.chapter)).collect();
        assert_eq!(books, vec![(1, 1), (1, 2), (2, 1)]);
        assert_eq!(state.full_text(), "first\n\nsecond\n\nthird");
    }

    #[test]
    fn test_recent_context_keeps_tail() {
        let mut state = StoryState::new();
        state.append_chapter(1, 1, "abcdef".to_string());
        assert_eq!(state.recent_context(3), "def");
        assert_eq!(state.recent_context(100), "abcdef");
    }

    #[test]
    fn test_recent_context_is_char_safe() {
        let mut state = StoryState::new();
        state.append_chapter(1, 1, "héllø wörld".to_string());
        let tail = state.recent_context(5);
        assert_eq!(tail.chars().count(), 5);
        assert_eq!(tail, "wörld");
    }

    #[test]
    fn test_normalize_heading_prefixes_marker() {
        let text = normalize_heading(3, Some("The Fall"), "It began at dusk.");
        assert!(text.starts_with("## Chapter 3: The Fall\n\n"));

        let untitled = normalize_heading(4, None, "Morning came.");
        assert!(untitled.starts_with("## Chapter 4\n\n"));
    }

    #[test]
    fn test_normalize_heading_keeps_existing_marker() {
        let body = "## Chapter 7: Ash\n\nThe city burned.";
        assert_eq!(normalize_heading(7, Some("Ash"), body), body);
    }
}
