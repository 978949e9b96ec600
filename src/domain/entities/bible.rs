//! The narrative bible: one sectioned world-building document

use std::collections::BTreeMap;

/// World-building document produced by a single generation call.
///
/// Kept both as raw markdown and as a best-effort section map keyed by
/// a lower-cased, underscored version of each `## ` heading.
#[derive(Debug, Clone)]
pub struct StoryBible {
    pub raw: String,
    pub sections: BTreeMap<String, String>,
}

impl StoryBible {
    /// Split raw markdown into sections on `"\n## "` boundaries.
    ///
    /// Heading normalization is best-effort: leading `#` markers and
    /// whitespace are stripped, the rest lower-cased with spaces
    /// replaced by underscores. No semantic validation is attempted.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut sections = BTreeMap::new();

        for section in raw.split("\n## ") {
            let section = section.trim();
            if section.is_empty() {
                continue;
            }
            let (heading, body) = match section.split_once('\n') {
                Some((heading, body)) => (heading, body.trim()),
                None => (section, ""),
            };
            let key = heading
                .trim_start_matches('#')
                .trim()
                .to_lowercase()
                .replace(' ', "_");
            if key.is_empty() {
                continue;
            }
            sections.insert(key, body.to_string());
        }

        Self { raw, sections }
    }

    pub fn section(&self, key: &str) -> Option<&str> {
        self.sections.get(key).map(String::as_str)
    }
}
