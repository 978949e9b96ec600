//! Prompt building functions for generation requests
//!
//! Pure functions: no side effects, no network access. The shape of a
//! chapter prompt depends on its position in the run; everything else
//! (word targets, illustration directive) comes in as configuration.

use crate::domain::entities::{ChapterOutline, StoryBible, StoryEntity, WorldRegistries};

/// Directive appended to a curation prompt when the balancing policy
/// asks for a male suggestion next.
pub const MALE_BIAS_DIRECTIVE: &str =
    "Recent accepted characters skew female. Make this next character male.";

/// Maximum word count the downstream image model accepts.
pub const ILLUSTRATION_PROMPT_WORDS: usize = 75;

/// Line prefix used when a chapter embeds an illustration suggestion.
pub const ILLUSTRATION_MARKER: &str = "Illustration:";

/// Positional inputs for one chapter prompt.
pub struct ChapterPromptRequest<'a> {
    pub book: u32,
    pub book_count: u32,
    pub chapter: u32,
    pub chapters_per_book: u32,
    /// Chapter number across all books, 1-based.
    pub global_chapter: u32,
    pub total_chapters: u32,
    pub chapter_words: u32,
    pub outline_entry: Option<&'a ChapterOutline>,
    pub bible: Option<&'a StoryBible>,
    pub registries: &'a WorldRegistries,
    /// Tail of the accumulated narrative, empty for the first chapter.
    pub story_so_far: &'a str,
    pub request_illustration_prompt: bool,
}

impl ChapterPromptRequest<'_> {
    fn is_first_of_book(&self) -> bool {
        self.chapter == 1
    }

    fn is_final_of_run(&self) -> bool {
        self.global_chapter == self.total_chapters
    }
}

/// Narrating character for chapter N: index `(N-1) mod len` into the
/// combined main and side character pool. Deterministic round-robin,
/// not a random choice. Returns `None` for an empty pool.
pub fn narrator_for_chapter<'a>(
    main_characters: &'a [StoryEntity],
    side_characters: &'a [StoryEntity],
    chapter: u32,
) -> Option<&'a StoryEntity> {
    let pool_len = main_characters.len() + side_characters.len();
    if pool_len == 0 || chapter == 0 {
        return None;
    }
    let index = (chapter as usize - 1) % pool_len;
    if index < main_characters.len() {
        Some(&main_characters[index])
    } else {
        Some(&side_characters[index - main_characters.len()])
    }
}

/// Build the prompt for one chapter generation call.
pub fn build_chapter_prompt(request: &ChapterPromptRequest<'_>) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "You are writing Chapter {} of a {}-chapter novel.\n",
        request.global_chapter, request.total_chapters
    ));
    if request.book_count > 1 {
        prompt.push_str(&format!(
            "This is Book {} of {}, chapter {} of {} within this book.\n",
            request.book, request.book_count, request.chapter, request.chapters_per_book
        ));
    }
    prompt.push('\n');

    if let Some(bible) = request.bible {
        if let Some(tone) = bible.section("themes_&_tone").or_else(|| bible.section("themes_and_tone")) {
            if !tone.is_empty() {
                prompt.push_str(&format!("TONE AND THEMES:\n{}\n\n", tone));
            }
        }
    }

    if request.is_first_of_book() {
        push_world_context(&mut prompt, request.registries);
        prompt.push_str("This is the opening chapter of the book. Introduce:\n");
        prompt.push_str("- The main setting\n");
        prompt.push_str("- The central characters\n");
        prompt.push_str("- The conflict or mystery to be explored\n\n");
        prompt.push_str("End the chapter with a hook that leads into the next chapter.\n");
    } else if request.is_final_of_run() {
        prompt.push_str("THE STORY SO FAR:\n");
        prompt.push_str(request.story_so_far);
        prompt.push_str("\n\n");
        prompt.push_str(
            "This is the final chapter. Resolve every open arc and bring \
             the story to a definitive close.\n",
        );
    } else {
        prompt.push_str("SUMMARY OF PRIOR CHAPTERS:\n");
        prompt.push_str(request.story_so_far);
        prompt.push_str("\n\n");
        prompt.push_str(
            "Continue the story. Keep the tone, characters and setting \
             consistent. Deepen the character arcs and escalate the tension.\n",
        );
    }

    if let Some(narrator) = narrator_for_chapter(
        &request.registries.main_characters,
        &request.registries.side_characters,
        request.global_chapter,
    ) {
        prompt.push_str(&format!(
            "\nNarrate this chapter from the point of view of: {}\n",
            narrator.summary_line()
        ));
    }

    if let Some(entry) = request.outline_entry {
        prompt.push_str(&format!(
            "\nThis chapter's outline: {}. {}\n",
            entry.title, entry.summary
        ));
    }

    prompt.push_str(&format!(
        "\nWrite approximately {} words. Begin with the heading \
         '## Chapter {}: Title'.\n",
        request.chapter_words, request.global_chapter
    ));

    if request.request_illustration_prompt {
        prompt.push_str(&format!(
            "At the very end, add one line starting with '{}' describing a \
             single striking scene from this chapter in under {} words.\n",
            ILLUSTRATION_MARKER, ILLUSTRATION_PROMPT_WORDS
        ));
    }

    prompt
}

fn push_world_context(prompt: &mut String, registries: &WorldRegistries) {
    if !registries.locations.is_empty() {
        prompt.push_str("SETTING LOCATIONS:\n");
        for location in &registries.locations {
            prompt.push_str(&format!("- {}\n", location.summary_line()));
        }
        prompt.push('\n');
    }
    if !registries.main_characters.is_empty() {
        prompt.push_str("MAIN CHARACTERS:\n");
        for character in &registries.main_characters {
            prompt.push_str(&format!("- {}\n", character.summary_line()));
        }
        prompt.push('\n');
    }
    if !registries.side_characters.is_empty() {
        prompt.push_str("SIDE CHARACTERS:\n");
        for character in &registries.side_characters {
            prompt.push_str(&format!("- {}\n", character.summary_line()));
        }
        prompt.push('\n');
    }
}

/// Build the narrative bible prompt: one call that produces the
/// sectioned world-building document.
pub fn build_bible_prompt(title: &str, chapter_count: u32) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "You are helping write a novel titled \"{}\".\n\n",
        title
    ));
    prompt.push_str("Please generate a Narrative Bible for the story that includes:\n\n");
    prompt.push_str(
        "1. **Characters**: At least 6 major characters, including name, \
         role, background, motivations, and relationships to others.\n\n",
    );
    prompt.push_str(
        "2. **Locations**: At least 5 detailed locations. Include political \
         significance or historical notes.\n\n",
    );
    prompt.push_str(
        "3. **Themes & Tone**: Describe the narrative voice, primary themes, \
         and general tone of the novel.\n\n",
    );
    prompt.push_str(&format!(
        "4. **Plot Outline**: Create a {}-chapter outline that traces a \
         primary arc. Include major events, conflicts, and turning points.\n\n",
        chapter_count
    ));
    prompt.push_str(
        "Present the content in Markdown-like readable structure with '## ' \
         section headings.\n",
    );
    prompt
}

/// Build the outline prompt: a dedicated call whose response carries a
/// JSON chapter plan for the extractor to recover.
pub fn build_outline_prompt(title: &str, chapter_count: u32, bible: Option<&StoryBible>) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Plan the chapters of a {}-chapter novel titled \"{}\".\n\n",
        chapter_count, title
    ));
    if let Some(bible) = bible {
        if let Some(plot) = bible.section("plot_outline") {
            if !plot.is_empty() {
                prompt.push_str(&format!("Follow this plot outline:\n{}\n\n", plot));
            }
        }
    }
    prompt.push_str(&format!(
        "Respond with a JSON array of exactly {} objects, each of the form \
         {{\"chapter\": <number>, \"title\": \"...\", \"summary\": \"...\"}}. \
         Keep each summary under 40 words.\n",
        chapter_count
    ));
    prompt
}

/// Render one curation prompt: the template, the rejected block so the
/// model avoids repeating rejected ideas, and the optional gender-bias
/// directive.
pub fn render_curation_prompt(template: &str, rejected: &[String], bias_male: bool) -> String {
    let mut prompt = template.trim_end().to_string();
    if !rejected.is_empty() {
        prompt.push_str("\n\nDo not repeat any of these rejected suggestions:\n");
        prompt.push_str(&rejected.join("\n"));
    }
    if bias_male {
        prompt.push_str("\n\n");
        prompt.push_str(MALE_BIAS_DIRECTIVE);
    }
    prompt.push('\n');
    prompt
}

/// Prompt template for curating one location suggestion.
pub fn location_template(title: &str) -> String {
    format!(
        "You are building the world of a novel titled \"{}\".\n\
         Suggest one new location: a city, station, region or landmark. \
         Give its name, a physical description, and its political or \
         historical significance. Respond with a single short paragraph.",
        title
    )
}

/// Prompt template for curating one main character suggestion.
pub fn main_character_template(title: &str) -> String {
    format!(
        "You are casting the main characters of a novel titled \"{}\".\n\
         Suggest one new major character. Give their name, role, key \
         traits, and backstory. Respond with a single short paragraph.",
        title
    )
}

/// Prompt template for curating one side character suggestion.
pub fn side_character_template(title: &str) -> String {
    format!(
        "You are casting expendable side characters for a novel titled \"{}\".\n\
         Suggest one new minor character. Give their name, role, and one \
         memorable trait. Respond with a single short paragraph.",
        title
    )
}

/// Fallback cover prompt when no chapter embedded an illustration line.
pub fn build_cover_prompt(title: &str, bible: Option<&StoryBible>) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Describe a single striking cover image for a novel titled \"{}\".\n",
        title
    ));
    if let Some(bible) = bible {
        if let Some(tone) = bible.section("themes_&_tone").or_else(|| bible.section("themes_and_tone")) {
            if !tone.is_empty() {
                prompt.push_str(&format!("Match this tone:\n{}\n", tone));
            }
        }
    }
    prompt.push_str(&format!(
        "Respond with one visual description under {} words. No commentary.\n",
        ILLUSTRATION_PROMPT_WORDS
    ));
    prompt
}

/// Last embedded illustration line in the accumulated narrative, if any
/// chapter emitted one.
pub fn illustration_prompt_from(text: &str) -> Option<String> {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with(ILLUSTRATION_MARKER))
        .map(|line| line[ILLUSTRATION_MARKER.len()..].trim().to_string())
        .filter(|line| !line.is_empty())
}

/// Truncate text to at most `max_words` whitespace-separated words.
/// The downstream image model enforces an input-length limit.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityKind;

    fn character(name: &str) -> StoryEntity {
        StoryEntity::new(EntityKind::Character, name)
    }

    fn registries(main: usize, side: usize) -> WorldRegistries {
        WorldRegistries {
            locations: vec![StoryEntity::new(EntityKind::Location, "Keth Station")],
            main_characters: (0..main).map(|i| character(&format!("Main {}", i))).collect(),
            side_characters: (0..side).map(|i| character(&format!("Side {}", i))).collect(),
        }
    }

    #[test]
    fn test_narrator_round_robin_property() {
        for main in 0..4usize {
            for side in 0..4usize {
                let regs = registries(main, side);
                let pool: Vec<&StoryEntity> = regs
                    .main_characters
                    .iter()
                    .chain(regs.side_characters.iter())
                    .collect();
                for chapter in 1..=20u32 {
                    let narrator = narrator_for_chapter(
                        &regs.main_characters,
                        &regs.side_characters,
                        chapter,
                    );
                    if pool.is_empty() {
                        assert!(narrator.is_none());
                    } else {
                        let expected = pool[(chapter as usize - 1) % pool.len()];
                        assert_eq!(
                            narrator.unwrap().description,
                            expected.description,
                            "chapter {} with pool {}+{}",
                            chapter,
                            main,
                            side
                        );
                    }
                }
            }
        }
    }

    fn request<'a>(
        regs: &'a WorldRegistries,
        chapter: u32,
        global: u32,
        total: u32,
    ) -> ChapterPromptRequest<'a> {
        ChapterPromptRequest {
            book: 1,
            book_count: 1,
            chapter,
            chapters_per_book: total,
            global_chapter: global,
            total_chapters: total,
            chapter_words: 1000,
            outline_entry: None,
            bible: None,
            registries: regs,
            story_so_far: "Previously, the station fell silent.",
            request_illustration_prompt: false,
        }
    }

    #[test]
    fn test_first_chapter_prompt_has_world_context() {
        let regs = registries(2, 1);
        let prompt = build_chapter_prompt(&request(&regs, 1, 1, 12));

        assert!(prompt.contains("Chapter 1 of a 12-chapter novel"));
        assert!(prompt.contains("SETTING LOCATIONS:"));
        assert!(prompt.contains("Keth Station"));
        assert!(prompt.contains("MAIN CHARACTERS:"));
        assert!(prompt.contains("hook"));
        assert!(!prompt.contains("STORY SO FAR"));
    }

    #[test]
    fn test_interior_chapter_prompt_continues() {
        let regs = registries(2, 1);
        let prompt = build_chapter_prompt(&request(&regs, 5, 5, 12));

        assert!(prompt.contains("SUMMARY OF PRIOR CHAPTERS:"));
        assert!(prompt.contains("the station fell silent"));
        assert!(prompt.contains("escalate the tension"));
    }

    #[test]
    fn test_final_chapter_prompt_resolves() {
        let regs = registries(2, 1);
        let prompt = build_chapter_prompt(&request(&regs, 12, 12, 12));

        assert!(prompt.contains("THE STORY SO FAR:"));
        assert!(prompt.contains("Resolve every open arc"));
    }

    #[test]
    fn test_illustration_directive_is_configurable() {
        let regs = registries(1, 0);
        let mut req = request(&regs, 3, 3, 12);
        req.request_illustration_prompt = true;
        let prompt = build_chapter_prompt(&req);
        assert!(prompt.contains(ILLUSTRATION_MARKER));
    }

    #[test]
    fn test_curation_prompt_carries_rejections_and_bias() {
        let rejected = vec!["A moon base".to_string(), "A desert fort".to_string()];
        let prompt = render_curation_prompt("Suggest a location.", &rejected, true);

        assert!(prompt.contains("Do not repeat"));
        assert!(prompt.contains("A moon base\nA desert fort"));
        assert!(prompt.contains(MALE_BIAS_DIRECTIVE));

        let plain = render_curation_prompt("Suggest a location.", &[], false);
        assert!(!plain.contains("Do not repeat"));
        assert!(!plain.contains(MALE_BIAS_DIRECTIVE));
    }

    #[test]
    fn test_truncate_words() {
        let text = "one two three four five";
        assert_eq!(truncate_words(text, 3), "one two three");
        assert_eq!(truncate_words(text, 10), text);
        assert_eq!(truncate_words("", 5), "");
    }

    #[test]
    fn test_illustration_prompt_takes_last_marker() {
        let text = "body\nIllustration: an old sketch\nmore body\nIllustration: a burning station\n";
        assert_eq!(
            illustration_prompt_from(text).as_deref(),
            Some("a burning station")
        );
        assert!(illustration_prompt_from("no markers here").is_none());
    }
}
