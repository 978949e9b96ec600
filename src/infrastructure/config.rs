//! Application configuration
//!
//! Everything is environment-driven; there are no command-line flags.
//! A `.env` file is honored via dotenvy in main.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::services::orchestrator_service::PipelineConfig;

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ollama API base URL
    pub ollama_base_url: String,
    /// Model identifier for generation requests
    pub ollama_model: String,
    /// txt2img diffusion server URL (used only when a cover is requested)
    pub diffusion_base_url: String,

    /// Output directory for all artifacts
    pub output_dir: String,
    /// Book title used in prompts and document metadata
    pub book_title: String,
    /// Author string embedded in exported documents
    pub author: String,

    /// Number of books in the run
    pub book_count: u32,
    /// Chapters per book
    pub chapters_per_book: u32,
    /// Approximate word target per chapter
    pub chapter_words: u32,
    /// Pacing delay between chapter calls, in seconds
    pub chapter_delay_secs: u64,

    /// Run the interactive entity curation stage
    pub curate_entities: bool,
    pub location_count: u32,
    pub main_character_count: u32,
    pub side_character_count: u32,
    /// Apply the gender-balancing directive during character curation
    pub gender_balance: bool,
    /// Replace side characters between books
    pub regenerate_side_characters: bool,
    /// Curation escape hatch; unset means unbounded
    pub max_curation_attempts: Option<u32>,

    /// Generate the narrative bible (otherwise it must exist on disk)
    pub generate_bible: bool,
    /// Generate cover art through the diffusion server
    pub generate_cover: bool,

    /// Character budget for the "story so far" prompt section
    pub context_window_chars: usize,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| "llama3.2:latest".to_string()),
            diffusion_base_url: env::var("DIFFUSION_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:7860".to_string()),

            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "novel_out".to_string()),
            book_title: env::var("BOOK_TITLE")
                .unwrap_or_else(|_| "Dark Fantasy Novel".to_string()),
            author: env::var("BOOK_AUTHOR").unwrap_or_else(|_| "AI Generated".to_string()),

            book_count: parse_env("BOOK_COUNT", 1)?,
            chapters_per_book: parse_env("CHAPTER_COUNT", 12)?,
            chapter_words: parse_env("CHAPTER_WORDS", 1000)?,
            chapter_delay_secs: parse_env("CHAPTER_DELAY_SECS", 5)?,

            curate_entities: flag_env("CURATE_ENTITIES", false),
            location_count: parse_env("LOCATION_COUNT", 5)?,
            main_character_count: parse_env("MAIN_CHARACTER_COUNT", 6)?,
            side_character_count: parse_env("SIDE_CHARACTER_COUNT", 4)?,
            gender_balance: flag_env("GENDER_BALANCE", false),
            regenerate_side_characters: flag_env("REGENERATE_SIDE_CHARACTERS", false),
            max_curation_attempts: match env::var("MAX_CURATION_ATTEMPTS") {
                Ok(raw) => Some(
                    raw.parse()
                        .context("MAX_CURATION_ATTEMPTS must be a number")?,
                ),
                Err(_) => None,
            },

            generate_bible: flag_env("GENERATE_BIBLE", true),
            generate_cover: flag_env("GENERATE_COVER", false),

            context_window_chars: parse_env("CONTEXT_WINDOW_CHARS", 4000)?,
        })
    }

    /// Project the loaded settings into the orchestrator's view.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            model: self.ollama_model.clone(),
            book_title: self.book_title.clone(),
            book_count: self.book_count,
            chapters_per_book: self.chapters_per_book,
            chapter_words: self.chapter_words,
            chapter_delay: Duration::from_secs(self.chapter_delay_secs),
            curate_entities: self.curate_entities,
            location_count: self.location_count,
            main_character_count: self.main_character_count,
            side_character_count: self.side_character_count,
            gender_balance: self.gender_balance,
            regenerate_side_characters: self.regenerate_side_characters,
            max_curation_attempts: self.max_curation_attempts,
            generate_bible: self.generate_bible,
            generate_cover: self.generate_cover,
            context_window_chars: self.context_window_chars,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

fn flag_env(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}
