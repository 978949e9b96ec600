//! Narrative orchestrator - drives the generation loop across books
//!
//! Owns the StoryState and runs every stage sequentially: curation,
//! bible, outline, the confirmation gate, the chapter loop and the
//! optional cover. One failed chapter is logged and skipped; the run
//! continues with the next chapter and the state is left untouched.

use std::time::Duration;

use thiserror::Error;

use crate::application::ports::outbound::{ImageGenPort, LlmPort, ReviewPort};
use crate::application::services::bible_service::{BibleError, BibleService};
use crate::application::services::curation_service::{
    CurationError, CurationRequest, EntityCurator,
};
use crate::application::services::llm::prompt_builder::{self, ChapterPromptRequest};
use crate::application::services::outline_service::{OutlineError, OutlineService};
use crate::domain::entities::{
    normalize_heading, EntityKind, Outline, StoryBible, StoryEntity, StoryState, WorldRegistries,
};
use crate::infrastructure::storage::{ArtifactStore, StorageError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Curation(#[from] CurationError),
    #[error(transparent)]
    Bible(#[from] BibleError),
    #[error(transparent)]
    Outline(#[from] OutlineError),
    #[error("operator input failed: {0}")]
    Review(#[from] std::io::Error),
    #[error("run aborted by operator")]
    Aborted,
}

/// Feature flags and knobs for one run. All values come from
/// configuration; nothing here is a hidden constant.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model: String,
    pub book_title: String,
    pub book_count: u32,
    pub chapters_per_book: u32,
    pub chapter_words: u32,
    pub chapter_delay: Duration,
    pub curate_entities: bool,
    pub location_count: u32,
    pub main_character_count: u32,
    pub side_character_count: u32,
    pub gender_balance: bool,
    pub regenerate_side_characters: bool,
    pub max_curation_attempts: Option<u32>,
    pub generate_bible: bool,
    pub generate_cover: bool,
    pub context_window_chars: usize,
}

impl PipelineConfig {
    pub fn total_chapters(&self) -> u32 {
        self.book_count * self.chapters_per_book
    }
}

/// Drives the whole pipeline. Single task, fully sequential; the only
/// scheduling device is the fixed pacing delay between chapter calls.
pub struct NarrativeOrchestrator<L: LlmPort> {
    llm: L,
    review: Box<dyn ReviewPort>,
    cover: Option<Box<dyn ImageGenPort>>,
    store: ArtifactStore,
    config: PipelineConfig,
}

impl<L: LlmPort> NarrativeOrchestrator<L> {
    pub fn new(
        llm: L,
        review: Box<dyn ReviewPort>,
        store: ArtifactStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            llm,
            review,
            cover: None,
            store,
            config,
        }
    }

    pub fn with_cover(mut self, cover: Box<dyn ImageGenPort>) -> Self {
        self.cover = Some(cover);
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run all stages and return the accumulated state.
    pub async fn run(&mut self) -> Result<StoryState, PipelineError> {
        let mut registries = if self.config.curate_entities {
            self.curate_world().await?
        } else {
            WorldRegistries::default()
        };

        let bible_service = BibleService::new(&self.llm, &self.config.model, &self.store);
        let bible = if self.config.generate_bible {
            bible_service
                .generate(&self.config.book_title, self.config.total_chapters())
                .await?
        } else {
            // Fatal when the earlier stage never ran
            bible_service.load()?
        };

        let outline = OutlineService::new(&self.llm, &self.config.model, &self.store)
            .generate(
                &self.config.book_title,
                self.config.total_chapters(),
                Some(&bible),
            )
            .await?;

        let question = format!(
            "Generate {} chapters across {} book(s) of \"{}\" now?",
            self.config.total_chapters(),
            self.config.book_count,
            self.config.book_title
        );
        if !self.review.confirm(&question)? {
            return Err(PipelineError::Aborted);
        }

        let mut state = StoryState::new();
        self.generate_chapters(&mut state, &mut registries, &bible, &outline)
            .await?;

        if self.config.generate_cover {
            self.generate_cover_art(&state, &bible).await;
        }

        Ok(state)
    }

    /// The chapter loop. Public so end-to-end scenarios can drive it
    /// with pre-built inputs.
    pub async fn generate_chapters(
        &mut self,
        state: &mut StoryState,
        registries: &mut WorldRegistries,
        bible: &StoryBible,
        outline: &Outline,
    ) -> Result<(), PipelineError> {
        let book_count = self.config.book_count;
        let chapters_per_book = self.config.chapters_per_book;
        let total_chapters = self.config.total_chapters();

        for book in 1..=book_count {
            if book > 1 && self.config.regenerate_side_characters && self.config.curate_entities {
                tracing::info!("Regenerating side characters for book {}", book);
                registries.side_characters = self.curate_side_characters().await?;
            }

            for chapter in 1..=chapters_per_book {
                let global = (book - 1) * chapters_per_book + chapter;
                let outline_entry = outline.for_chapter(global);

                let story_so_far = state.recent_context(self.config.context_window_chars);
                let request = ChapterPromptRequest {
                    book,
                    book_count,
                    chapter,
                    chapters_per_book,
                    global_chapter: global,
                    total_chapters,
                    chapter_words: self.config.chapter_words,
                    outline_entry,
                    bible: Some(bible),
                    registries,
                    story_so_far: &story_so_far,
                    request_illustration_prompt: self.config.generate_cover,
                };
                let prompt = prompt_builder::build_chapter_prompt(&request);

                tracing::info!("Generating book {} chapter {} ({}/{})", book, chapter, global, total_chapters);
                match self.llm.generate(&self.config.model, &prompt).await {
                    Ok(body) => {
                        let title = outline_entry
                            .map(|e| e.title.as_str())
                            .filter(|t| !t.is_empty());
                        let text = normalize_heading(global, title, &body);
                        let path =
                            self.store
                                .save_chapter(book, chapter, book_count, &text)?;
                        state.append_chapter(book, chapter, text);
                        tracing::info!("Saved {}", path.display());
                    }
                    Err(e) => {
                        // Skip, never retry; the state keeps no record
                        tracing::warn!(
                            "Failed to generate book {} chapter {}: {}",
                            book,
                            chapter,
                            e
                        );
                    }
                }

                let last = book == book_count && chapter == chapters_per_book;
                if !last && !self.config.chapter_delay.is_zero() {
                    tokio::time::sleep(self.config.chapter_delay).await;
                }
            }
        }

        Ok(())
    }

    async fn curate_world(&mut self) -> Result<WorldRegistries, PipelineError> {
        let title = self.config.book_title.clone();

        let locations = self
            .curate(CurationRequest {
                label: "location".to_string(),
                kind: EntityKind::Location,
                template: prompt_builder::location_template(&title),
                target_count: self.config.location_count,
                gender_balance: false,
                max_attempts: self.config.max_curation_attempts,
            })
            .await?;

        let main_characters = self
            .curate(CurationRequest {
                label: "main_character".to_string(),
                kind: EntityKind::Character,
                template: prompt_builder::main_character_template(&title),
                target_count: self.config.main_character_count,
                gender_balance: self.config.gender_balance,
                max_attempts: self.config.max_curation_attempts,
            })
            .await?;

        let side_characters = self.curate_side_characters().await?;

        Ok(WorldRegistries {
            locations,
            main_characters,
            side_characters,
        })
    }

    async fn curate_side_characters(&mut self) -> Result<Vec<StoryEntity>, PipelineError> {
        let request = CurationRequest {
            label: "side_character".to_string(),
            kind: EntityKind::Character,
            template: prompt_builder::side_character_template(&self.config.book_title),
            target_count: self.config.side_character_count,
            gender_balance: self.config.gender_balance,
            max_attempts: self.config.max_curation_attempts,
        };
        self.curate(request).await
    }

    async fn curate(
        &mut self,
        request: CurationRequest,
    ) -> Result<Vec<StoryEntity>, PipelineError> {
        let mut curator = EntityCurator::new(
            &self.llm,
            &self.config.model,
            self.review.as_mut(),
            &self.store,
        );
        Ok(curator.curate(&request).await?)
    }

    /// Cover art is an adornment: any failure here is logged and the
    /// run carries on without a cover.
    async fn generate_cover_art(&self, state: &StoryState, bible: &StoryBible) {
        let Some(cover) = self.cover.as_ref() else {
            tracing::warn!("Cover requested but no diffusion client is configured");
            return;
        };

        let prompt = match prompt_builder::illustration_prompt_from(&state.full_text()) {
            Some(embedded) => embedded,
            None => {
                let fallback =
                    prompt_builder::build_cover_prompt(&self.config.book_title, Some(bible));
                match self.llm.generate(&self.config.model, &fallback).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Failed to generate a cover prompt: {}", e);
                        return;
                    }
                }
            }
        };
        let prompt =
            prompt_builder::truncate_words(&prompt, prompt_builder::ILLUSTRATION_PROMPT_WORDS);

        match cover.render(&prompt, 512, 768).await {
            Ok(image) => match self.store.save_cover(&image) {
                Ok(path) => tracing::info!("Saved cover art to {}", path.display()),
                Err(e) => tracing::warn!("Failed to save cover art: {}", e),
            },
            Err(e) => tracing::warn!("Cover rendering failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::Verdict;
    use crate::domain::entities::ChapterOutline;
    use crate::infrastructure::export::{split_chapters, DocumentExporter};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Deterministic stub: "Chapter text {n}" for the n-th call, with
    /// an optional call number that fails instead.
    struct StubLlm {
        calls: AtomicU32,
        fail_on: Option<u32>,
    }

    impl StubLlm {
        fn new(fail_on: Option<u32>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl LlmPort for StubLlm {
        type Error = std::io::Error;

        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, Self::Error> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on == Some(n) {
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "service down",
                ))
            } else {
                Ok(format!("Chapter text {}", n))
            }
        }
    }

    struct AcceptAll;

    impl ReviewPort for AcceptAll {
        fn review(&mut self, _label: &str, _suggestion: &str) -> std::io::Result<Verdict> {
            Ok(Verdict::Accept)
        }

        fn confirm(&mut self, _question: &str) -> std::io::Result<bool> {
            Ok(true)
        }
    }

    fn config(chapters: u32) -> PipelineConfig {
        PipelineConfig {
            model: "test-model".to_string(),
            book_title: "Test Novel".to_string(),
            book_count: 1,
            chapters_per_book: chapters,
            chapter_words: 100,
            chapter_delay: Duration::ZERO,
            curate_entities: false,
            location_count: 0,
            main_character_count: 0,
            side_character_count: 0,
            gender_balance: false,
            regenerate_side_characters: false,
            max_curation_attempts: None,
            generate_bible: true,
            generate_cover: false,
            context_window_chars: 4000,
        }
    }

    fn orchestrator(
        dir: &std::path::Path,
        chapters: u32,
        fail_on: Option<u32>,
    ) -> NarrativeOrchestrator<StubLlm> {
        NarrativeOrchestrator::new(
            StubLlm::new(fail_on),
            Box::new(AcceptAll),
            ArtifactStore::new(dir).unwrap(),
            config(chapters),
        )
    }

    #[tokio::test]
    async fn test_three_chapters_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(dir.path(), 3, None);

        let mut state = StoryState::new();
        let mut registries = WorldRegistries::default();
        let bible = StoryBible::parse("## Characters\nCrew.");
        let outline = Outline::default();

        orch.generate_chapters(&mut state, &mut registries, &bible, &outline)
            .await
            .unwrap();

        assert_eq!(state.chapter_count(), 3);
        let segments = split_chapters(&state.full_text());
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].title, "Chapter 1");
        assert_eq!(segments[1].title, "Chapter 2");
        assert_eq!(segments[2].title, "Chapter 3");
        assert!(segments[0].body.contains("Chapter text 1"));

        for n in 1..=3 {
            assert!(dir
                .path()
                .join("chapters")
                .join(format!("chapter_{:02}.txt", n))
                .exists());
        }

        let exporter = DocumentExporter::new(dir.path(), "AI Generated");
        let artifacts = exporter
            .export(&state.full_text(), "Test Novel", None)
            .unwrap();
        assert!(artifacts.epub.exists());
        assert!(std::fs::metadata(&artifacts.epub).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_failed_chapter_is_skipped_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(dir.path(), 3, Some(2));

        let mut state = StoryState::new();
        let mut registries = WorldRegistries::default();
        let bible = StoryBible::parse("## Characters\nCrew.");
        let outline = Outline::default();

        orch.generate_chapters(&mut state, &mut registries, &bible, &outline)
            .await
            .unwrap();

        // Chapter 2 failed: two segments, original positions retained
        assert_eq!(state.chapter_count(), 2);
        let positions: Vec<_> = state.records().iter().map(|r| r.chapter).collect();
        assert_eq!(positions, vec![1, 3]);

        assert!(dir.path().join("chapters/chapter_01.txt").exists());
        assert!(!dir.path().join("chapters/chapter_02.txt").exists());
        assert!(dir.path().join("chapters/chapter_03.txt").exists());

        let segments = split_chapters(&state.full_text());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].title, "Chapter 1");
        assert_eq!(segments[1].title, "Chapter 3");
    }

    #[tokio::test]
    async fn test_run_aborts_on_declined_confirmation() {
        struct DeclineAll;
        impl ReviewPort for DeclineAll {
            fn review(&mut self, _: &str, _: &str) -> std::io::Result<Verdict> {
                Ok(Verdict::Reject)
            }
            fn confirm(&mut self, _: &str) -> std::io::Result<bool> {
                Ok(false)
            }
        }

        struct OutlineLlm;
        #[async_trait]
        impl LlmPort for OutlineLlm {
            type Error = std::io::Error;
            async fn generate(&self, _m: &str, prompt: &str) -> Result<String, Self::Error> {
                if prompt.contains("JSON array") {
                    Ok("[{\"chapter\": 1, \"title\": \"One\", \"summary\": \"\"}]".to_string())
                } else {
                    Ok("## Characters\nCrew.".to_string())
                }
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(1);
        cfg.generate_bible = true;
        let mut orch = NarrativeOrchestrator::new(
            OutlineLlm,
            Box::new(DeclineAll),
            ArtifactStore::new(dir.path()).unwrap(),
            cfg,
        );

        assert!(matches!(orch.run().await, Err(PipelineError::Aborted)));
        // The bible stage ran before the gate and its artifacts exist
        assert!(dir.path().join("narrative_bible.txt").exists());
        // But no chapter was generated
        let chapters: Vec<_> = std::fs::read_dir(dir.path().join("chapters"))
            .unwrap()
            .collect();
        assert!(chapters.is_empty());
    }

    #[tokio::test]
    async fn test_missing_bible_aborts_when_stage_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(1);
        cfg.generate_bible = false;
        let mut orch = NarrativeOrchestrator::new(
            StubLlm::new(None),
            Box::new(AcceptAll),
            ArtifactStore::new(dir.path()).unwrap(),
            cfg,
        );

        assert!(matches!(
            orch.run().await,
            Err(PipelineError::Storage(StorageError::MissingInput(_)))
        ));
    }

    #[tokio::test]
    async fn test_outline_titles_flow_into_headings() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(dir.path(), 2, None);

        let mut state = StoryState::new();
        let mut registries = WorldRegistries::default();
        let bible = StoryBible::parse("## Characters\nCrew.");
        let outline = Outline::new(vec![
            ChapterOutline {
                chapter: 1,
                title: "Arrival".to_string(),
                summary: "Docking.".to_string(),
            },
            ChapterOutline {
                chapter: 2,
                title: "Descent".to_string(),
                summary: "Down.".to_string(),
            },
        ]);

        orch.generate_chapters(&mut state, &mut registries, &bible, &outline)
            .await
            .unwrap();

        let segments = split_chapters(&state.full_text());
        assert_eq!(segments[0].title, "Chapter 1: Arrival");
        assert_eq!(segments[1].title, "Chapter 2: Descent");
    }
}
