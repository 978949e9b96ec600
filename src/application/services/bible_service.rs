//! Narrative bible stage - one generation call, two persisted forms
//!
//! The bible is written both as human-readable markdown and as a
//! best-effort JSON section map. Later stages read it back from disk;
//! a missing file there is fatal.

use thiserror::Error;

use crate::application::ports::outbound::LlmPort;
use crate::application::services::llm::prompt_builder;
use crate::domain::entities::StoryBible;
use crate::infrastructure::storage::{ArtifactStore, StorageError};

#[derive(Debug, Error)]
pub enum BibleError {
    #[error("generation service failed: {0}")]
    Generation(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct BibleService<'a, L: LlmPort> {
    llm: &'a L,
    model: &'a str,
    store: &'a ArtifactStore,
}

impl<'a, L: LlmPort> BibleService<'a, L> {
    pub fn new(llm: &'a L, model: &'a str, store: &'a ArtifactStore) -> Self {
        Self { llm, model, store }
    }

    /// Generate the bible and persist both forms.
    pub async fn generate(&self, title: &str, chapter_count: u32) -> Result<StoryBible, BibleError> {
        let prompt = prompt_builder::build_bible_prompt(title, chapter_count);
        let raw = self
            .llm
            .generate(self.model, &prompt)
            .await
            .map_err(|e| BibleError::Generation(e.to_string()))?;

        let bible = StoryBible::parse(raw);
        let (txt, json) = self.store.save_bible(&bible)?;
        tracing::info!(
            "Saved narrative bible to {} and {} ({} sections)",
            txt.display(),
            json.display(),
            bible.sections.len()
        );
        Ok(bible)
    }

    /// Load a previously generated bible from disk.
    ///
    /// Absence is a `StorageError::MissingInput`: the chapter stage
    /// cannot proceed without the bible artifact.
    pub fn load(&self) -> Result<StoryBible, StorageError> {
        self.store.load_bible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedLlm(&'static str);

    #[async_trait]
    impl LlmPort for CannedLlm {
        type Error = std::io::Error;

        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, Self::Error> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_generate_persists_both_forms() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        let llm = CannedLlm("## Characters\nSix.\n## Themes & Tone\nGrim.");

        let service = BibleService::new(&llm, "test-model", &store);
        let bible = service.generate("Test Novel", 12).await.unwrap();

        assert_eq!(bible.section("characters"), Some("Six."));
        assert!(dir.path().join("narrative_bible.txt").exists());
        assert!(dir.path().join("narrative_bible.json").exists());

        // Round trip through the store
        let loaded = service.load().unwrap();
        assert_eq!(loaded.section("themes_&_tone"), Some("Grim."));
    }

    #[tokio::test]
    async fn test_load_without_artifact_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        let llm = CannedLlm("");

        let service = BibleService::new(&llm, "test-model", &store);
        assert!(matches!(
            service.load(),
            Err(StorageError::MissingInput(_))
        ));
    }
}
