//! Outline stage - one generation call recovered through the extractor

use thiserror::Error;

use crate::application::ports::outbound::LlmPort;
use crate::application::services::extraction::{self, ExtractionError};
use crate::application::services::llm::prompt_builder;
use crate::domain::entities::{ChapterOutline, Outline, StoryBible};
use crate::infrastructure::storage::{ArtifactStore, StorageError};

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("generation service failed: {0}")]
    Generation(String),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("outline payload has the wrong shape: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct OutlineService<'a, L: LlmPort> {
    llm: &'a L,
    model: &'a str,
    store: &'a ArtifactStore,
}

impl<'a, L: LlmPort> OutlineService<'a, L> {
    pub fn new(llm: &'a L, model: &'a str, store: &'a ArtifactStore) -> Self {
        Self { llm, model, store }
    }

    /// Produce the chapter plan once; it is read-only afterward.
    pub async fn generate(
        &self,
        title: &str,
        chapter_count: u32,
        bible: Option<&StoryBible>,
    ) -> Result<Outline, OutlineError> {
        let prompt = prompt_builder::build_outline_prompt(title, chapter_count, bible);
        let raw = self
            .llm
            .generate(self.model, &prompt)
            .await
            .map_err(|e| OutlineError::Generation(e.to_string()))?;

        let value = extraction::extract(&raw)?;
        let chapters: Vec<ChapterOutline> =
            serde_json::from_value(value).map_err(OutlineError::Malformed)?;

        let outline = Outline::new(chapters);
        let path = self.store.save_outline(&outline)?;
        tracing::info!(
            "Saved {}-chapter outline to {}",
            outline.chapters.len(),
            path.display()
        );
        Ok(outline)
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
    async fn test_outline_recovered_from_noisy_response() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        let llm = CannedLlm(
            "Here is your plan:\n[\
             {\"chapter\": 1, \"title\": \"Arrival\", \"summary\": \"Docking.\"},\
             {\"chapter\": 2, \"title\": \"Descent\"}]\nEnjoy!",
        );

        let outline = OutlineService::new(&llm, "test-model", &store)
            .generate("Test Novel", 2, None)
            .await
            .unwrap();

        assert_eq!(outline.chapters.len(), 2);
        assert_eq!(outline.for_chapter(1).unwrap().summary, "Docking.");
        assert_eq!(outline.for_chapter(2).unwrap().summary, "");
        assert!(dir.path().join("outline.json").exists());
    }

    #[tokio::test]
    async fn test_prose_only_response_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        let llm = CannedLlm("I cannot produce an outline right now.");

        let result = OutlineService::new(&llm, "test-model", &store)
            .generate("Test Novel", 2, None)
            .await;

        assert!(matches!(result, Err(OutlineError::Extraction(_))));
    }
}
