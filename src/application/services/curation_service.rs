//! Entity curation - the propose/accept/reject loop
//!
//! Repeatedly asks the generation service for one suggestion, presents
//! it to the operator, and keeps rejected suggestions in the prompt so
//! the model avoids repeating them. Acceptance is the only way an
//! entity enters a registry. By default the loop has no upper bound;
//! `max_attempts` is the configurable escape hatch.

use thiserror::Error;

use crate::application::ports::outbound::{LlmPort, ReviewPort, Verdict};
use crate::application::services::llm::prompt_builder;
use crate::domain::entities::{EntityKind, StoryEntity};
use crate::domain::services::classification;
use crate::domain::value_objects::GenderTally;
use crate::infrastructure::storage::{ArtifactStore, StorageError};

#[derive(Debug, Error)]
pub enum CurationError {
    #[error("generation service failed: {0}")]
    Generation(String),
    #[error("operator input failed: {0}")]
    Review(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("gave up on '{label}' after {attempts} attempts with {accepted} of {target} accepted")]
    AttemptsExhausted {
        label: String,
        attempts: u32,
        accepted: u32,
        target: u32,
    },
}

/// One curation task: which entity class to fill and how.
#[derive(Debug, Clone)]
pub struct CurationRequest {
    /// Short class label used in operator prompts and artifact names,
    /// e.g. "location" or "main_character".
    pub label: String,
    pub kind: EntityKind,
    /// Base prompt template the rejection block is appended to.
    pub template: String,
    pub target_count: u32,
    /// Apply the male/female balancing directive while proposing.
    pub gender_balance: bool,
    /// Escape hatch for non-interactive runs; `None` means unbounded.
    pub max_attempts: Option<u32>,
}

/// Runs the human-in-the-loop acceptance filter for one entity class.
pub struct EntityCurator<'a, L: LlmPort> {
    llm: &'a L,
    model: &'a str,
    review: &'a mut dyn ReviewPort,
    store: &'a ArtifactStore,
}

impl<'a, L: LlmPort> EntityCurator<'a, L> {
    pub fn new(
        llm: &'a L,
        model: &'a str,
        review: &'a mut dyn ReviewPort,
        store: &'a ArtifactStore,
    ) -> Self {
        Self {
            llm,
            model,
            review,
            store,
        }
    }

    /// Loop until `target_count` suggestions have been accepted.
    ///
    /// Accepted entities are persisted immediately as standalone files
    /// tagged with their keyword category. Rejected suggestions feed
    /// the avoidance block of every later prompt.
    pub async fn curate(
        &mut self,
        request: &CurationRequest,
    ) -> Result<Vec<StoryEntity>, CurationError> {
        let mut accepted: Vec<StoryEntity> = Vec::new();
        let mut rejected: Vec<String> = Vec::new();
        let mut tally = GenderTally::default();
        let mut attempts: u32 = 0;

        while (accepted.len() as u32) < request.target_count {
            if let Some(max) = request.max_attempts {
                if attempts >= max {
                    return Err(CurationError::AttemptsExhausted {
                        label: request.label.clone(),
                        attempts,
                        accepted: accepted.len() as u32,
                        target: request.target_count,
                    });
                }
            }
            attempts += 1;

            let bias_male = request.gender_balance && tally.needs_male_bias();
            let prompt =
                prompt_builder::render_curation_prompt(&request.template, &rejected, bias_male);

            let suggestion = self
                .llm
                .generate(self.model, &prompt)
                .await
                .map_err(|e| CurationError::Generation(e.to_string()))?;

            match self.review.review(&request.label, &suggestion)? {
                Verdict::Accept => {
                    let entity = StoryEntity::new(request.kind, suggestion);
                    let path = self.store.save_entity(&request.label, &entity)?;
                    tally.record(classification::gender_signal(&entity.description));
                    tracing::info!(
                        "Accepted {} {}/{} ({}): {}",
                        request.label,
                        accepted.len() + 1,
                        request.target_count,
                        entity.category,
                        path.display()
                    );
                    accepted.push(entity);
                }
                Verdict::Reject => {
                    tracing::debug!("Rejected {} suggestion #{}", request.label, attempts);
                    rejected.push(suggestion);
                }
            }
        }

        Ok(accepted)
    }
}
