//! Application services - the stages of the narrative pipeline

pub mod bible_service;
pub mod curation_service;
pub mod extraction;
pub mod llm;
pub mod orchestrator_service;
pub mod outline_service;
