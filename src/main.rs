//! NovelForge - Long-form narrative generation pipeline
//!
//! The pipeline is a single sequential run that:
//! - Curates world-building entities with operator approval
//! - Generates a narrative bible and chapter outline via Ollama
//! - Generates chapters one at a time, accumulating story context
//! - Optionally renders cover art through a local diffusion server
//! - Exports the result as flat text, HTML and EPUB

mod application;
mod domain;
mod infrastructure;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::orchestrator_service::NarrativeOrchestrator;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::console::ConsoleReview;
use crate::infrastructure::diffusion::DiffusionClient;
use crate::infrastructure::export::DocumentExporter;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::storage::ArtifactStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "novelforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting NovelForge");

    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Ollama: {} ({})", config.ollama_base_url, config.ollama_model);
    tracing::info!("  Output: {}", config.output_dir);
    tracing::info!(
        "  Plan: {} book(s) x {} chapters, ~{} words each",
        config.book_count,
        config.chapters_per_book,
        config.chapter_words
    );

    let store = ArtifactStore::new(&config.output_dir)?;
    let llm = OllamaClient::new(&config.ollama_base_url);

    let mut orchestrator = NarrativeOrchestrator::new(
        llm,
        Box::new(ConsoleReview::new()),
        store,
        config.pipeline(),
    );
    if config.generate_cover {
        tracing::info!("  Diffusion: {}", config.diffusion_base_url);
        orchestrator =
            orchestrator.with_cover(Box::new(DiffusionClient::new(&config.diffusion_base_url)));
    }

    let state = orchestrator.run().await?;
    if state.is_empty() {
        tracing::warn!("No chapters were generated; nothing to export");
        return Ok(());
    }
    tracing::info!("Generated {} chapters", state.chapter_count());

    let cover_path = orchestrator.store().cover_path();
    let cover = config.generate_cover.then_some(cover_path.as_path());

    let exporter = DocumentExporter::new(orchestrator.store().root(), &config.author);
    let artifacts = exporter.export(&state.full_text(), &config.book_title, cover)?;

    tracing::info!("Run complete");
    tracing::info!("  Text: {}", artifacts.text.display());
    tracing::info!("  HTML: {}", artifacts.html.display());
    tracing::info!("  EPUB: {}", artifacts.epub.display());

    Ok(())
}
