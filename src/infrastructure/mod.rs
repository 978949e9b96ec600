//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Ollama: text-generation client
//! - Diffusion: cover-art client for a local txt2img server
//! - Console: interactive operator input
//! - Storage: output directory layout and artifact writes
//! - Export: flat text, HTML and EPUB assembly
//! - Config: application configuration

pub mod config;
pub mod console;
pub mod diffusion;
pub mod export;
pub mod ollama;
pub mod storage;
