//! Outbound port for the image-diffusion service

use anyhow::Result;
use async_trait::async_trait;

/// Interface to an image-diffusion service. Blocking, one image per
/// call, no batching.
#[async_trait]
pub trait ImageGenPort: Send + Sync {
    /// Render a raster image for the given prompt at the target size.
    async fn render(&self, prompt: &str, width: u32, height: u32) -> Result<Vec<u8>>;
}
