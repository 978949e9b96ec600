//! Client for a local txt2img diffusion server
//!
//! Talks to an Automatic1111-compatible API. One image per request,
//! returned base64-encoded in the response body.

use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::ImageGenPort;

pub struct DiffusionClient {
    client: Client,
    base_url: String,
}

impl DiffusionClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Render one image synchronously and return the decoded bytes.
    pub async fn txt2img(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, DiffusionError> {
        let request = Txt2ImgRequest {
            prompt,
            width,
            height,
            steps: 30,
        };

        let response = self
            .client
            .post(format!("{}/sdapi/v1/txt2img", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(DiffusionError::Api(error_text));
        }

        let body: Txt2ImgResponse = response.json().await?;
        let encoded = body.images.first().ok_or(DiffusionError::Empty)?;
        Ok(BASE64.decode(encoded)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiffusionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("response carried no image")]
    Empty,
    #[error("image payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

#[derive(Debug, Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
    steps: u32,
}

#[derive(Debug, Deserialize)]
struct Txt2ImgResponse {
    images: Vec<String>,
}

#[async_trait]
impl ImageGenPort for DiffusionClient {
    async fn render(&self, prompt: &str, width: u32, height: u32) -> Result<Vec<u8>> {
        Ok(self.txt2img(prompt, width, height).await?)
    }
}
