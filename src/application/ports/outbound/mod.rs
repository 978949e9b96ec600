//! Outbound ports - Interfaces that the application requires from external systems

mod image_port;
mod llm_port;
mod review_port;

pub use image_port::ImageGenPort;
pub use llm_port::LlmPort;
pub use review_port::{ReviewPort, Verdict};
