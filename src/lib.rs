//! Backend for the AI Fashion Studio.
//!
//! Accepts a product photo and a style (`studio` or `street`), asks Vertex AI
//! Imagen for a model shot wearing the product, and relays the generated image
//! back as base64.

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod server;
pub mod vertex;

pub use config::{Config, ServerConfig, VertexConfig};
pub use error::{ApiError, Result, StudioError};
pub use models::{GenerateImageResponse, ImageGenerationRequest, Style};
pub use server::AppState;
pub use vertex::{ImageClient, ImageGenerator, UnavailableGenerator, VertexClient};
