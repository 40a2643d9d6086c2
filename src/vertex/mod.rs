pub mod auth;
pub mod image_client;

use crate::{
    config::VertexConfig,
    error::{Result, StudioError},
    models::{GeneratedImages, ImageGenerationRequest},
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

pub use auth::{AccessTokenProvider, ServiceAccountAuth, ServiceAccountKey};
pub use image_client::ImageClient;

/// Anything that can turn a prompt plus reference image into generated images.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: ImageGenerationRequest) -> Result<GeneratedImages>;
}

#[derive(Clone)]
pub struct VertexClient {
    image_client: ImageClient,
    config: VertexConfig,
}

impl VertexClient {
    /// Loads the service account key and prepares the Imagen client.
    pub async fn new(config: VertexConfig) -> Result<Self> {
        let key = ServiceAccountKey::from_file(&config.credentials_path).await?;

        if let Some(key_project) = key.project_id.as_deref() {
            if key_project != config.project_id {
                log::warn!(
                    "Credentials belong to project '{}' but requests target '{}'",
                    key_project,
                    config.project_id
                );
            }
        }

        let http = Client::builder()
            .user_agent(concat!("fashion-studio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let auth = ServiceAccountAuth::new(key, http.clone())?;

        log::debug!("Using service account {}", auth.client_email());

        let image_client = ImageClient::new(
            http,
            Arc::new(auth),
            config.predict_url(),
            config.model_id.clone(),
        );

        Ok(Self {
            image_client,
            config,
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn config(&self) -> &VertexConfig {
        &self.config
    }
}

#[async_trait]
impl ImageGenerator for VertexClient {
    async fn generate(&self, request: ImageGenerationRequest) -> Result<GeneratedImages> {
        self.image_client.generate(request).await
    }
}

/// Stands in for the client when startup initialisation failed, so the
/// server still comes up and each request reports the original cause.
#[derive(Debug, Clone)]
pub struct UnavailableGenerator {
    reason: String,
}

impl UnavailableGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ImageGenerator for UnavailableGenerator {
    async fn generate(&self, _request: ImageGenerationRequest) -> Result<GeneratedImages> {
        Err(StudioError::Unavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY_FIXTURE: &str = include_str!("../../tests/fixtures/service_account_key.json");

    #[tokio::test]
    async fn test_new_with_missing_credentials_file() {
        let config = VertexConfig::new().with_credentials_path("/nonexistent/key.json");
        let err = VertexClient::new(config).await.err().unwrap();
        assert!(matches!(err, StudioError::Config(ref msg) if msg.contains("/nonexistent/key.json")));
    }

    #[tokio::test]
    async fn test_new_with_valid_credentials_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KEY_FIXTURE.as_bytes()).unwrap();

        let config = VertexConfig::new()
            .with_project("fashion-studio-test")
            .with_credentials_path(file.path());
        let client = VertexClient::new(config).await.unwrap();

        assert_eq!(client.image().model_id(), "imagegeneration@005");
        assert_eq!(client.config().project_id, "fashion-studio-test");
    }

    #[tokio::test]
    async fn test_unavailable_generator_reports_reason() {
        let generator = UnavailableGenerator::new("Cannot read credentials file");
        let err = generator
            .generate(ImageGenerationRequest::new("p", vec![]))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Image client unavailable: Cannot read credentials file"
        );
    }
}
