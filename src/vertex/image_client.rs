use crate::{
    error::{Result, StudioError},
    models::{
        EncodedImage, GeneratedImage, GeneratedImages, ImageGenerationRequest, PredictInstance,
        PredictParameters, PredictRequest, PredictResponse,
    },
    vertex::{auth::AccessTokenProvider, ImageGenerator},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use secrecy::ExposeSecret;
use std::sync::Arc;

#[derive(Clone)]
pub struct ImageClient {
    http: Client,
    auth: Arc<dyn AccessTokenProvider>,
    predict_url: String,
    model_id: String,
}

impl ImageClient {
    pub fn new(
        http: Client,
        auth: Arc<dyn AccessTokenProvider>,
        predict_url: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            predict_url: predict_url.into(),
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn build_payload(request: &ImageGenerationRequest) -> PredictRequest {
        PredictRequest {
            instances: vec![PredictInstance {
                prompt: request.prompt.clone(),
                image: EncodedImage {
                    bytes_base64_encoded: STANDARD.encode(&request.base_image),
                },
            }],
            parameters: PredictParameters {
                sample_count: request.number_of_images,
            },
        }
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, request: ImageGenerationRequest) -> Result<GeneratedImages> {
        let payload = Self::build_payload(&request);
        let token = self.auth.access_token().await?;

        log::info!(
            "Generating {} image(s) with model: {}",
            request.number_of_images,
            self.model_id
        );

        let response = self
            .http
            .post(&self.predict_url)
            .bearer_auth(token.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StudioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let predict: PredictResponse = serde_json::from_slice(&body)
            .map_err(|e| StudioError::Response(format!("Malformed predict response: {}", e)))?;

        let images = predict
            .predictions
            .into_iter()
            .filter_map(|p| p.bytes_base64_encoded.map(|b64| (b64, p.mime_type)))
            .map(|(b64, mime_type)| {
                let bytes = STANDARD
                    .decode(b64.as_bytes())
                    .map_err(|e| StudioError::Decode(e.to_string()))?;
                Ok(GeneratedImage { bytes, mime_type })
            })
            .collect::<Result<Vec<_>>>()?;

        if images.is_empty() {
            return Err(StudioError::Response("No images generated".into()));
        }

        Ok(GeneratedImages {
            images,
            model: self.model_id.clone(),
        })
    }
}
