use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    /// Raw bytes of the uploaded reference image.
    pub base_image: Vec<u8>,
    pub number_of_images: u32,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>, base_image: Vec<u8>) -> Self {
        Self {
            prompt: prompt.into(),
            base_image,
            number_of_images: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedImages {
    pub images: Vec<GeneratedImage>,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    pub generated_image_base64: String,
}

// Vertex AI `:predict` wire types.

#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<PredictInstance>,
    pub parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
pub struct PredictInstance {
    pub prompt: String,
    pub image: EncodedImage,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub bytes_base64_encoded: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    pub sample_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub bytes_base64_encoded: Option<String>,
    pub mime_type: Option<String>,
}
