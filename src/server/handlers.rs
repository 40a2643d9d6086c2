use crate::{
    error::ApiError,
    logger,
    models::{GenerateImageResponse, ImageGenerationRequest, Style},
    server::AppState,
    vertex::ImageGenerator,
};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::TryStreamExt;
use serde::Deserialize;
use uuid::Uuid;

pub const IMAGE_FIELD: &str = "product_image";
pub const STYLE_FIELD: &str = "style";

#[derive(Debug, Deserialize)]
pub struct StyleQuery {
    pub style: Option<String>,
}

#[derive(Debug, Default)]
struct UploadForm {
    image: Option<Vec<u8>>,
    style: Option<String>,
}

/// `POST /api/generate-image`
pub async fn generate_image(
    state: web::Data<AppState>,
    query: web::Query<StyleQuery>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let form = read_upload(payload).await?;

    let style = Style::parse(query.into_inner().style.or(form.style).as_deref())?;
    let image = form.image.ok_or_else(|| {
        ApiError::InvalidArgument(format!("Missing file field '{}'", IMAGE_FIELD))
    })?;

    log::info!(
        "[req:{}] style={} upload={} bytes",
        request_id,
        style,
        image.len()
    );

    let response = relay(state.generator.as_ref(), style, image).await;
    match &response {
        Ok(_) => log::info!("[req:{}] Image generated successfully", request_id),
        Err(e) => log::error!("[req:{}] AI call failed: {}", request_id, e),
    }

    Ok(HttpResponse::Ok().json(response?))
}

/// Sends the upload to the generator with the prompt for `style` and
/// re-encodes the first returned image.
pub async fn relay(
    generator: &dyn ImageGenerator,
    style: Style,
    image: Vec<u8>,
) -> Result<GenerateImageResponse, ApiError> {
    let request = ImageGenerationRequest::new(style.prompt(), image);

    let timer = logger::timer("imagen predict");
    let result = generator.generate(request).await;
    drop(timer);

    let generated = result.map_err(|e| ApiError::upstream(&e))?;
    let first = generated.images.first().ok_or_else(|| {
        ApiError::UpstreamFailure(
            "An error occurred while calling the AI: No images generated".to_string(),
        )
    })?;

    Ok(GenerateImageResponse {
        generated_image_base64: STANDARD.encode(&first.bytes),
    })
}

async fn read_upload(mut payload: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_owned();

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            IMAGE_FIELD => form.image = Some(data),
            STYLE_FIELD => {
                let value = String::from_utf8(data).map_err(|_| {
                    ApiError::InvalidArgument("Field 'style' is not valid UTF-8".to_string())
                })?;
                form.style = Some(value);
            }
            other => log::debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(form)
}

fn malformed(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::InvalidArgument(format!("Malformed multipart body: {}", err))
}
