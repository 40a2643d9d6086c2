use actix_web::{http::StatusCode, test, web, App};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use fashion_studio::{models::STREET_PROMPT, server, AppState, VertexClient, VertexConfig};
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_FIXTURE: &str = include_str!("fixtures/service_account_key.json");
const BOUNDARY: &str = "relay-test-boundary";
const PREDICT_PATH: &str = "/v1/projects/fashion-studio-test/locations/us-central1/publishers/google/models/imagegeneration@005:predict";

fn key_file(token_uri: &str) -> tempfile::NamedTempFile {
    let mut key: serde_json::Value = serde_json::from_str(KEY_FIXTURE).unwrap();
    key["token_uri"] = serde_json::Value::String(token_uri.to_string());

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(key.to_string().as_bytes()).unwrap();
    file
}

fn upload_body(image: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"product_image\"; filename=\"jacket.png\"\r\nContent-Type: image/png\r\n\r\n",
        b = BOUNDARY
    )
    .into_bytes();
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[actix_web::test]
async fn relays_upload_through_vertex_and_back() {
    let upstream = MockServer::start().await;
    let upload = b"\x89PNG\r\n\x1a\nproduct".to_vec();
    let generated: Vec<u8> = (0u8..64).rev().collect();

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.relay",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(header("authorization", "Bearer ya29.relay"))
        .and(body_partial_json(serde_json::json!({
            "instances": [{
                "prompt": STREET_PROMPT,
                "image": { "bytesBase64Encoded": STANDARD.encode(&upload) }
            }],
            "parameters": { "sampleCount": 1 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "predictions": [{ "bytesBase64Encoded": STANDARD.encode(&generated), "mimeType": "image/png" }]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let key = key_file(&format!("{}/token", upstream.uri()));
    let config = VertexConfig::new()
        .with_project("fashion-studio-test")
        .with_credentials_path(key.path())
        .with_endpoint(upstream.uri());
    let client = VertexClient::new(config).await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::new(Arc::new(client))))
            .configure(server::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate-image?style=street")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(upload_body(&upload))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = test::read_body_json(resp).await;
    let decoded = STANDARD
        .decode(json["generated_image_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, generated);
}

#[actix_web::test]
async fn upstream_rejection_becomes_500() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&upstream)
        .await;

    let key = key_file(&format!("{}/token", upstream.uri()));
    let config = VertexConfig::new()
        .with_project("fashion-studio-test")
        .with_credentials_path(key.path())
        .with_endpoint(upstream.uri());
    let client = VertexClient::new(config).await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::new(Arc::new(client))))
            .configure(server::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate-image?style=studio")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(upload_body(b"img"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert!(json["detail"].as_str().unwrap().contains("invalid_client"));
}
