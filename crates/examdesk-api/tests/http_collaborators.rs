//! HTTP collaborator tests against a mock backend

use examdesk_api::{ApiClient, ApiConfig, ApiError, HttpPageStore, HttpUploader};
use examdesk_forms::{PageStore, UploadFile, Uploader};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiConfig::new(format!("{}/api", server.uri())).with_token("t0ken")).unwrap()
}

#[tokio::test]
async fn test_upload_sends_multipart_and_returns_filename() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header("authorization", "Bearer t0ken"))
        .and(body_string_contains("name=\"file\"; filename=\"campus.jpg\""))
        .and(body_string_contains("name=\"field\""))
        .and(body_string_contains("background_image"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "filename": "uploads/2024/campus.jpg" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uploader = HttpUploader::new(client(&server));
    let file = UploadFile::new("campus.jpg", b"jpeg-bytes".to_vec()).with_content_type("image/jpeg");
    let stored = uploader.upload(file, "background_image").await.unwrap();

    assert_eq!(stored.filename, "uploads/2024/campus.jpg");
}

#[tokio::test]
async fn test_upload_accepts_path_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "path": "/media/a.pdf" })))
        .mount(&server)
        .await;

    let stored = HttpUploader::new(client(&server))
        .upload(UploadFile::new("a.pdf", vec![1, 2, 3]), "brochure")
        .await
        .unwrap();
    assert_eq!(stored.filename, "/media/a.pdf");
}

#[tokio::test]
async fn test_upload_error_uses_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(413).set_body_json(json!({ "message": "File exceeds 5 MB" })),
        )
        .mount(&server)
        .await;

    let err = HttpUploader::new(client(&server))
        .upload(UploadFile::new("big.png", vec![0; 16]), "logo")
        .await
        .unwrap_err();
    assert_eq!(err.message, "File exceeds 5 MB");
}

#[tokio::test]
async fn test_upload_error_without_body_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = HttpUploader::new(client(&server))
        .send(UploadFile::new("a.png", vec![]), "logo")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.user_message(), "Bad Gateway");
}

#[tokio::test]
async fn test_upload_response_without_filename_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let err = HttpUploader::new(client(&server))
        .send(UploadFile::new("a.png", vec![]), "logo")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_create_and_update_page() {
    let server = MockServer::start().await;
    let payload = json!({ "page_type": "city_page", "title": "Leeds", "sections": [] });

    Mock::given(method("POST"))
        .and(path("/api/pages"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 58 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/pages/58"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpPageStore::new(client(&server));
    let created = store.create(payload.clone()).await.unwrap();
    assert_eq!(created.id, "58");
    let updated = store.update(&created.id, payload).await.unwrap();
    assert_eq!(updated.id, "58");
}

#[tokio::test]
async fn test_page_store_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pages"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "error": "slug already exists" })),
        )
        .mount(&server)
        .await;

    let err = HttpPageStore::new(client(&server))
        .create(json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.message, "slug already exists");
}
