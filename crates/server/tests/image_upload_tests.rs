//! Single-shot image upload behavior.

mod common;

use axum::http::StatusCode;
use common::fixtures::{issue_key, seed_blog, sign_ghost_jwt, MultipartBuilder};
use common::server::{read_json, TestServer};
use lantern_core::apikey::{AdminApiKey, SecretEncoding};
use lantern_metadata::models::BlogRow;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-a-real-png-but-bytes-enough";

async fn seeded(server: &TestServer) -> (BlogRow, String) {
    let (blog, _) = seed_blog(&server.metadata(), "ada", "notes", Some("alpha"), None).await;
    let key = issue_key(&server.metadata(), &blog, None).await;
    let jwt = sign_ghost_jwt(&key, SecretEncoding::Hex, 300);
    (blog, jwt)
}

#[tokio::test]
async fn upload_returns_content_url_and_echoes_ref() {
    let server = TestServer::new().await;
    let (_, jwt) = seeded(&server).await;

    let request = MultipartBuilder::new()
        .file("file", "photo.png", "image/png", PNG_BYTES)
        .text("ref", "editor-placeholder-7")
        .into_request("/images/upload/?subdomain=alpha", &jwt);
    let response = server.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let image = &body["images"][0];
    let url = image["url"].as_str().unwrap();
    assert!(url.starts_with("http://127.0.0.1:8080/content/images/"));
    assert!(url.ends_with("photo.png"));
    assert_eq!(image["ref"], "editor-placeholder-7");
}

#[tokio::test]
async fn byte_identical_reupload_reuses_the_stored_url() {
    let server = TestServer::new().await;
    let (_, jwt) = seeded(&server).await;

    let mut urls = Vec::new();
    for _ in 0..2 {
        let request = MultipartBuilder::new()
            .file("file", "photo.png", "image/png", PNG_BYTES)
            .into_request("/images/upload/?subdomain=alpha", &jwt);
        let response = server.send(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        urls.push(body["images"][0]["url"].as_str().unwrap().to_string());
    }
    assert_eq!(urls[0], urls[1]);
}

#[tokio::test]
async fn unsupported_media_type_is_rejected() {
    let server = TestServer::new().await;
    let (_, jwt) = seeded(&server).await;

    let request = MultipartBuilder::new()
        .file("file", "paper.pdf", "application/pdf", b"%PDF-1.4")
        .into_request("/images/upload/?subdomain=alpha", &jwt);
    let response = server.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["errors"][0]["type"], "UnsupportedMediaTypeError");
}

#[tokio::test]
async fn icon_purpose_widens_the_allow_list() {
    let server = TestServer::new().await;
    let (_, jwt) = seeded(&server).await;

    // ICO bytes are only valid under purpose=icon
    let request = MultipartBuilder::new()
        .text("purpose", "icon")
        .file("file", "favicon.ico", "image/x-icon", b"icon-bytes")
        .into_request("/images/upload/?subdomain=alpha", &jwt);
    let response = server.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = MultipartBuilder::new()
        .text("purpose", "image")
        .file("file", "favicon.ico", "image/x-icon", b"icon-bytes")
        .into_request("/images/upload/?subdomain=alpha", &jwt);
    let response = server.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_purpose_is_rejected() {
    let server = TestServer::new().await;
    let (_, jwt) = seeded(&server).await;

    let request = MultipartBuilder::new()
        .text("purpose", "banner")
        .file("file", "photo.png", "image/png", PNG_BYTES)
        .into_request("/images/upload/?subdomain=alpha", &jwt);
    let response = server.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversize_upload_gets_a_readable_413() {
    let server = TestServer::with_config(|config| {
        config.server.max_upload_bytes = 1024;
    })
    .await;
    let (_, jwt) = seeded(&server).await;

    let request = MultipartBuilder::new()
        .file("file", "big.png", "image/png", &[0u8; 2048])
        .into_request("/images/upload/?subdomain=alpha", &jwt);
    let response = server.send(request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = read_json(response).await;
    let message = body["errors"][0]["message"].as_str().unwrap();
    assert!(message.contains("MB"), "got: {message}");
}

#[tokio::test]
async fn upload_requires_ghost_auth() {
    let server = TestServer::new().await;
    seed_blog(&server.metadata(), "ada", "notes", Some("alpha"), None).await;

    // Unknown credential
    let key = AdminApiKey::generate();
    let request = MultipartBuilder::new()
        .file("file", "photo.png", "image/png", PNG_BYTES)
        .into_request("/images/upload/?subdomain=alpha", &key.to_token_string());
    let response = server.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_file_field_is_a_bad_request() {
    let server = TestServer::new().await;
    let (_, jwt) = seeded(&server).await;

    let request = MultipartBuilder::new()
        .text("purpose", "image")
        .into_request("/images/upload/?subdomain=alpha", &jwt);
    let response = server.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
