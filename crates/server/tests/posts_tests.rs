//! Post create and update through the gateway.

mod common;

use axum::http::{Method, StatusCode};
use common::fixtures::{issue_key, json_authed, seed_blog, sign_ghost_jwt};
use common::server::{read_json, TestServer};
use lantern_core::apikey::SecretEncoding;
use serde_json::json;

async fn seeded(server: &TestServer) -> String {
    let (blog, _) = seed_blog(&server.metadata(), "ada", "notes", Some("alpha"), None).await;
    let key = issue_key(&server.metadata(), &blog, None).await;
    sign_ghost_jwt(&key, SecretEncoding::Hex, 300)
}

#[tokio::test]
async fn create_stores_markdown_verbatim_by_default() {
    let server = TestServer::new().await;
    let jwt = seeded(&server).await;

    let document = json!({
        "posts": [{
            "title": "Hello, World!",
            "markdown": "# Hi",
            "html": "<p>ignored</p>",
        }]
    });
    let response = server
        .send(json_authed(
            Method::POST,
            "/posts/?subdomain=alpha",
            &jwt,
            &document,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    let post = &body["posts"][0];
    assert_eq!(post["title"], "Hello, World!");
    assert_eq!(post["slug"], "hello-world");
    assert_eq!(post["status"], "draft");
    // Markdown wins the precedence, stored untouched
    assert_eq!(post["markdown"], "# Hi");
    assert!(post["html"].is_null());
    assert_eq!(post["url"], "http://127.0.0.1:8080/ada/notes/hello-world");
    assert!(post["created_at"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn html_source_renders_markdown() {
    let server = TestServer::new().await;
    let jwt = seeded(&server).await;

    let document = json!({
        "posts": [{ "title": "Rendered", "markdown": "# Hi" }]
    });
    let response = server
        .send(json_authed(
            Method::POST,
            "/posts/?subdomain=alpha&source=html",
            &jwt,
            &document,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    let post = &body["posts"][0];
    assert_eq!(post["html"], "<h1>Hi</h1>");
    assert!(post["markdown"].is_null());
}

#[tokio::test]
async fn lexical_payload_is_stored_opaquely() {
    let server = TestServer::new().await;
    let jwt = seeded(&server).await;

    let lexical = r#"{"root":{"children":[]}}"#;
    let document = json!({
        "posts": [{ "title": "Lexical", "lexical": lexical }]
    });
    let response = server
        .send(json_authed(
            Method::POST,
            "/posts/?subdomain=alpha",
            &jwt,
            &document,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    assert_eq!(body["posts"][0]["html"], lexical);
}

#[tokio::test]
async fn update_changes_fields_and_keeps_body_when_no_content_sent() {
    let server = TestServer::new().await;
    let jwt = seeded(&server).await;

    let document = json!({
        "posts": [{ "title": "Draft One", "markdown": "# Original" }]
    });
    let response = server
        .send(json_authed(
            Method::POST,
            "/posts/?subdomain=alpha",
            &jwt,
            &document,
        ))
        .await;
    let body = read_json(response).await;
    let post_id = body["posts"][0]["id"].as_str().unwrap().to_string();

    // Publish without resending content
    let update = json!({
        "posts": [{ "title": "Published One", "status": "published" }]
    });
    let response = server
        .send(json_authed(
            Method::PUT,
            &format!("/posts/{post_id}/?subdomain=alpha"),
            &jwt,
            &update,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let post = &body["posts"][0];
    assert_eq!(post["title"], "Published One");
    assert_eq!(post["status"], "published");
    assert_eq!(post["markdown"], "# Original");
}

#[tokio::test]
async fn update_for_another_blogs_post_is_not_found() {
    let server = TestServer::new().await;
    let jwt = seeded(&server).await;
    let (beta, _) = seed_blog(&server.metadata(), "ben", "words", Some("beta"), None).await;
    let beta_key = issue_key(&server.metadata(), &beta, None).await;
    let beta_jwt = sign_ghost_jwt(&beta_key, SecretEncoding::Hex, 300);

    let document = json!({ "posts": [{ "title": "Mine", "markdown": "body" }] });
    let response = server
        .send(json_authed(
            Method::POST,
            "/posts/?subdomain=alpha",
            &jwt,
            &document,
        ))
        .await;
    let body = read_json(response).await;
    let post_id = body["posts"][0]["id"].as_str().unwrap().to_string();

    let update = json!({ "posts": [{ "title": "Stolen" }] });
    let response = server
        .send(json_authed(
            Method::PUT,
            &format!("/posts/{post_id}/?subdomain=beta"),
            &beta_jwt,
            &update,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn untitled_post_gets_defaults() {
    let server = TestServer::new().await;
    let jwt = seeded(&server).await;

    let document = json!({ "posts": [{ "markdown": "body only" }] });
    let response = server
        .send(json_authed(
            Method::POST,
            "/posts/?subdomain=alpha",
            &jwt,
            &document,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    let post = &body["posts"][0];
    assert_eq!(post["title"], "(Untitled)");
    assert_eq!(post["slug"], "untitled");
}

#[tokio::test]
async fn rejects_unknown_status() {
    let server = TestServer::new().await;
    let jwt = seeded(&server).await;

    let document = json!({ "posts": [{ "title": "X", "status": "scheduled" }] });
    let response = server
        .send(json_authed(
            Method::POST,
            "/posts/?subdomain=alpha",
            &jwt,
            &document,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejects_documents_without_exactly_one_post() {
    let server = TestServer::new().await;
    let jwt = seeded(&server).await;

    for document in [
        json!({ "posts": [] }),
        json!({ "posts": [{ "title": "a" }, { "title": "b" }] }),
    ] {
        let response = server
            .send(json_authed(
                Method::POST,
                "/posts/?subdomain=alpha",
                &jwt,
                &document,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
