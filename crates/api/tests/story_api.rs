//! HTTP-level tests for stories and image uploads.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, create_trip, delete, get, post_json, put_json, send};
use serde_json::json;
use wayfarer_store::blob::MAX_IMAGE_BYTES;

fn image_upload(content_type: Option<&str>, bytes: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/stories/images");
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    builder.body(Body::from(bytes)).unwrap()
}

#[tokio::test]
async fn story_crud() {
    let app = common::build_test_app();
    let response = post_json(
        app.clone(),
        "/api/v1/stories",
        json!({"title": "Day one", "content": "Landed in Goa"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let story = body_json(response).await["data"].clone();
    let id = story["id"].as_str().unwrap().to_string();

    let response = put_json(
        app.clone(),
        &format!("/api/v1/stories/{id}"),
        json!({"location": "Panaji"}),
    )
    .await;
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["location"], "Panaji");
    assert_eq!(updated["content"], "Landed in Goa");

    let response = delete(app.clone(), &format!("/api/v1/stories/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get(app, &format!("/api/v1/stories/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn story_without_content_or_image_is_rejected() {
    let app = common::build_test_app();
    let response = post_json(app, "/api/v1/stories", json!({"title": "Empty"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stories_listed_by_trip() {
    let app = common::build_test_app();
    let trip_id = create_trip(&app, "Goa").await["id"].as_str().unwrap().to_string();
    post_json(
        app.clone(),
        "/api/v1/stories",
        json!({"trip_id": trip_id, "content": "On the trip"}),
    )
    .await;
    post_json(app.clone(), "/api/v1/stories", json!({"content": "Elsewhere"})).await;

    let json = body_json(get(app.clone(), &format!("/api/v1/trips/{trip_id}/stories")).await).await;
    let stories = json["data"].as_array().unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0]["content"], "On the trip");

    let json = body_json(get(app, "/api/v1/stories").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn image_upload_returns_inline_url_in_local_mode() {
    let app = common::build_test_app();
    let response = send(
        app.clone(),
        image_upload(Some("image/png"), vec![0x89, b'P', b'N', b'G']),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let url = body_json(response).await["data"]["url"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(url.starts_with("data:image/png;base64,"));

    let response = post_json(app, "/api/v1/stories", json!({"image_url": url})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn image_upload_rejects_bad_input() {
    let app = common::build_test_app();

    let response = send(app.clone(), image_upload(None, vec![1, 2, 3])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let response = send(app.clone(), image_upload(Some("text/plain"), vec![1, 2, 3])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = send(
        app,
        image_upload(Some("image/jpeg"), vec![0u8; MAX_IMAGE_BYTES + 1]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
