//! End-to-end wizard flow over the HTTP surface.

mod common;

use axum::body::Body;
use axum::http::{header, Request};
use common::*;
use engage_db::PostStore;
use engage_storage::ObjectStorage;
use serde_json::json;
use std::io::Cursor;
use std::time::Duration;
use uuid::Uuid;

async fn create_session(app: &TestApp, user_id: Uuid) -> String {
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/api/v0/wizard/sessions",
        json!({ "user_id": user_id }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["state"]["step"], "media");
    body["session_id"].as_str().unwrap().to_string()
}

async fn upload_jpeg(app: &TestApp, session_id: &str, width: u32, height: u32) {
    let body = multipart_body("photo.jpg", "image/jpeg", &encoded_jpeg(width, height));
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v0/wizard/sessions/{session_id}/media"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status().as_u16(), 200);
    let state = read_json(response).await;
    assert_eq!(state["has_media"], true);
    assert!(state["preview_url"].as_str().unwrap().starts_with("data:image/jpeg"));
}

/// Poll the session until the background upload settles.
async fn wait_for_upload(app: &TestApp, session_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let (status, state) = send_empty(
            &app.router,
            "GET",
            &format!("/api/v0/wizard/sessions/{session_id}"),
        )
        .await;
        assert_eq!(status, 200);
        if state["upload_pending"] == false {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("upload did not settle");
}

#[tokio::test]
async fn test_full_flow_crop_rotate_upload_complete() {
    let app = test_app(None).await;
    let user_id = Uuid::new_v4();
    let session_id = create_session(&app, user_id).await;

    // 1000x800 source, crop to 400x300, one quarter turn.
    upload_jpeg(&app, &session_id, 1000, 800).await;

    let (status, _) = send_json(
        &app.router,
        "PUT",
        &format!("/api/v0/wizard/sessions/{session_id}/crop"),
        json!({ "x": 100, "y": 100, "width": 400, "height": 300 }),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = send_empty(
        &app.router,
        "POST",
        &format!("/api/v0/wizard/sessions/{session_id}/rotate"),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["rotation_degrees"], 90);

    let (status, body) = send_empty(
        &app.router,
        "POST",
        &format!("/api/v0/wizard/sessions/{session_id}/next"),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["outcome"], "upload_started");

    let state = wait_for_upload(&app, &session_id).await;
    assert_eq!(state["step"], "platform");
    let post_id: Uuid = state["post_id"].as_str().unwrap().parse().unwrap();

    // The record exists immediately with the placeholder platform.
    let record = app.posts.get(post_id).await.unwrap().unwrap();
    assert_eq!(record.platform, "default");
    assert_eq!(record.user_id, user_id);
    assert!(record.niche.is_none());

    // Stored bytes decode to the crop dimensions despite the rotation.
    let key = record
        .image_url
        .strip_prefix("http://localhost:3000/media/")
        .unwrap();
    let stored = app.storage.get(key).await.unwrap();
    let decoded = image::ImageReader::new(Cursor::new(stored.as_ref()))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!((decoded.width(), decoded.height()), (400, 300));

    // Walk the attribute steps.
    for (field, value) in [
        ("platform", "Instagram"),
        ("niche", "Fitness"),
        ("goal", "Sales"),
        ("tone", "Casual"),
    ] {
        let (status, _) = send_json(
            &app.router,
            "PUT",
            &format!("/api/v0/wizard/sessions/{session_id}/selection"),
            json!({ field: value }),
        )
        .await;
        assert_eq!(status, 200);
        if field != "tone" {
            let (status, _) = send_empty(
                &app.router,
                "POST",
                &format!("/api/v0/wizard/sessions/{session_id}/next"),
            )
            .await;
            assert_eq!(status, 200);
        }
    }

    let (status, body) = send_empty(
        &app.router,
        "POST",
        &format!("/api/v0/wizard/sessions/{session_id}/complete"),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["post_id"].as_str().unwrap(), post_id.to_string());

    // Exactly one attribute update, carrying all four selections.
    assert_eq!(app.posts.update_calls(), 1);
    let record = app.posts.get(post_id).await.unwrap().unwrap();
    assert_eq!(record.platform, "Instagram");
    assert_eq!(record.niche.as_deref(), Some("Fitness"));
    assert_eq!(record.goal.as_deref(), Some("Sales"));
    assert_eq!(record.tone.as_deref(), Some("Casual"));

    // The stored object is publicly retrievable. The body is raw image
    // bytes, so skip the JSON helper and check the status directly.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/media/{key}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_next_on_attribute_step_without_selection_is_400() {
    let app = test_app(None).await;
    let session_id = create_session(&app, Uuid::new_v4()).await;

    upload_jpeg(&app, &session_id, 200, 200).await;
    send_empty(
        &app.router,
        "POST",
        &format!("/api/v0/wizard/sessions/{session_id}/next"),
    )
    .await;
    wait_for_upload(&app, &session_id).await;

    let (status, body) = send_empty(
        &app.router,
        "POST",
        &format!("/api/v0/wizard/sessions/{session_id}/next"),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_upload_rejects_disallowed_content_type() {
    let app = test_app(None).await;
    let session_id = create_session(&app, Uuid::new_v4()).await;

    let body = multipart_body("doc.pdf", "application/pdf", b"%PDF-1.4");
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v0/wizard/sessions/{session_id}/media"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = test_app(None).await;
    let (status, body) = send_empty(
        &app.router,
        "GET",
        &format!("/api/v0/wizard/sessions/{}", Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_clearing_media_resets_flow() {
    let app = test_app(None).await;
    let session_id = create_session(&app, Uuid::new_v4()).await;

    upload_jpeg(&app, &session_id, 200, 200).await;
    send_empty(
        &app.router,
        "POST",
        &format!("/api/v0/wizard/sessions/{session_id}/next"),
    )
    .await;
    wait_for_upload(&app, &session_id).await;

    let (status, state) = send_empty(
        &app.router,
        "DELETE",
        &format!("/api/v0/wizard/sessions/{session_id}/media"),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(state["has_media"], false);
    assert!(state["post_id"].is_null());
}
