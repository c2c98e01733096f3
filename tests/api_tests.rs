// HTTP boundary: envelopes, multipart upload flow, and error shapes

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::provider::{Behavior, MockProvider};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;
use vidhub::routes::create_routes;
use vidhub::services::assets::AssetResolver;
use vidhub::services::videos::VideoStore;
use vidhub::state::AppState;

const BOUNDARY: &str = "vidhub-test-boundary";

struct TestApp {
    router: Router,
    store: VideoStore,
    owner: Uuid,
    provider: Arc<MockProvider>,
    upload_dir: TempDir,
}

async fn test_app(behavior: Behavior) -> TestApp {
    let db = common::setup_db().await;
    let owner = common::owner(&db, "alice").await;
    let upload_dir = TempDir::new().unwrap();

    let store = VideoStore::new(db);
    let provider = Arc::new(MockProvider::new(behavior));
    let assets = AssetResolver::new(provider.clone(), Duration::from_secs(5));
    let state = AppState::new(store.clone(), assets, upload_dir.path().to_path_buf());

    TestApp {
        router: create_routes(state),
        store,
        owner,
        provider,
        upload_dir,
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn upload_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/videos")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(common::multipart_body(BOUNDARY, parts)))
        .unwrap()
}

#[tokio::test]
async fn root_returns_success_envelope() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;
    let (status, body) = send(&app.router, empty_request("GET", "/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["status_code"], json!(200));
    assert_eq!(body["message"], json!("success"));
    assert!(body["data"]["endpoints"].is_array());
}

#[tokio::test]
async fn unknown_video_returns_error_envelope() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;
    let uri = format!("/videos/{}", Uuid::new_v4());
    let (status, body) = send(&app.router, empty_request("GET", &uri)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["status_code"], json!(404));
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn upload_view_and_publish_flow() {
    let app = test_app(Behavior::Succeed { duration: Some(120.0) }).await;
    let owner = app.owner.to_string();

    let req = upload_request(&[
        ("title", None, "  My first video "),
        ("description", None, "A description"),
        ("owner_id", None, owner.as_str()),
        ("video", Some("clip.mp4"), "fake video bytes"),
        ("thumbnail", Some("thumb.jpg"), "fake image bytes"),
    ]);
    let (status, body) = send(&app.router, req).await;

    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    assert_eq!(body["success"], json!(true));
    let video = &body["data"];
    assert_eq!(video["title"], json!("My first video"));
    assert_eq!(video["views"], json!(0));
    assert_eq!(video["is_published"], json!(true));
    assert_eq!(video["duration_seconds"], json!(120.0));
    assert!(video["video_file"].as_str().unwrap().starts_with("https://cdn.test/video/"));
    assert!(video["thumbnail"].as_str().unwrap().starts_with("https://cdn.test/image/"));
    assert_eq!(common::file_count(app.upload_dir.path()), 0);

    let id = video["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app.router, empty_request("POST", &format!("/videos/{}/views", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["views"], json!(1));

    let (status, body) = send(
        &app.router,
        json_request("PUT", &format!("/videos/{}/publish", id), json!({ "is_published": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_published"], json!(false));

    let (_, body) = send(&app.router, empty_request("GET", "/videos")).await;
    assert_eq!(body["data"]["data"], json!([]));

    let (_, body) = send(
        &app.router,
        empty_request("GET", &format!("/videos?published_only=false&owner_id={}", owner)),
    )
    .await;
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn incomplete_upload_is_rejected_before_provider() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;

    let req = upload_request(&[
        ("title", None, "T"),
        ("video", Some("clip.mp4"), "fake video bytes"),
    ]);
    let (status, body) = send(&app.router, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["errors"],
        json!([
            "thumbnail file is required",
            "owner_id is required",
            "description is required"
        ])
    );
    assert_eq!(app.provider.calls(), 0);
    assert_eq!(common::file_count(app.upload_dir.path()), 0);
}

#[tokio::test]
async fn missing_title_is_rejected_before_provider() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;
    let owner = app.owner.to_string();

    let req = upload_request(&[
        ("description", None, "D"),
        ("owner_id", None, owner.as_str()),
        ("video", Some("clip.mp4"), "fake video bytes"),
        ("thumbnail", Some("thumb.jpg"), "fake image bytes"),
    ]);
    let (status, body) = send(&app.router, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["title is required"]));
    assert_eq!(app.provider.calls(), 0);
    assert_eq!(common::file_count(app.upload_dir.path()), 0);
}

#[tokio::test]
async fn unknown_owner_is_rejected_before_provider() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;
    let stranger = Uuid::new_v4().to_string();

    let req = upload_request(&[
        ("title", None, "T"),
        ("description", None, "D"),
        ("owner_id", None, stranger.as_str()),
        ("video", Some("clip.mp4"), "fake video bytes"),
        ("thumbnail", Some("thumb.jpg"), "fake image bytes"),
    ]);
    let (status, body) = send(&app.router, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().contains("does not exist"));
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn provider_failure_returns_bad_gateway_and_no_record() {
    let app = test_app(Behavior::Fail("quota exceeded".into())).await;
    let owner = app.owner.to_string();

    let req = upload_request(&[
        ("title", None, "T"),
        ("description", None, "D"),
        ("owner_id", None, owner.as_str()),
        ("video", Some("clip.mp4"), "fake video bytes"),
        ("thumbnail", Some("thumb.jpg"), "fake image bytes"),
    ]);
    let (status, body) = send(&app.router, req).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"], Value::Null);
    assert_eq!(common::file_count(app.upload_dir.path()), 0);

    let page = app
        .store
        .query_page(&Default::default(), None, 10)
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn invalid_edit_lists_each_problem() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;
    let created = app
        .store
        .create(common::new_video(app.owner, "T"))
        .await
        .unwrap();

    let (status, body) = send(
        &app.router,
        json_request(
            "PATCH",
            &format!("/videos/{}", created.id),
            json!({ "title": "", "description": " " }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!(["title is required", "description is required"])
    );
}

#[tokio::test]
async fn edit_cannot_swap_in_unuploaded_thumbnail() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;
    let created = app
        .store
        .create(common::new_video(app.owner, "T"))
        .await
        .unwrap();
    let uri = format!("/videos/{}", created.id);

    let (status, _) = send(
        &app.router,
        json_request(
            "PATCH",
            &uri,
            json!({ "thumbnail": "https://elsewhere.example/never-uploaded.jpg" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        json_request(
            "PATCH",
            &uri,
            json!({
                "title": "Renamed",
                "thumbnail": "https://elsewhere.example/never-uploaded.jpg"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], json!("Renamed"));
    assert_eq!(body["data"]["thumbnail"], json!("https://cdn/x.jpg"));

    let stored = app.store.get(created.id).await.unwrap();
    assert_eq!(stored.thumbnail, "https://cdn/x.jpg");
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn listing_pages_through_cursor() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;
    for i in 0..3 {
        app.store
            .create(common::new_video(app.owner, &format!("v{}", i)))
            .await
            .unwrap();
    }

    let (status, body) = send(&app.router, empty_request("GET", "/videos?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 2);
    let cursor = body["data"]["next_cursor"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app.router,
        empty_request("GET", &format!("/videos?limit=2&cursor={}", cursor)),
    )
    .await;
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["next_cursor"], Value::Null);

    let (status, body) = send(&app.router, empty_request("GET", "/videos?cursor=%21%21")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["cursor is malformed"]));
}

#[tokio::test]
async fn delete_then_lookup_is_not_found() {
    let app = test_app(Behavior::Succeed { duration: Some(1.0) }).await;
    let created = app
        .store
        .create(common::new_video(app.owner, "T"))
        .await
        .unwrap();
    let uri = format!("/videos/{}", created.id);

    let (status, body) = send(&app.router, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Video deleted successfully"));

    let (status, _) = send(&app.router, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
