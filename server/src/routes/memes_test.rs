use super::*;
use crate::routes::app;
use crate::routes::tests::{json_body, multipart_body, multipart_request};
use crate::state::test_helpers::{test_app_state, test_app_state_with_uploads};
use axum::body::Body;
use axum::http::Request;
use base64::Engine as _;
use tower::ServiceExt;

fn generated_request(body: &serde_json::Value) -> Request<Body> {
    Request::post("/api/memes/generated")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[test]
fn meme_errors_map_to_statuses() {
    assert_eq!(meme_error_to_status(&MemeError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND);
    assert_eq!(meme_error_to_status(&MemeError::InvalidSort("x".into())), StatusCode::BAD_REQUEST);
    assert_eq!(meme_error_to_status(&MemeError::Invalid("x")), StatusCode::BAD_REQUEST);
    let db = MemeError::Database(sqlx::Error::PoolTimedOut);
    assert_eq!(meme_error_to_status(&db), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn database_errors_hide_their_message() {
    let err: ApiError = MemeError::Database(sqlx::Error::PoolTimedOut).into();
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.code, "E_DATABASE");
    assert_eq!(err.message, "internal server error");
}

#[tokio::test]
async fn list_with_unknown_sort_is_bad_request() {
    let response = app(test_app_state())
        .oneshot(Request::get("/api/memes?sort_by=password").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "E_MEME_SORT");
    assert_eq!(json["message"], "unknown sort field: password");
}

#[tokio::test]
async fn like_with_malformed_id_is_bad_request() {
    let response = app(test_app_state())
        .oneshot(Request::put("/api/memes/42/like").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generated_with_blank_title_is_bad_request() {
    let body = serde_json::json!({ "title": "   ", "imageUrl": "https://example.com/a.png" });
    let response = app(test_app_state()).oneshot(generated_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "E_MEME_INVALID");
    assert_eq!(json["message"], "title is required");
}

#[tokio::test]
async fn generated_without_image_is_bad_request() {
    let body = serde_json::json!({ "title": "When the build passes" });
    let response = app(test_app_state()).oneshot(generated_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "image is required");
}

#[tokio::test]
async fn generated_with_malformed_data_url_is_bad_request() {
    let body = serde_json::json!({ "title": "t", "image_url": "data:image/png;base64,@@@" });
    let response = app(test_app_state()).oneshot(generated_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "E_UPLOAD_DATA_URL");
}

#[tokio::test]
async fn generated_with_non_image_data_url_is_bad_request() {
    let body = serde_json::json!({ "title": "t", "image_url": "data:text/html;base64,PGI+" });
    let response = app(test_app_state()).oneshot(generated_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "E_UPLOAD_TYPE");
}

#[tokio::test]
async fn generated_with_oversized_data_url_is_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let payload = base64::engine::general_purpose::STANDARD.encode(vec![7_u8; 1500]);
    let body = serde_json::json!({ "title": "t", "image_url": format!("data:image/png;base64,{payload}") });
    let response = app(test_app_state_with_uploads(dir.path())).oneshot(generated_request(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_without_title_is_bad_request() {
    let body = multipart_body(&[("top_text", "top")], Some(("m.png", b"png".as_slice())));
    let response = app(test_app_state()).oneshot(multipart_request("/api/memes", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "title is required");
}

#[tokio::test]
async fn upload_without_image_is_bad_request() {
    let body = multipart_body(&[("title", "Distracted")], None);
    let response = app(test_app_state()).oneshot(multipart_request("/api/memes", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "image is required");
}

#[tokio::test]
async fn upload_with_empty_image_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let body = multipart_body(&[("title", "Distracted")], Some(("m.gif", b"".as_slice())));
    let response =
        app(test_app_state_with_uploads(dir.path())).oneshot(multipart_request("/api/memes", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "E_UPLOAD_EMPTY");
}
