use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- health ---

#[tokio::test]
async fn health_is_served_at_root_under_api_and_users() {
    for uri in ["/health", "/api/health", "/api/users/health"] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_json(resp).await["status"], "healthy");
    }
}

// --- users ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(get("/api/users/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["users"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_user_returns_201_and_normalizes() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/users/",
            r#"{"email":"Artist@Example.com","artist_name":"  The Band  "}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["id"], 1);
    assert_eq!(body["user"]["email"], "artist@example.com");
    assert_eq!(body["user"]["artist_name"], "The Band");
    assert_eq!(body["user"]["is_active"], true);
}

#[tokio::test]
async fn create_user_without_data_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/users/", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "No data provided");
}

#[tokio::test]
async fn create_user_without_email_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/users/", r#"{"artist_name":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Email is required");
}

#[tokio::test]
async fn create_user_invalid_email_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/users/", r#"{"email":"invalid-email"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Invalid email format");
}

#[tokio::test]
async fn get_user_not_found() {
    let resp = app().oneshot(get("/api/users/99")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "User not found");
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(get("/api/users/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- campaigns ---

#[tokio::test]
async fn create_campaign_requires_user_id_and_name() {
    let resp = app()
        .oneshot(json_request("POST", "/api/campaigns/", r#"{"name":"Tour"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "User ID and name are required");
}

#[tokio::test]
async fn create_campaign_rejects_zero_user_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/campaigns/",
            r#"{"user_id":0,"name":"Tour"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "User ID and name are required");
}

#[tokio::test]
async fn create_campaign_rejects_unknown_status() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/campaigns/",
            r#"{"user_id":1,"name":"Tour","status":"inactive"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_progress_on_missing_campaign_returns_404() {
    let resp = app()
        .oneshot(json_request(
            "PATCH",
            "/api/campaigns/5/progress",
            r#"{"status":"active"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "Campaign not found");
}

// --- full lifecycle ---

#[tokio::test]
async fn user_and_campaign_lifecycle() {
    let mut app = app().into_service();

    // create user
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/users/", r#"{"email":"dj@example.com"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user_id = body_json(resp).await["user"]["id"].as_i64().unwrap();

    // duplicate email
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/users/", r#"{"email":"DJ@example.com"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // get user
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/users/{user_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user"]["email"], "dj@example.com");

    // create campaign, status defaults to draft
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/campaigns/",
            &format!(r#"{{"user_id":{user_id},"name":"Spring release"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["campaign"]["status"], "draft");
    let campaign_id = body["campaign"]["id"].as_i64().unwrap();

    // update progress, unknown keys are ignored
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/api/campaigns/{campaign_id}/progress"),
            r#"{"status":"active","campaign_data":{"percent":50},"percent":50}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Campaign updated successfully");
    assert_eq!(body["campaign"]["status"], "active");
    assert_eq!(body["campaign"]["campaign_data"]["percent"], 50);
    assert!(body["campaign"].get("percent").is_none());

    // get campaign reflects the update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/campaigns/{campaign_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["campaign"]["name"], "Spring release");
    assert_eq!(body["campaign"]["status"], "active");

    // list users has exactly one
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/users/"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["users"].as_array().unwrap().len(), 1);
}
