//! End-to-end tests for the HTTP API.
//!
//! Drives the real router with tower's `oneshot`: login, token validation,
//! role gating, and the admin-gated CRUD surface.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use squadbase_backend::{
    api::create_router,
    auth::{AuthState, JwtHandler, SqliteUserStore},
    db::Database,
};

const TEST_SECRET: &str = "integration-test-secret-with-at-least-32-bytes";

fn test_app() -> (Router, Arc<SqliteUserStore>, TempDir) {
    let dir = TempDir::new().unwrap();
    let auth_db = dir.path().join("auth.db");
    let domain_db = dir.path().join("football.db");

    let users = Arc::new(SqliteUserStore::new(auth_db.to_str().unwrap()).unwrap());
    let jwt = Arc::new(JwtHandler::new(TEST_SECRET.to_string()));
    let auth_state = AuthState::new(users.clone(), jwt);
    let db = Arc::new(Database::open(domain_db.to_str().unwrap()).unwrap());

    (create_router(db, auth_state), users, dir)
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "username={}&password={}",
                    username, password
                )))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let response = login(app, username, password).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

async fn post_json(app: &Router, uri: &str, token: Option<&str>, payload: Value) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    app.clone()
        .oneshot(builder.body(Body::from(payload.to_string())).unwrap())
        .await
        .unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn team_payload() -> Value {
    json!({ "name": "Inter", "foundation_year": 1908, "city": "Milan" })
}

#[tokio::test]
async fn test_admin_can_create_team() {
    let (app, _users, _dir) = test_app();

    let token = login_token(&app, "admin", "admin12345").await;

    let response = post_json(&app, "/teams", Some(&token), team_payload()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let team = body_json(response).await;
    assert_eq!(team["name"], "Inter");
    assert_eq!(team["foundation_year"], 1908);
    assert!(team["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_basic_user_gets_forbidden() {
    let (app, _users, _dir) = test_app();

    let token = login_token(&app, "basicuser", "basicuser12345").await;

    let response = post_json(&app, "/teams", Some(&token), team_payload()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Admin privileges required");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _users, _dir) = test_app();

    let response = post_json(&app, "/teams", None, team_payload()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let (app, _users, _dir) = test_app();

    let response = login(&app, "admin", "wrongpassword").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn test_unknown_user_login_fails_identically() {
    let (app, _users, _dir) = test_app();

    let response = login(&app, "nosuchuser", "whatever123").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let (app, _users, _dir) = test_app();

    let token = login_token(&app, "admin", "admin12345").await;

    // Flip a byte inside the claims segment
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let payload = parts[1].clone();
    let flipped = if payload.starts_with('A') { "B" } else { "A" };
    parts[1] = format!("{}{}", flipped, &payload[1..]);
    let tampered = parts.join(".");

    let response = post_json(&app, "/teams", Some(&tampered), team_payload()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let (app, users, _dir) = test_app();

    let admin_token = login_token(&app, "admin", "admin12345").await;
    let token = login_token(&app, "basicuser", "basicuser12345").await;
    users.delete_user("basicuser").unwrap();

    // Valid signature, but the subject no longer exists
    let response = post_json(&app, "/teams", Some(&token), team_payload()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // An unrelated identity is untouched
    let response = post_json(&app, "/teams", Some(&admin_token), team_payload()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_update_and_delete_team() {
    let (app, _users, _dir) = test_app();

    let token = login_token(&app, "admin", "admin12345").await;

    let created = body_json(post_json(&app, "/teams", Some(&token), team_payload()).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/teams/{}", id))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(
                    json!({ "name": "Internazionale", "foundation_year": 1908, "city": "Milan" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Internazionale");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/teams/{}", id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ok"], true);

    // Second delete hits a missing row
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/teams/{}", id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "Team not found");
}

#[tokio::test]
async fn test_roles_and_player_history_flow() {
    let (app, _users, _dir) = test_app();

    let token = login_token(&app, "admin", "admin12345").await;

    let role = body_json(
        post_json(&app, "/roles", Some(&token), json!({ "name": "goalkeeper" })).await,
    )
    .await;
    let role_id = role["id"].as_i64().unwrap();

    // Role listing is public
    let response = get(&app, "/roles").await;
    assert_eq!(response.status(), StatusCode::OK);
    let roles = body_json(response).await;
    assert_eq!(roles.as_array().unwrap().len(), 1);
    assert_eq!(roles[0]["name"], "goalkeeper");

    let team = body_json(post_json(&app, "/teams", Some(&token), team_payload()).await).await;
    let player = body_json(
        post_json(
            &app,
            "/players",
            Some(&token),
            json!({ "name": "Buffon", "birth_date": "1978-01-28", "role_id": role_id }),
        )
        .await,
    )
    .await;
    let player_id = player["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        "/player-history",
        Some(&token),
        json!({
            "player_id": player_id,
            "team_id": team["id"],
            "start_date": "2001-07-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // History listing is public
    let response = get(&app, &format!("/players/{}/history", player_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["start_date"], "2001-07-01");
    assert!(history[0]["end_date"].is_null());
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _users, _dir) = test_app();

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}
