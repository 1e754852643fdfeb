mod common;

use chrono::Utc;
use common::TestApp;
use common::SECRET;
use feedback_service::domain::user::models::UserId;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"]["updated_at"].is_string());
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_register_stores_hash_not_password() {
    let app = TestApp::spawn().await;

    let id = app.register("alice@example.com", "pass_word!").await;
    let stored = app
        .repository
        .get(&UserId::from_string(&id).unwrap())
        .await
        .expect("user was not stored");

    assert_ne!(stored.password_hash, "pass_word!");
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register("alice@example.com", "pass_word!").await;

    let response = app
        .post("/api/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "different_password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/register")
        .json(&json!({
            "email": "not-an-email",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("email"));
}

#[tokio::test]
async fn test_register_empty_password() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": ""
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_malformed_body() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/register")
        .json(&json!({ "email": "alice@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    let id = app.register("alice@example.com", "pass_word!").await;
    let token = app.login("alice@example.com", "pass_word!").await;

    let claims = app
        .token_verifier
        .verify(&token, Utc::now())
        .expect("Issued token did not verify");
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.user_id, id);
}

#[tokio::test]
async fn test_login_response_envelope() {
    let app = TestApp::spawn().await;

    app.register("alice@example.com", "pass_word!").await;

    let response = app
        .post("/api/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 200);
    assert!(body["data"]["token"].is_string());
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;

    app.register("alice@example.com", "pass_word!").await;

    let wrong_password = app
        .post("/api/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "wrong_password"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown_email = app
        .post("/api/login")
        .json(&json!({
            "email": "bob@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password_body: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_email_body: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[tokio::test]
async fn test_get_current_user() {
    let app = TestApp::spawn().await;

    let id = app.register("alice@example.com", "pass_word!").await;
    let token = app.login("alice@example.com", "pass_word!").await;

    let response = app
        .get_authenticated("/api/user", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_missing_authorization_header() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/user")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_malformed_authorization_headers() {
    let app = TestApp::spawn().await;

    app.register("alice@example.com", "pass_word!").await;
    let token = app.login("alice@example.com", "pass_word!").await;

    let headers = [
        "Token abc".to_string(),
        "Bearer".to_string(),
        "Bearer a b".to_string(),
        String::new(),
        format!("Token {}", token),
        format!("Bearer  {}", token),
    ];

    for header in headers {
        let response = app
            .get("/api/user")
            .header("Authorization", header.as_str())
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "header {:?} should be rejected",
            header
        );

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }
}

#[tokio::test]
async fn test_invalid_tokens_are_rejected_uniformly() {
    let app = TestApp::spawn().await;

    let id = app.register("alice@example.com", "pass_word!").await;
    let exp = Utc::now().timestamp() + 3600;
    let claims = json!({ "user_id": id, "email": "alice@example.com", "exp": exp });

    let foreign_secret = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"another_secret_at_least_32_bytes_long"),
    )
    .unwrap();
    let other_algorithm = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();
    let expired = encode(
        &Header::new(Algorithm::HS256),
        &json!({ "user_id": id, "email": "alice@example.com", "exp": exp - 7200 }),
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    for token in [
        "not-a-token".to_string(),
        foreign_secret,
        other_algorithm,
        expired,
    ] {
        let response = app
            .get_authenticated("/api/user", &token)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }
}

#[tokio::test]
async fn test_token_for_removed_user_is_rejected() {
    let app = TestApp::spawn().await;

    let id = app.register("alice@example.com", "pass_word!").await;
    let token = app.login("alice@example.com", "pass_word!").await;

    app.repository
        .remove(&UserId::from_string(&id).unwrap())
        .await
        .expect("user was not stored");

    let response = app
        .get_authenticated("/api/user", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_update_current_user() {
    let app = TestApp::spawn().await;

    app.register("alice@example.com", "pass_word!").await;
    let token = app.login("alice@example.com", "pass_word!").await;

    let response = app
        .put_authenticated("/api/user", &token)
        .json(&json!({
            "email": "alice@new.example.com",
            "password": "new_pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "alice@new.example.com");
    assert_ne!(body["data"]["updated_at"], body["data"]["created_at"]);

    // New credentials work, old ones do not
    app.login("alice@new.example.com", "new_pass_word!").await;
    let stale = app
        .post("/api/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_current_user_email_conflict() {
    let app = TestApp::spawn().await;

    app.register("alice@example.com", "pass_word!").await;
    app.register("bob@example.com", "pass_word!").await;
    let token = app.login("alice@example.com", "pass_word!").await;

    let response = app
        .put_authenticated("/api/user", &token)
        .json(&json!({ "email": "bob@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app
        .api_client
        .put(format!("{}/api/user", app.address))
        .json(&json!({ "email": "mallory@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
