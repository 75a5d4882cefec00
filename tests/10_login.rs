mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn staff_login_returns_token_in_header_and_body() -> Result<()> {
    let app = TestApp::seeded().await?;

    let res = app
        .post_json("/api/login", &json!({ "username": "agent", "password": "agent-secret" }))
        .await?;

    assert_eq!(res.status, StatusCode::OK);
    let header = res.headers["x-auth-token"].to_str()?;
    assert_eq!(res.body["token"], header);

    let claims = app.tokens.validate(header)?;
    assert_eq!(claims.username, "agent");
    assert_eq!(claims.department, common::id(common::MANNHEIM));
    Ok(())
}

#[tokio::test]
async fn legacy_path_and_padded_username_are_accepted() -> Result<()> {
    let app = TestApp::seeded().await?;

    let res = app
        .post_json("/login", &json!({ "username": "  agent ", "password": "agent-secret" }))
        .await?;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.headers.contains_key("x-auth-token"));
    Ok(())
}

#[tokio::test]
async fn unknown_username_is_unauthorized_with_plain_message() -> Result<()> {
    let app = TestApp::seeded().await?;

    let res = app
        .post_json("/api/login", &json!({ "username": "nobody", "password": "whatever" }))
        .await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body.is_null(), "expected a plain text body, got {}", res.text);
    assert!(!res.text.is_empty());
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_forbidden() -> Result<()> {
    let app = TestApp::seeded().await?;

    let res = app
        .post_json("/api/login", &json!({ "username": "agent", "password": "wrong" }))
        .await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Authentication failed!");
    assert!(!res.headers.contains_key("x-auth-token"));
    Ok(())
}

#[tokio::test]
async fn tracked_person_with_open_case_can_log_in() -> Result<()> {
    let app = TestApp::seeded().await?;

    let res = app
        .post_json("/api/login", &json!({ "username": "tanja", "password": "tanja-secret" }))
        .await?;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["token"].is_string());
    Ok(())
}

#[tokio::test]
async fn tracked_person_with_closed_case_is_rejected() -> Result<()> {
    let app = TestApp::seeded().await?;

    let res = app
        .post_json("/api/login", &json!({ "username": "markus", "password": "markus-secret" }))
        .await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Case already closed!");
    Ok(())
}

#[tokio::test]
async fn expired_password_gets_change_password_links() -> Result<()> {
    let app = TestApp::seeded().await?;

    let res = app
        .post_json("/api/login", &json!({ "username": "expired", "password": "expired-secret" }))
        .await?;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.headers.contains_key("x-auth-token"));
    assert!(res.body.get("token").is_none());
    assert_eq!(res.body["_links"]["next"]["href"], "/api/user/me/password");
    assert_eq!(res.body["_links"]["change-password"]["href"], "/api/user/me/password");
    Ok(())
}
