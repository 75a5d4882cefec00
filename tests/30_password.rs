mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn expired_account_changes_password_and_logs_in_normally() -> Result<()> {
    let app = TestApp::seeded().await?;

    let login = app
        .post_json("/api/login", &json!({ "username": "expired", "password": "expired-secret" }))
        .await?;
    let token = login.headers["x-auth-token"].to_str()?.to_string();

    let res = app
        .put_json(
            "/api/user/me/password",
            &token,
            &json!({ "current": "expired-secret", "password": "a-fresh-secret", "passwordConfirm": "a-fresh-secret" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let relogin = app
        .post_json("/api/login", &json!({ "username": "expired", "password": "a-fresh-secret" }))
        .await?;
    assert_eq!(relogin.status, StatusCode::OK);
    assert!(relogin.body["token"].is_string());
    assert!(relogin.body.get("_links").is_none());
    Ok(())
}

#[tokio::test]
async fn mismatched_confirmation_is_a_field_error() -> Result<()> {
    let app = TestApp::seeded().await?;
    let token = app.token_for("agent").await?;

    let res = app
        .put_json(
            "/api/user/me/password",
            &token,
            &json!({ "current": "agent-secret", "password": "a-fresh-secret", "passwordConfirm": "something-else" }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["passwordConfirm"].is_string());
    Ok(())
}

#[tokio::test]
async fn wrong_current_password_is_forbidden() -> Result<()> {
    let app = TestApp::seeded().await?;
    let token = app.token_for("agent").await?;

    let res = app
        .put_json(
            "/api/user/me/password",
            &token,
            &json!({ "current": "not-it", "password": "a-fresh-secret", "passwordConfirm": "a-fresh-secret" }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn tracked_people_may_change_their_password() -> Result<()> {
    let app = TestApp::seeded().await?;
    let token = app.token_for("tanja").await?;

    let res = app
        .put_json(
            "/api/user/me/password",
            &token,
            &json!({ "current": "tanja-secret", "password": "tanjas-new-secret", "passwordConfirm": "tanjas-new-secret" }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::NO_CONTENT);
    Ok(())
}
