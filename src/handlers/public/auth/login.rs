use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::{rels, uris, Links};
use crate::app::AppState;
use crate::auth::verify_password;
use crate::database::models::Account;
use crate::error::ApiError;
use crate::middleware::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /login, /api/login - exchange credentials for a token
///
/// The token is always returned in the auth header. Accounts with an expired
/// password get links to the password change instead of the token body.
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Response, ApiError> {
    let username = request.username.trim();

    let Some(account) = state.repos.accounts.find_by_username(username).await? else {
        tracing::warn!("Login rejected: unknown username '{}'", username);
        return Ok((StatusCode::UNAUTHORIZED, "No user found for the given username").into_response());
    };

    if !verify_password(&request.password, &account.password.hash)? {
        tracing::warn!("Login rejected: wrong password for '{}'", username);
        return Err(ApiError::forbidden("Authentication failed!"));
    }

    if account.is_tracked_person() && !has_open_case(&state, &account).await? {
        tracing::warn!("Login rejected: case of '{}' is closed", username);
        return Err(ApiError::forbidden("Case already closed!"));
    }

    let token = state.tokens.generate_token_for(&account)?;
    tracing::info!("Issued token for '{}'", account.username);

    let body = if account.password.is_expired() {
        let target = uris::change_password();
        let links = Links::new()
            .and(rels::NEXT, target.clone())
            .and(rels::CHANGE_PASSWORD, target);
        json!({ "_links": links.to_json() })
    } else {
        json!({ "token": token })
    };

    Ok(ApiResponse::success(body)
        .header(state.auth_header.clone(), &token)?
        .into_response())
}

async fn has_open_case(state: &AppState, account: &Account) -> Result<bool, ApiError> {
    let Some(person) = state.repos.people.find_by_account(account.id).await? else {
        return Ok(false);
    };

    Ok(state
        .repos
        .cases
        .find_by_tracked_person(person.id)
        .await?
        .is_some_and(|case| case.is_open()))
}
