use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::{hash_password, verify_password};
use crate::database::models::EncryptedPassword;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

impl PasswordChange {
    fn validate(&self, min_length: usize) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();

        if self.current.is_empty() {
            errors.insert("current".into(), "must not be blank".into());
        }
        if self.password.chars().count() < min_length {
            errors.insert("password".into(), format!("must be at least {} characters", min_length));
        }
        if self.password != self.password_confirm {
            errors.insert("passwordConfirm".into(), "does not match password".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid request body", Some(errors)))
        }
    }
}

/// PUT /api/user/me/password - replace the caller's password, clearing any expiry
pub async fn password_put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(change): Json<PasswordChange>,
) -> ApiResult<()> {
    change.validate(state.min_password_length)?;

    let account = state
        .repos
        .accounts
        .find_by_id(auth_user.account_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    if !verify_password(&change.current, &account.password.hash)? {
        tracing::warn!("Password change rejected for '{}': wrong current password", account.username);
        return Err(ApiError::forbidden("Current password does not match"));
    }

    let password = EncryptedPassword::new(hash_password(&change.password)?);
    state.repos.accounts.update_password(account.id, &password).await?;

    tracing::info!("Password changed for '{}'", account.username);
    Ok(ApiResponse::<()>::no_content())
}
