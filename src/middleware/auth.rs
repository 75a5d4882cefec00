use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Claims;
use crate::database::models::RoleType;
use crate::error::ApiError;

/// Authenticated account context extracted from the token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub account_id: Uuid,
    pub username: String,
    pub department_id: Uuid,
    pub roles: Vec<RoleType>,
}

impl AuthUser {
    pub fn is_department_staff(&self) -> bool {
        self.roles.iter().any(RoleType::is_department_role)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.sub,
            username: claims.username,
            department_id: claims.department,
            roles: claims.roles,
        }
    }
}

/// Token authentication middleware that validates tokens and injects `AuthUser`
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_headers(&headers, &state).map_err(ApiError::unauthorized)?;

    let claims = state.tokens.validate(&token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::from(e)
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated {} ({})", auth_user.username, auth_user.account_id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Bearer token from `Authorization`, falling back to the auth token header handed out at login
fn extract_token_from_headers(headers: &HeaderMap, state: &AppState) -> Result<String, String> {
    if let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Some(_) => Err("Empty JWT token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    let token = headers
        .get(&state.auth_header)
        .ok_or_else(|| "Missing Authorization header".to_string())?
        .to_str()
        .map_err(|_| format!("Invalid {} header format", state.auth_header))?
        .trim();

    if token.is_empty() {
        return Err("Empty JWT token".to_string());
    }
    Ok(token.to_string())
}
