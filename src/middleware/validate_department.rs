use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::auth::AuthUser;
use crate::app::AppState;
use crate::error::ApiError;

/// The caller's department, confirmed to exist
#[derive(Clone, Debug)]
pub struct ValidatedDepartment {
    pub id: Uuid,
    pub name: String,
    pub rki_code: Option<String>,
}

/// Middleware for the health department routes.
/// Loads the department from the token claims and requires a staff role.
pub async fn validate_department_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before department validation"))?;

    if !auth_user.is_department_staff() {
        tracing::warn!(
            "Department access denied: account '{}' holds no department role",
            auth_user.username
        );
        return Err(ApiError::forbidden("Access restricted to health department staff"));
    }

    let department = state
        .repos
        .departments
        .find_by_id(auth_user.department_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(
                "Department validation failed: department {} of '{}' does not exist",
                auth_user.department_id,
                auth_user.username
            );
            ApiError::forbidden("Department does not exist")
        })?;

    tracing::debug!("Department validation successful: {} ({})", department.name, department.id);

    request.extensions_mut().insert(ValidatedDepartment {
        id: department.id,
        name: department.name,
        rki_code: department.rki_code,
    });

    Ok(next.run(request).await)
}
