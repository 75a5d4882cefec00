use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::TrackedCase;
use crate::error::ApiError;
use crate::middleware::ValidatedDepartment;

/// Load a case owned by the caller's department.
/// Cases of other departments are reported as missing, not forbidden.
pub async fn department_case(
    state: &AppState,
    department: &ValidatedDepartment,
    case_id: Uuid,
) -> Result<TrackedCase, ApiError> {
    match state.repos.cases.find_by_id(case_id).await? {
        Some(case) if case.belongs_to(department.id) => Ok(case),
        Some(_) => {
            tracing::warn!("Case {} requested from foreign department {}", case_id, department.id);
            Err(ApiError::not_found(format!("Case {} not found", case_id)))
        }
        None => Err(ApiError::not_found(format!("Case {} not found", case_id))),
    }
}
