use axum::extract::{Extension, Path, State};
use serde_json::Value;
use uuid::Uuid;

use super::utils::department_case;
use crate::api::representations;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, ValidatedDepartment};

/// GET /api/hd/cases/:id - case summary, target of the case links
pub async fn case_get(
    State(state): State<AppState>,
    Extension(department): Extension<ValidatedDepartment>,
    Path(case_id): Path<Uuid>,
) -> ApiResult<Value> {
    let case = department_case(&state, &department, case_id).await?;
    let person = state.actions.tracked_person_of(&case).await?;

    Ok(ApiResponse::success(representations::tracked_case_summary(&case, &person)))
}
