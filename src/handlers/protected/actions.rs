use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::utils::department_case;
use crate::api::representations;
use crate::app::AppState;
use crate::database::models::{TrackedCase, TrackedPerson};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidatedDepartment};

#[derive(Debug, Default, Deserialize)]
pub struct ActionsReviewed {
    #[serde(default)]
    pub comment: Option<String>,
}

/// GET /api/hd/actions/:id - every action item of the case's tracked person
pub async fn actions_get(
    State(state): State<AppState>,
    Extension(department): Extension<ValidatedDepartment>,
    Path(case_id): Path<Uuid>,
) -> ApiResult<Value> {
    let case = department_case(&state, &department, case_id).await?;
    Ok(ApiResponse::success(case_actions(&state, &case).await?))
}

/// PUT /api/hd/actions/:id/resolve - resolve outstanding items with a comment
pub async fn actions_resolve(
    State(state): State<AppState>,
    Extension(department): Extension<ValidatedDepartment>,
    Extension(auth_user): Extension<AuthUser>,
    Path(case_id): Path<Uuid>,
    payload: Option<Json<ActionsReviewed>>,
) -> ApiResult<Value> {
    let case = department_case(&state, &department, case_id).await?;

    let comment = payload
        .and_then(|Json(body)| body.comment)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::field_error("comment", "must not be blank"))?;

    let author = match state.repos.accounts.find_by_id(auth_user.account_id).await? {
        Some(account) => account.full_name(),
        None => auth_user.username.clone(),
    };

    let resolution = state.actions.resolve_items_for(&case, &comment, &author).await?;
    Ok(ApiResponse::success(case_actions(&state, &resolution.case).await?))
}

/// GET /api/hd/actions - action summaries of all department cases
pub async fn actions_list(
    State(state): State<AppState>,
    Extension(department): Extension<ValidatedDepartment>,
) -> ApiResult<Vec<Value>> {
    let cases = state.repos.cases.find_by_department_id(department.id).await?;

    let mut summaries = Vec::with_capacity(cases.len());
    for case in cases {
        let origins = origin_cases(&state, &department, &case).await?;
        let summary = state.actions.summarize(case).await?;
        summaries.push(representations::case_action_summary(&summary, &origins, &state.messages));
    }

    tracing::debug!("Listed {} action summaries for department {}", summaries.len(), department.name);
    Ok(ApiResponse::success(summaries))
}

async fn case_actions(state: &AppState, case: &TrackedCase) -> Result<Value, ApiError> {
    let person = state.actions.tracked_person_of(case).await?;
    let items = state.repos.items.find_by_tracked_person(person.id).await?;
    Ok(representations::case_actions(case, &person, &items, &state.messages))
}

/// Origin cases visible to the department, in the order they were recorded
async fn origin_cases(
    state: &AppState,
    department: &ValidatedDepartment,
    case: &TrackedCase,
) -> Result<Vec<(TrackedCase, TrackedPerson)>, ApiError> {
    let mut origins = Vec::with_capacity(case.origin_case_ids.len());
    for id in &case.origin_case_ids {
        let Some(origin) = state.repos.cases.find_by_id(*id).await? else {
            continue;
        };
        if !origin.belongs_to(department.id) {
            continue;
        }
        let person = state.actions.tracked_person_of(&origin).await?;
        origins.push((origin, person));
    }
    Ok(origins)
}
