//! REST endpoints for branches and their weekly operating hours.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use super::model::{
    Branch, BranchUpdate, NewBranch, NewOperatingHours, OperatingHours, OperatingHoursUpdate,
    validate_day,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::pagination::{ListEnvelope, PageParams};
use crate::api::{ApiResult, AppState, created, deleted, found};

pub fn branch_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/branches", get(list_branches).post(create_branch))
        .route(
            "/api/branches/{id}",
            get(get_branch).put(update_branch).delete(delete_branch),
        )
        .route("/api/branches/{id}/hours", get(list_hours).post(create_hours))
        .route(
            "/api/branches/{id}/hours/{day}",
            get(get_hours).put(update_hours).delete(delete_hours),
        )
        .with_state(state)
}

async fn require_branch(state: &AppState, id: i64) -> ApiResult<Branch> {
    found(state.db.get_branch(id).await?, "branch")
}

async fn list_branches(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Branch>>> {
    let page = params.page();
    let listing = state.db.list_branches(page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}

async fn create_branch(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewBranch>,
) -> ApiResult<impl IntoResponse> {
    let branch = state.db.insert_branch(&new).await?;
    info!(branch_id = branch.id, "Branch created");
    Ok(created(branch))
}

async fn get_branch(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Branch>> {
    Ok(Json(require_branch(&state, id).await?))
}

async fn update_branch(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<BranchUpdate>,
) -> ApiResult<Json<Branch>> {
    let mut branch = require_branch(&state, id).await?;
    update.apply(&mut branch);
    state.db.update_branch(&branch).await?;
    Ok(Json(branch))
}

async fn delete_branch(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    deleted(state.db.delete_branch(id).await?, "branch")
}

async fn list_hours(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ListEnvelope<OperatingHours>>> {
    require_branch(&state, id).await?;
    let hours = state.db.list_operating_hours(id).await?;
    Ok(Json(ListEnvelope::all(hours)))
}

async fn create_hours(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(new): ApiJson<NewOperatingHours>,
) -> ApiResult<impl IntoResponse> {
    require_branch(&state, id).await?;
    let hours = new.into_hours(id)?;
    state.db.insert_operating_hours(&hours).await?;
    Ok(created(hours))
}

async fn get_hours(
    State(state): State<AppState>,
    ApiPath((id, day)): ApiPath<(i64, u8)>,
) -> ApiResult<Json<OperatingHours>> {
    validate_day(day)?;
    Ok(Json(found(
        state.db.get_operating_hours(id, day).await?,
        "operating hours",
    )?))
}

async fn update_hours(
    State(state): State<AppState>,
    ApiPath((id, day)): ApiPath<(i64, u8)>,
    ApiJson(update): ApiJson<OperatingHoursUpdate>,
) -> ApiResult<Json<OperatingHours>> {
    validate_day(day)?;
    let mut hours = found(
        state.db.get_operating_hours(id, day).await?,
        "operating hours",
    )?;
    update.apply(&mut hours)?;
    state.db.update_operating_hours(&hours).await?;
    Ok(Json(hours))
}

async fn delete_hours(
    State(state): State<AppState>,
    ApiPath((id, day)): ApiPath<(i64, u8)>,
) -> ApiResult<StatusCode> {
    validate_day(day)?;
    deleted(
        state.db.delete_operating_hours(id, day).await?,
        "operating hours",
    )
}
