//! REST endpoints for guardians.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use super::model::{Guardian, GuardianUpdate, NewGuardian};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::{ApiResult, AppState, created, deleted, found};

pub fn guardian_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/guardians", post(create_guardian))
        .route(
            "/api/guardians/{id}",
            get(get_guardian).put(update_guardian).delete(delete_guardian),
        )
        .with_state(state)
}

async fn create_guardian(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewGuardian>,
) -> ApiResult<impl IntoResponse> {
    let guardian = new.into_guardian()?;
    state.db.insert_guardian(&guardian).await?;
    Ok(created(guardian))
}

async fn get_guardian(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Guardian>> {
    Ok(Json(found(state.db.get_guardian(id).await?, "guardian")?))
}

async fn update_guardian(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<GuardianUpdate>,
) -> ApiResult<Json<Guardian>> {
    let mut guardian = found(state.db.get_guardian(id).await?, "guardian")?;
    update.apply(&mut guardian)?;
    state.db.update_guardian(&guardian).await?;
    Ok(Json(guardian))
}

async fn delete_guardian(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    deleted(state.db.delete_guardian(id).await?, "guardian")
}
