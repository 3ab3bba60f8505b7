//! REST endpoints for activities, nested under the staff member's session.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::model::{Activity, ActivityUpdate, NewActivity};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::pagination::{ListEnvelope, PageParams};
use crate::api::{ApiResult, AppState, created, deleted};
use crate::error::ServiceError;
use crate::sessions::model::Session;

pub fn activity_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/staff/{id}/sessions/{session_id}/activities",
            get(list_activities).post(create_activity),
        )
        .route(
            "/api/staff/{id}/sessions/{session_id}/activities/{activity_id}",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .with_state(state)
}

/// The session, if it exists and is run by `staff_id`.
async fn staff_session(state: &AppState, staff_id: Uuid, session_id: Uuid) -> Result<Session, ServiceError> {
    match state.db.get_session(session_id).await? {
        Some(session) if session.staff_id == staff_id => Ok(session),
        _ => Err(ServiceError::not_found("session")),
    }
}

/// The activity, if it was recorded in `session_id`.
async fn session_activity(
    state: &AppState,
    session_id: Uuid,
    activity_id: Uuid,
) -> Result<Activity, ServiceError> {
    match state.db.get_activity(activity_id).await? {
        Some(activity) if activity.session_id == session_id => Ok(activity),
        _ => Err(ServiceError::not_found("activity")),
    }
}

async fn list_activities(
    State(state): State<AppState>,
    ApiPath((staff_id, session_id)): ApiPath<(Uuid, Uuid)>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Activity>>> {
    staff_session(&state, staff_id, session_id).await?;
    let page = params.page();
    let listing = state.db.list_activities(session_id, page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}

async fn create_activity(
    State(state): State<AppState>,
    ApiPath((staff_id, session_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(new): ApiJson<NewActivity>,
) -> ApiResult<impl IntoResponse> {
    staff_session(&state, staff_id, session_id).await?;
    let activity = new.into_activity(session_id)?;
    state.db.insert_activity(&activity).await?;
    Ok(created(activity))
}

async fn get_activity(
    State(state): State<AppState>,
    ApiPath((staff_id, session_id, activity_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<Activity>> {
    staff_session(&state, staff_id, session_id).await?;
    Ok(Json(session_activity(&state, session_id, activity_id).await?))
}

async fn update_activity(
    State(state): State<AppState>,
    ApiPath((staff_id, session_id, activity_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    ApiJson(update): ApiJson<ActivityUpdate>,
) -> ApiResult<Json<Activity>> {
    staff_session(&state, staff_id, session_id).await?;
    let mut activity = session_activity(&state, session_id, activity_id).await?;
    update.apply(&mut activity)?;
    state.db.update_activity(&activity).await?;
    Ok(Json(activity))
}

async fn delete_activity(
    State(state): State<AppState>,
    ApiPath((staff_id, session_id, activity_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    staff_session(&state, staff_id, session_id).await?;
    session_activity(&state, session_id, activity_id).await?;
    deleted(state.db.delete_activity(activity_id).await?, "activity")
}
