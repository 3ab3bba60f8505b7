//! REST endpoints for sessions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use super::model::{NewSession, Session, SessionDetails, SessionFilter, SessionUpdate};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::pagination::{ListEnvelope, PageParams};
use crate::api::{ApiResult, AppState, created, found, parse_time_param};
use crate::store::Page;

#[derive(Debug, Default, Deserialize)]
struct SessionQuery {
    from: Option<String>,
    to: Option<String>,
    staff_id: Option<Uuid>,
    patient_id: Option<Uuid>,
}

pub fn session_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route(
            "/api/sessions/{id}",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/details", get(get_session_details))
        .with_state(state)
}

async fn list_sessions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionQuery>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Session>>> {
    let filter = SessionFilter {
        patient_id: query.patient_id,
        staff_id: query.staff_id,
        from: parse_time_param("from", query.from.as_deref())?,
        to: parse_time_param("to", query.to.as_deref())?,
    };
    let page = params.page();
    let listing = state.db.list_sessions(&filter, page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}

/// Overlapping bookings for the same staff member → 409.
async fn create_session(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewSession>,
) -> ApiResult<impl IntoResponse> {
    let session = state.scheduler.create(new).await?;
    Ok(created(session))
}

async fn get_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Session>> {
    Ok(Json(found(state.db.get_session(id).await?, "session")?))
}

async fn update_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<SessionUpdate>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.scheduler.update(id, update).await?))
}

async fn delete_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.scheduler.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_session_details(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<SessionDetails>> {
    let session = found(state.db.get_session(id).await?, "session")?;
    let activities = state
        .db
        .list_activities(
            id,
            Page {
                limit: i64::MAX,
                offset: 0,
            },
        )
        .await?
        .items;
    Ok(Json(SessionDetails {
        session,
        activities,
    }))
}
