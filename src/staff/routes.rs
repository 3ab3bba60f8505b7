//! REST endpoints for staff, their schedules and prescriptions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::model::{NewStaff, Staff, StaffRole, StaffUpdate};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::pagination::{ListEnvelope, PageParams};
use crate::api::{ApiResult, AppState, created, deleted, found, parse_time_param};
use crate::error::ServiceError;
use crate::medicines::model::Medicine;
use crate::sessions::model::{Session, SessionFilter};
use crate::sessions::overlap::Interval;

#[derive(Debug, Default, Deserialize)]
struct StaffQuery {
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WindowQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AvailabilityQuery {
    start: Option<String>,
    end: Option<String>,
    exclude: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct Availability {
    overlap: bool,
}

pub fn staff_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/staff", get(list_staff).post(create_staff))
        .route(
            "/api/staff/{id}",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
        .route("/api/staff/{id}/sessions", get(list_staff_sessions))
        .route("/api/staff/{id}/availability", get(check_availability))
        .route("/api/staff/{id}/prescriptions", get(list_prescriptions))
        .with_state(state)
}

async fn require_staff(state: &AppState, id: Uuid) -> ApiResult<Staff> {
    found(state.db.get_staff(id).await?, "staff member")
}

async fn list_staff(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<StaffQuery>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Staff>>> {
    let role = match filter.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => Some(raw.parse::<StaffRole>().map_err(ServiceError::InvalidInput)?),
        None => None,
    };
    let page = params.page();
    let listing = state.db.list_staff(role, page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}

async fn create_staff(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewStaff>,
) -> ApiResult<impl IntoResponse> {
    let staff = new.into_staff()?;
    state.db.insert_staff(&staff).await?;
    info!(staff_id = %staff.id, role = %staff.role, "Staff member created");
    Ok(created(staff))
}

async fn get_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Staff>> {
    Ok(Json(require_staff(&state, id).await?))
}

async fn update_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<StaffUpdate>,
) -> ApiResult<Json<Staff>> {
    let mut staff = require_staff(&state, id).await?;
    update.apply(&mut staff)?;
    state.db.update_staff(&staff).await?;
    Ok(Json(staff))
}

/// Staff still referenced by sessions, patients or prescriptions → 409.
async fn delete_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let status = deleted(state.db.delete_staff(id).await?, "staff member")?;
    info!(staff_id = %id, "Staff member deleted");
    Ok(status)
}

async fn list_staff_sessions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(window): ApiQuery<WindowQuery>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Session>>> {
    require_staff(&state, id).await?;
    let filter = SessionFilter {
        staff_id: Some(id),
        from: parse_time_param("from", window.from.as_deref())?,
        to: parse_time_param("to", window.to.as_deref())?,
        ..SessionFilter::default()
    };
    let page = params.page();
    let listing = state.db.list_sessions(&filter, page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}

/// `{"overlap": true}` when `[start, end)` intersects one of the staff
/// member's sessions other than `exclude`.
async fn check_availability(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> ApiResult<Json<Availability>> {
    require_staff(&state, id).await?;
    let start = parse_time_param("start", query.start.as_deref())?
        .ok_or_else(|| ServiceError::invalid("start is required"))?;
    let end = parse_time_param("end", query.end.as_deref())?
        .ok_or_else(|| ServiceError::invalid("end is required"))?;
    if start >= end {
        return Err(ServiceError::invalid("start must be before end"));
    }
    let overlap = state
        .scheduler
        .has_overlap(id, Interval::new(start, end), query.exclude)
        .await?;
    Ok(Json(Availability { overlap }))
}

async fn list_prescriptions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Medicine>>> {
    require_staff(&state, id).await?;
    let page = params.page();
    let listing = state.db.list_prescriptions(id, page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}
