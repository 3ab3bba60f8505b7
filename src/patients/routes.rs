//! REST endpoints for patients and their related records.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::model::{NewPatient, Patient, PatientUpdate};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::pagination::{ListEnvelope, PageParams};
use crate::api::{ApiResult, AppState, created, deleted, found};
use crate::error::ServiceError;
use crate::guardians::model::Guardian;
use crate::medicines::model::Medicine;
use crate::sessions::model::{Session, SessionFilter};

#[derive(Debug, Default, Deserialize)]
struct PatientQuery {
    name: Option<String>,
}

/// Build the patient REST routes.
pub fn patient_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/patients", get(list_patients).post(create_patient))
        .route(
            "/api/patients/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/api/patients/{id}/sessions", get(list_patient_sessions))
        .route(
            "/api/patients/{id}/sessions/{session_id}",
            get(get_patient_session),
        )
        .route("/api/patients/{id}/guardians", get(list_patient_guardians))
        .route(
            "/api/patients/{id}/guardians/{guardian_id}",
            post(link_guardian).delete(unlink_guardian),
        )
        .route("/api/patients/{id}/medicines", get(list_patient_medicines))
        .with_state(state)
}

async fn require_patient(state: &AppState, id: Uuid) -> ApiResult<Patient> {
    found(state.db.get_patient(id).await?, "patient")
}

async fn list_patients(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PatientQuery>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Patient>>> {
    let page = params.page();
    let listing = state.db.list_patients(filter.name.as_deref(), page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}

async fn create_patient(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewPatient>,
) -> ApiResult<impl IntoResponse> {
    let patient = new.into_patient()?;
    state.db.insert_patient(&patient).await?;
    info!(patient_id = %patient.id, "Patient created");
    Ok(created(patient))
}

async fn get_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Patient>> {
    Ok(Json(require_patient(&state, id).await?))
}

async fn update_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<PatientUpdate>,
) -> ApiResult<Json<Patient>> {
    let mut patient = require_patient(&state, id).await?;
    update.apply(&mut patient)?;
    state.db.update_patient(&patient).await?;
    Ok(Json(patient))
}

async fn delete_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let status = deleted(state.db.delete_patient(id).await?, "patient")?;
    info!(patient_id = %id, "Patient deleted");
    Ok(status)
}

async fn list_patient_sessions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Session>>> {
    require_patient(&state, id).await?;
    let page = params.page();
    let filter = SessionFilter {
        patient_id: Some(id),
        ..SessionFilter::default()
    };
    let listing = state.db.list_sessions(&filter, page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}

/// A session is only visible under the patient it belongs to.
async fn get_patient_session(
    State(state): State<AppState>,
    ApiPath((id, session_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Session>> {
    require_patient(&state, id).await?;
    match state.db.get_session(session_id).await? {
        Some(session) if session.patient_id == id => Ok(Json(session)),
        _ => Err(ServiceError::not_found("session")),
    }
}

async fn list_patient_guardians(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ListEnvelope<Guardian>>> {
    require_patient(&state, id).await?;
    let guardians = state.db.list_patient_guardians(id).await?;
    Ok(Json(ListEnvelope::all(guardians)))
}

async fn link_guardian(
    State(state): State<AppState>,
    ApiPath((id, guardian_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_patient(&state, id).await?;
    found(state.db.get_guardian(guardian_id).await?, "guardian")?;
    state.db.link_guardian(id, guardian_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unlink_guardian(
    State(state): State<AppState>,
    ApiPath((id, guardian_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    deleted(
        state.db.unlink_guardian(id, guardian_id).await?,
        "guardian link",
    )
}

async fn list_patient_medicines(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<Medicine>>> {
    require_patient(&state, id).await?;
    let page = params.page();
    let listing = state.db.list_patient_medicines(id, page).await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}
