//! REST endpoints for prescribed medicines.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use super::model::{Medicine, MedicineUpdate, NewMedicine};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::{ApiResult, AppState, created, deleted, found};

pub fn medicine_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/medicines", post(create_medicine))
        .route(
            "/api/medicines/{id}",
            get(get_medicine).put(update_medicine).delete(delete_medicine),
        )
        .with_state(state)
}

async fn create_medicine(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewMedicine>,
) -> ApiResult<impl IntoResponse> {
    let medicine = new.into_medicine()?;
    found(state.db.get_patient(medicine.patient_id).await?, "patient")?;
    found(state.db.get_staff(medicine.prescriber_id).await?, "prescriber")?;
    state.db.insert_medicine(&medicine).await?;
    info!(medicine_id = %medicine.id, patient_id = %medicine.patient_id, "Medicine prescribed");
    Ok(created(medicine))
}

async fn get_medicine(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Medicine>> {
    Ok(Json(found(state.db.get_medicine(id).await?, "medicine")?))
}

async fn update_medicine(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<MedicineUpdate>,
) -> ApiResult<Json<Medicine>> {
    let mut medicine = found(state.db.get_medicine(id).await?, "medicine")?;
    update.apply(&mut medicine)?;
    state.db.update_medicine(&medicine).await?;
    Ok(Json(medicine))
}

async fn delete_medicine(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    deleted(state.db.delete_medicine(id).await?, "medicine")
}
