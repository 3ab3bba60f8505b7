//! REST endpoints for assessments, their questions, and patient intake.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::model::{
    AnswerRequest, Assessment, AssessmentUpdate, IntakeBatch, IntakeRequest, NewAssessment,
    NewQuestion, OnboardingQuestion, OnboardingResponse, QuestionUpdate,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::pagination::{ListEnvelope, PageParams};
use crate::api::{ApiResult, AppState, created, deleted, found};

#[derive(Debug, Default, Deserialize)]
struct ResponseQuery {
    question_id: Option<i64>,
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/assessments", get(list_assessments).post(create_assessment))
        .route(
            "/api/assessments/{id}",
            get(get_assessment).put(update_assessment).delete(delete_assessment),
        )
        .route(
            "/api/assessments/{id}/questions",
            get(list_questions).post(create_question),
        )
        .route(
            "/api/onboarding/questions/{id}",
            get(get_question).put(update_question).delete(delete_question),
        )
        .route(
            "/api/onboarding/responses/{id}",
            get(get_response).put(answer_response).delete(delete_response),
        )
        .route(
            "/api/patients/{id}/onboarding",
            get(list_patient_responses).post(start_intake),
        )
        .with_state(state)
}

async fn require_assessment(state: &AppState, id: i64) -> ApiResult<Assessment> {
    found(state.db.get_assessment(id).await?, "assessment")
}

async fn list_assessments(
    State(state): State<AppState>,
) -> ApiResult<Json<ListEnvelope<Assessment>>> {
    Ok(Json(ListEnvelope::all(state.db.list_assessments().await?)))
}

/// POST /api/assessments
///
/// Catalog assessments created after a wipe get their questions back.
async fn create_assessment(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewAssessment>,
) -> ApiResult<impl IntoResponse> {
    let name = new.validated_name()?;
    let assessment = state.db.insert_assessment(&name).await?;
    let seeded = state
        .onboarding
        .seed_questions_for_assessment(assessment.id, &assessment.name)
        .await?;
    info!(assessment_id = assessment.id, seeded, "Assessment created");
    Ok(created(assessment))
}

async fn get_assessment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Assessment>> {
    Ok(Json(require_assessment(&state, id).await?))
}

async fn update_assessment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<AssessmentUpdate>,
) -> ApiResult<Json<Assessment>> {
    let mut assessment = require_assessment(&state, id).await?;
    update.apply(&mut assessment)?;
    state.db.update_assessment(&assessment).await?;
    Ok(Json(assessment))
}

async fn delete_assessment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    deleted(state.db.delete_assessment(id).await?, "assessment")
}

async fn list_questions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ListEnvelope<OnboardingQuestion>>> {
    require_assessment(&state, id).await?;
    Ok(Json(ListEnvelope::all(state.db.list_questions(id).await?)))
}

async fn create_question(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(mut new): ApiJson<NewQuestion>,
) -> ApiResult<impl IntoResponse> {
    require_assessment(&state, id).await?;
    new.assessment_id = id;
    let question = state.db.insert_question(&new.normalized()?).await?;
    Ok(created(question))
}

async fn get_question(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<OnboardingQuestion>> {
    Ok(Json(found(state.db.get_question(id).await?, "question")?))
}

async fn update_question(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<QuestionUpdate>,
) -> ApiResult<Json<OnboardingQuestion>> {
    let mut question = found(state.db.get_question(id).await?, "question")?;
    update.apply(&mut question)?;
    state.db.update_question(&question).await?;
    Ok(Json(question))
}

async fn delete_question(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    deleted(state.db.delete_question(id).await?, "question")
}

async fn get_response(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<OnboardingResponse>> {
    Ok(Json(found(
        state.db.get_onboarding_response(id).await?,
        "onboarding response",
    )?))
}

async fn answer_response(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<AnswerRequest>,
) -> ApiResult<Json<OnboardingResponse>> {
    let response = state
        .onboarding
        .record_answer(id, body.answer, body.session_id)
        .await?;
    Ok(Json(response))
}

async fn delete_response(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    deleted(
        state.db.delete_onboarding_response(id).await?,
        "onboarding response",
    )
}

async fn list_patient_responses(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(filter): ApiQuery<ResponseQuery>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ListEnvelope<OnboardingResponse>>> {
    found(state.db.get_patient(id).await?, "patient")?;
    let page = params.page();
    let listing = state
        .db
        .list_onboarding_responses(id, filter.question_id, page)
        .await?;
    Ok(Json(ListEnvelope::new(listing, page)))
}

/// POST /api/patients/{id}/onboarding
///
/// Starts an intake: one pending response per question of the assessment.
async fn start_intake(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<IntakeRequest>,
) -> ApiResult<(StatusCode, Json<IntakeBatch>)> {
    found(state.db.get_patient(id).await?, "patient")?;
    found(state.db.get_staff(request.staff_id).await?, "staff")?;
    let batch = state
        .onboarding
        .generate_intake_responses(id, request.staff_id, request.assessment_id, request.session_id)
        .await?;
    Ok(created(batch))
}
