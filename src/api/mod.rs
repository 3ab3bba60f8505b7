//! HTTP surface: shared state, error mapping, and the assembled router.

pub mod docs;
pub mod extract;
pub mod pagination;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::activities::routes::activity_routes;
use crate::branches::routes::branch_routes;
use crate::clock;
use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::guardians::routes::guardian_routes;
use crate::medicines::routes::medicine_routes;
use crate::onboarding::OnboardingManager;
use crate::onboarding::routes::onboarding_routes;
use crate::patients::routes::patient_routes;
use crate::sessions::SessionScheduler;
use crate::sessions::routes::session_routes;
use crate::staff::routes::staff_routes;
use crate::store::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub scheduler: Arc<SessionScheduler>,
    pub onboarding: Arc<OnboardingManager>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            scheduler: Arc::new(SessionScheduler::new(Arc::clone(&db))),
            onboarding: Arc::new(OnboardingManager::new(Arc::clone(&db))),
            db,
        }
    }
}

/// Build the full application router with middleware.
pub fn router(state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(patient_routes(state.clone()))
        .merge(guardian_routes(state.clone()))
        .merge(staff_routes(state.clone()))
        .merge(session_routes(state.clone()))
        .merge(activity_routes(state.clone()))
        .merge(medicine_routes(state.clone()))
        .merge(branch_routes(state.clone()))
        .merge(onboarding_routes(state))
        .merge(docs::docs_routes(&config.name))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "palaam"
    }))
}

// ── Error mapping ───────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ServiceError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ServiceError::Persistence(err) => {
                tracing::error!(error = %err, "Persistence failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "query failed".to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// ── Handler helpers ─────────────────────────────────────────────────

pub type ApiResult<T> = Result<T, ServiceError>;

/// Unwrap a lookup, mapping `None` to `NotFound` for `entity`.
pub fn found<T>(value: Option<T>, entity: &str) -> ApiResult<T> {
    value.ok_or_else(|| ServiceError::not_found(entity))
}

/// 204 when a row was removed, 404 otherwise.
pub fn deleted(removed: bool, entity: &str) -> ApiResult<StatusCode> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServiceError::not_found(entity))
    }
}

/// 201 with the created record as body.
pub fn created<T: Serialize>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}

/// Parse an optional RFC 3339 query parameter, at stored precision.
pub fn parse_time_param(name: &str, value: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(clock::stored(dt.with_timezone(&Utc))))
            .map_err(|_| ServiceError::invalid(format!("{name} must be an RFC 3339 timestamp"))),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::store::fixtures::memory_db;

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = router(AppState::new(memory_db().await), &AppConfig::default());
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "palaam");
    }

    #[tokio::test]
    async fn query_rejections_are_bad_requests() {
        let app = router(AppState::new(memory_db().await), &AppConfig::default());
        let request = Request::get("/api/sessions?staff_id=not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    /// Every operation in the API reference is served by the router. An
    /// unrouted path gets axum's empty 404, a wrong method gets 405; handler
    /// errors always carry a JSON body.
    #[tokio::test]
    async fn documented_routes_are_served() {
        let app = router(AppState::new(memory_db().await), &AppConfig::default());
        let filler = uuid::Uuid::new_v4().to_string();
        for &(method, path, _, _) in docs::ROUTES {
            let uri: String = path
                .split('/')
                .map(|seg| if seg.starts_with('{') { filler.as_str() } else { seg })
                .collect::<Vec<_>>()
                .join("/");
            let request = Request::builder()
                .method(method.to_uppercase().as_str())
                .uri(&uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = call(app.clone(), request).await;
            assert_ne!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {path}");
            assert!(
                status != StatusCode::NOT_FOUND || !body.is_null(),
                "{method} {path} is not routed"
            );
        }
    }

    #[tokio::test]
    async fn json_rejections_are_bad_requests() {
        let app = router(AppState::new(memory_db().await), &AppConfig::default());
        let request = Request::post("/api/guardians")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "Mona", "unexpected": 1}"#))
            .unwrap();
        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::not_found("patient"), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::invalid("bad"), StatusCode::BAD_REQUEST),
            (
                ServiceError::Persistence(crate::error::DatabaseError::Query("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn time_params() {
        assert_eq!(parse_time_param("from", None).unwrap(), None);
        assert_eq!(parse_time_param("from", Some(" ")).unwrap(), None);
        assert!(parse_time_param("from", Some("2026-03-02T09:00:00Z")).unwrap().is_some());
        assert!(parse_time_param("from", Some("yesterday")).is_err());
    }
}
