//! Integration tests for the HTTP API.
//!
//! Each test spins up the full router on a random port over an in-memory
//! database with the onboarding catalog seeded, and drives it with reqwest.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use palaam::api::{AppState, router};
use palaam::config::AppConfig;
use palaam::onboarding::OnboardingManager;
use palaam::store::{Database, LibSqlBackend};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Start the API on a random port and return its base URL.
async fn start_server() -> String {
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    OnboardingManager::new(Arc::clone(&db))
        .seed_catalog()
        .await
        .unwrap();
    let app = router(AppState::new(db), &AppConfig::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

async fn post(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let resp = client.post(url).json(&body).send().await.unwrap();
    let status = resp.status();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get(client: &Client, url: String) -> (StatusCode, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn create_staff(client: &Client, base: &str, name: &str) -> String {
    let (status, body) = post(
        client,
        format!("{base}/api/staff"),
        json!({"name": name, "join_date": "2024-01-15", "role": "therapist"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_patient(client: &Client, base: &str, staff_id: &str) -> String {
    let (status, body) = post(
        client,
        format!("{base}/api/patients"),
        json!({"name": "Ahmed", "dob": "2019-06-01", "staff_id": staff_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

fn session_body(patient: &str, staff: &str, start: &str, end: &str) -> Value {
    json!({
        "patient_id": patient,
        "staff_id": staff,
        "start_time": start,
        "end_time": end,
        "description": "speech therapy"
    })
}

#[tokio::test]
async fn health_and_docs_are_served() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = Client::new();

        let (status, body) = get(&client, format!("{base}/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = get(&client, format!("{base}/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/sessions"].is_object());

        let resp = client.get(format!("{base}/docs")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.text().await.unwrap().contains("/openapi.json"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn session_scheduling_rejects_overlap() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = Client::new();
        let staff = create_staff(&client, &base, "Sara").await;
        let patient = create_patient(&client, &base, &staff).await;

        let (status, first) = post(
            &client,
            format!("{base}/api/sessions"),
            session_body(&patient, &staff, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{first}");

        // Touching intervals do not overlap.
        let (status, _) = post(
            &client,
            format!("{base}/api/sessions"),
            session_body(&patient, &staff, "2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z"),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post(
            &client,
            format!("{base}/api/sessions"),
            session_body(&patient, &staff, "2026-03-02T09:30:00Z", "2026-03-02T10:30:00Z"),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("overlap"));

        let (status, body) = get(
            &client,
            format!(
                "{base}/api/staff/{staff}/availability?start=2026-03-02T09:30:00Z&end=2026-03-02T09:45:00Z"
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overlap"], true);

        let (status, body) = get(&client, format!("{base}/api/patients/{patient}/sessions")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);

        // Sessions with no activities can be deleted.
        let id = first["id"].as_str().unwrap();
        let resp = client
            .delete(format!("{base}/api/sessions/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let (status, _) = get(&client, format!("{base}/api/sessions/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn concurrent_overlapping_creates_admit_one() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = Client::new();
        let staff = create_staff(&client, &base, "Sara").await;
        let patient = create_patient(&client, &base, &staff).await;

        let requests = (0..8).map(|i| {
            let client = client.clone();
            let url = format!("{base}/api/sessions");
            let body = session_body(
                &patient,
                &staff,
                &format!("2026-03-02T09:0{i}:00Z"),
                "2026-03-02T10:00:00Z",
            );
            async move { post(&client, url, body).await.0 }
        });
        let statuses = futures::future::join_all(requests).await;

        let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
        let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
        assert_eq!(created, 1, "{statuses:?}");
        assert_eq!(conflicts, 7, "{statuses:?}");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = Client::new();

        let (status, body) = get(&client, format!("{base}/api/patients/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = post(
            &client,
            format!("{base}/api/guardians"),
            json!({"name": "Mona", "nickname": "M"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&client, format!("{base}/api/staff?role=janitor")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&client, format!("{base}/api/branches/1/hours/9")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = uuid::Uuid::new_v4();
        let (status, body) = get(&client, format!("{base}/api/patients/{missing}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "patient not found");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn activities_are_scoped_to_the_staff_session() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = Client::new();
        let staff = create_staff(&client, &base, "Sara").await;
        let other = create_staff(&client, &base, "Omar").await;
        let patient = create_patient(&client, &base, &staff).await;
        let (_, session) = post(
            &client,
            format!("{base}/api/sessions"),
            session_body(&patient, &staff, "2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
        )
        .await;
        let session_id = session["id"].as_str().unwrap();

        let (status, activity) = post(
            &client,
            format!("{base}/api/staff/{staff}/sessions/{session_id}/activities"),
            json!({"description": "picture cards", "duration_minutes": 20}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{activity}");

        let (status, _) = get(
            &client,
            format!("{base}/api/staff/{other}/sessions/{session_id}/activities"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, details) = get(&client, format!("{base}/api/sessions/{session_id}/details")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details["activities"].as_array().unwrap().len(), 1);

        // A session with activities cannot be deleted.
        let resp = client
            .delete(format!("{base}/api/sessions/{session_id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn branch_hours_are_unique_per_day() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = Client::new();

        let (status, branch) = post(
            &client,
            format!("{base}/api/branches"),
            json!({"location": "Muscat", "opening_date": "2023-09-01"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{branch}");
        let id = branch["id"].as_i64().unwrap();

        let hours = json!({"day_of_week": 1, "open_time": "08:00", "close_time": "16:00"});
        let (status, _) = post(&client, format!("{base}/api/branches/{id}/hours"), hours.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = post(&client, format!("{base}/api/branches/{id}/hours"), hours).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = get(&client, format!("{base}/api/branches/{id}/hours/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["open_time"], "08:00");

        let (status, _) = post(
            &client,
            format!("{base}/api/branches/{id}/hours"),
            json!({"day_of_week": 2, "open_time": "17:00", "close_time": "09:00"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn onboarding_intake_flow() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = Client::new();
        let staff = create_staff(&client, &base, "Sara").await;
        let patient = create_patient(&client, &base, &staff).await;

        let (status, body) = get(&client, format!("{base}/api/assessments")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["VB-MAPP", "ESFLS", "ABLLS-R"]);
        let esfls = body["data"][1]["id"].as_i64().unwrap();

        let (status, batch) = post(
            &client,
            format!("{base}/api/patients/{patient}/onboarding"),
            json!({"staff_id": staff, "assessment_id": esfls}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{batch}");
        let responses = batch["responses"].as_array().unwrap();
        assert_eq!(responses.len(), 3);
        assert!(responses.iter().all(|r| r["status"] == "pending"));

        let response_id = responses[0]["id"].as_str().unwrap();
        let resp = client
            .put(format!("{base}/api/onboarding/responses/{response_id}"))
            .json(&json!({"answer": "Uses two-word phrases"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let answered: Value = resp.json().await.unwrap();
        assert_eq!(answered["status"], "answered");

        let (status, body) = get(&client, format!("{base}/api/patients/{patient}/onboarding")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);

        let (status, _) = post(
            &client,
            format!("{base}/api/patients/{patient}/onboarding"),
            json!({"staff_id": staff, "assessment_id": 9999}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    })
    .await
    .expect("test timed out");
}
