//! API reference: an OpenAPI document built from the route table, and a
//! Scalar page that renders it.

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value, json};

/// (method, path, tag, summary) for every documented endpoint.
pub(crate) const ROUTES: &[(&str, &str, &str, &str)] = &[
    ("get", "/health", "system", "Liveness probe"),
    ("get", "/api/patients", "patients", "List patients, optionally by name"),
    ("post", "/api/patients", "patients", "Create a patient"),
    ("get", "/api/patients/{id}", "patients", "Get a patient"),
    ("put", "/api/patients/{id}", "patients", "Update a patient"),
    ("delete", "/api/patients/{id}", "patients", "Delete a patient"),
    ("get", "/api/patients/{id}/sessions", "patients", "List a patient's sessions"),
    ("get", "/api/patients/{id}/sessions/{session_id}", "patients", "Get one of a patient's sessions"),
    ("get", "/api/patients/{id}/guardians", "patients", "List a patient's guardians"),
    ("post", "/api/patients/{id}/guardians/{guardian_id}", "patients", "Link a guardian"),
    ("delete", "/api/patients/{id}/guardians/{guardian_id}", "patients", "Unlink a guardian"),
    ("get", "/api/patients/{id}/medicines", "patients", "List a patient's medicines"),
    ("get", "/api/patients/{id}/onboarding", "onboarding", "List a patient's onboarding responses"),
    ("post", "/api/patients/{id}/onboarding", "onboarding", "Start an intake batch"),
    ("post", "/api/guardians", "guardians", "Create a guardian"),
    ("get", "/api/guardians/{id}", "guardians", "Get a guardian"),
    ("put", "/api/guardians/{id}", "guardians", "Update a guardian"),
    ("delete", "/api/guardians/{id}", "guardians", "Delete a guardian"),
    ("get", "/api/staff", "staff", "List staff, optionally by role"),
    ("post", "/api/staff", "staff", "Create a staff member"),
    ("get", "/api/staff/{id}", "staff", "Get a staff member"),
    ("put", "/api/staff/{id}", "staff", "Update a staff member"),
    ("delete", "/api/staff/{id}", "staff", "Delete a staff member"),
    ("get", "/api/staff/{id}/sessions", "staff", "List a staff member's sessions"),
    ("get", "/api/staff/{id}/availability", "staff", "Check a time window for overlap"),
    ("get", "/api/staff/{id}/prescriptions", "staff", "List prescriptions written by a doctor"),
    ("get", "/api/staff/{id}/sessions/{session_id}/activities", "activities", "List session activities"),
    ("post", "/api/staff/{id}/sessions/{session_id}/activities", "activities", "Record an activity"),
    ("get", "/api/staff/{id}/sessions/{session_id}/activities/{activity_id}", "activities", "Get an activity"),
    ("put", "/api/staff/{id}/sessions/{session_id}/activities/{activity_id}", "activities", "Update an activity"),
    ("delete", "/api/staff/{id}/sessions/{session_id}/activities/{activity_id}", "activities", "Delete an activity"),
    ("get", "/api/sessions", "sessions", "List sessions"),
    ("post", "/api/sessions", "sessions", "Schedule a session"),
    ("get", "/api/sessions/{id}", "sessions", "Get a session"),
    ("put", "/api/sessions/{id}", "sessions", "Reschedule or edit a session"),
    ("delete", "/api/sessions/{id}", "sessions", "Delete a session"),
    ("get", "/api/sessions/{id}/details", "sessions", "Get a session with its activities"),
    ("post", "/api/medicines", "medicines", "Prescribe a medicine"),
    ("get", "/api/medicines/{id}", "medicines", "Get a medicine"),
    ("put", "/api/medicines/{id}", "medicines", "Update a medicine"),
    ("delete", "/api/medicines/{id}", "medicines", "Delete a medicine"),
    ("get", "/api/branches", "branches", "List branches"),
    ("post", "/api/branches", "branches", "Create a branch"),
    ("get", "/api/branches/{id}", "branches", "Get a branch"),
    ("put", "/api/branches/{id}", "branches", "Update a branch"),
    ("delete", "/api/branches/{id}", "branches", "Delete a branch and its hours"),
    ("get", "/api/branches/{id}/hours", "branches", "List a branch's operating hours"),
    ("post", "/api/branches/{id}/hours", "branches", "Set hours for a weekday"),
    ("get", "/api/branches/{id}/hours/{day}", "branches", "Get hours for a weekday"),
    ("put", "/api/branches/{id}/hours/{day}", "branches", "Update hours for a weekday"),
    ("delete", "/api/branches/{id}/hours/{day}", "branches", "Remove hours for a weekday"),
    ("get", "/api/assessments", "onboarding", "List assessments"),
    ("post", "/api/assessments", "onboarding", "Create an assessment"),
    ("get", "/api/assessments/{id}", "onboarding", "Get an assessment"),
    ("put", "/api/assessments/{id}", "onboarding", "Rename an assessment"),
    ("delete", "/api/assessments/{id}", "onboarding", "Delete an assessment"),
    ("get", "/api/assessments/{id}/questions", "onboarding", "List an assessment's questions"),
    ("post", "/api/assessments/{id}/questions", "onboarding", "Add a question"),
    ("get", "/api/onboarding/questions/{id}", "onboarding", "Get a question"),
    ("put", "/api/onboarding/questions/{id}", "onboarding", "Update a question"),
    ("delete", "/api/onboarding/questions/{id}", "onboarding", "Delete a question"),
    ("get", "/api/onboarding/responses/{id}", "onboarding", "Get a response"),
    ("put", "/api/onboarding/responses/{id}", "onboarding", "Answer a response"),
    ("delete", "/api/onboarding/responses/{id}", "onboarding", "Delete a response"),
];

pub fn docs_routes(name: &str) -> Router {
    let document = openapi_document(name);
    let page = Html(scalar_page(name));
    Router::new()
        .route("/openapi.json", get(move || async move { Json(document) }))
        .route("/docs", get(move || async move { page }))
}

/// Names of the `{param}` segments in a route path.
fn path_params(path: &str) -> impl Iterator<Item = &str> {
    path.split('/')
        .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
}

pub fn openapi_document(name: &str) -> Value {
    let mut paths = Map::new();
    for &(method, path, tag, summary) in ROUTES {
        let parameters: Vec<Value> = path_params(path)
            .map(|p| {
                json!({
                    "name": p,
                    "in": "path",
                    "required": true,
                    "schema": { "type": "string" }
                })
            })
            .collect();
        let item = paths
            .entry(path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(ops) = item {
            ops.insert(
                method.to_string(),
                json!({
                    "tags": [tag],
                    "summary": summary,
                    "parameters": parameters,
                    "responses": { "default": { "description": "JSON body or {\"error\": ...}" } }
                }),
            );
        }
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": format!("{name} API"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": paths,
    })
}

fn scalar_page(name: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <title>{name} API Reference</title>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
  </head>
  <body>
    <script id="api-reference" data-url="/openapi.json"></script>
    <script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
  </body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = openapi_document("Palaam");
        assert_eq!(doc["info"]["title"], "Palaam API");
        let paths = doc["paths"].as_object().unwrap();
        let operations: usize = paths.values().map(|ops| ops.as_object().unwrap().len()).sum();
        assert_eq!(operations, ROUTES.len());
        assert!(paths["/api/sessions"]["post"].is_object());
    }

    #[test]
    fn path_parameters_are_declared() {
        let doc = openapi_document("Palaam");
        let params = doc["paths"]["/api/branches/{id}/hours/{day}"]["get"]["parameters"]
            .as_array()
            .unwrap();
        let names: Vec<_> = params.iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["id", "day"]);
    }

    #[test]
    fn scalar_page_points_at_document() {
        let page = scalar_page("Palaam");
        assert!(page.contains("data-url=\"/openapi.json\""));
        assert!(page.contains("Palaam API Reference"));
    }
}
