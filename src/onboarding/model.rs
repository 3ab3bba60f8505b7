//! Onboarding data model: assessments, their questions, and per-patient
//! responses collected during intake.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::error::ServiceError;

/// A standard assessment instrument (VB-MAPP, ESFLS, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: i64,
    pub name: String,
}

/// Body of `POST /api/assessments`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAssessment {
    pub name: String,
}

impl NewAssessment {
    pub fn validated_name(&self) -> Result<String, ServiceError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid("assessment name is required"));
        }
        Ok(name.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessmentUpdate {
    pub name: Option<String>,
}

impl AssessmentUpdate {
    pub fn apply(self, assessment: &mut Assessment) -> Result<(), ServiceError> {
        if let Some(name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::invalid("assessment name is required"));
            }
            assessment.name = name.to_string();
        }
        Ok(())
    }
}

/// One catalog question. `text` is unique across the whole catalog,
/// ignoring case and runs of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingQuestion {
    pub id: i64,
    pub text: String,
    /// Cluster of related questions within the assessment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
    pub assessment_id: i64,
}

/// Question to insert. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewQuestion {
    pub text: String,
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(skip)]
    pub assessment_id: i64,
}

impl NewQuestion {
    pub fn new(assessment_id: i64, text: &str, group: Option<i64>) -> Self {
        Self {
            text: text.to_string(),
            group,
            assessment_id,
        }
    }

    /// Normalize text and check required fields.
    pub fn normalized(mut self) -> Result<Self, ServiceError> {
        self.text = normalize_question_text(&self.text);
        if self.text.is_empty() {
            return Err(ServiceError::invalid("question text is required"));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionUpdate {
    pub text: Option<String>,
    pub group: Option<i64>,
    pub assessment_id: Option<i64>,
}

impl QuestionUpdate {
    pub fn apply(self, question: &mut OnboardingQuestion) -> Result<(), ServiceError> {
        if let Some(text) = self.text {
            let text = normalize_question_text(&text);
            if text.is_empty() {
                return Err(ServiceError::invalid("question text is required"));
            }
            question.text = text;
        }
        if let Some(group) = self.group {
            question.group = Some(group);
        }
        if let Some(assessment_id) = self.assessment_id {
            question.assessment_id = assessment_id;
        }
        Ok(())
    }
}

/// Collapse whitespace runs and trim, so "What  is your name? " and
/// "What is your name?" are the same question.
pub fn normalize_question_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lifecycle of an onboarding response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Created at intake, not answered yet.
    Pending,
    /// Answer recorded.
    Answered,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Pending => "pending",
            ResponseStatus::Answered => "answered",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ResponseStatus::Pending),
            "answered" => Ok(ResponseStatus::Answered),
            other => Err(format!("unknown response status: {other}")),
        }
    }
}

/// One patient's response to one question, created during one intake batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingResponse {
    pub id: Uuid,
    /// Shared by every response generated in the same intake.
    pub batch_id: Uuid,
    pub question_id: i64,
    /// Question text, resolved from the catalog when read.
    pub question_text: String,
    pub patient_id: Uuid,
    /// Staff member who administered the assessment.
    pub staff_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub response_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<DateTime<Utc>>,
}

impl OnboardingResponse {
    /// A pending response for `question` in intake `batch_id`.
    pub fn pending(
        batch_id: Uuid,
        question: &OnboardingQuestion,
        patient_id: Uuid,
        staff_id: Uuid,
        session_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            batch_id,
            question_id: question.id,
            question_text: question.text.clone(),
            patient_id,
            staff_id,
            session_id,
            status: ResponseStatus::Pending,
            answer: None,
            response_date: now,
            answered_at: None,
        }
    }

    /// Record the answer and move to `Answered`.
    pub fn answer(&mut self, answer: impl Into<String>) -> Result<(), ServiceError> {
        let answer = answer.into();
        if answer.trim().is_empty() {
            return Err(ServiceError::invalid("answer cannot be empty"));
        }
        self.answer = Some(answer);
        self.status = ResponseStatus::Answered;
        self.answered_at = Some(clock::now());
        Ok(())
    }
}

/// Body of `POST /api/patients/{id}/onboarding`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntakeRequest {
    pub staff_id: Uuid,
    pub assessment_id: i64,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// The pending responses created by one intake.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeBatch {
    pub batch_id: Uuid,
    pub responses: Vec<OnboardingResponse>,
}

/// Body of `PUT /api/onboarding/responses/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerRequest {
    pub answer: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}
