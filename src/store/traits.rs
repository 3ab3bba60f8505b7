//! Unified `Database` trait: single async interface for all persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::activities::model::Activity;
use crate::branches::model::{Branch, NewBranch, OperatingHours};
use crate::error::DatabaseError;
use crate::guardians::model::Guardian;
use crate::medicines::model::Medicine;
use crate::onboarding::model::{Assessment, NewQuestion, OnboardingQuestion, OnboardingResponse};
use crate::patients::model::Patient;
use crate::sessions::model::{Session, SessionFilter};
use crate::sessions::overlap::Interval;
use crate::staff::model::{Staff, StaffRole};

/// A window into a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

/// One page of rows plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Backend-agnostic database trait covering the clinic schema.
///
/// `update_*` methods write a whole record and fail with
/// `DatabaseError::NotFound` when no row has the record's id. `delete_*`
/// methods report whether a row was removed.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Staff ───────────────────────────────────────────────────────

    async fn insert_staff(&self, staff: &Staff) -> Result<(), DatabaseError>;

    async fn get_staff(&self, id: Uuid) -> Result<Option<Staff>, DatabaseError>;

    /// Staff ordered by name, optionally restricted to one role.
    async fn list_staff(
        &self,
        role: Option<StaffRole>,
        page: Page,
    ) -> Result<Listing<Staff>, DatabaseError>;

    async fn update_staff(&self, staff: &Staff) -> Result<(), DatabaseError>;

    /// Fails with `Constraint` while sessions, patients or prescriptions
    /// still reference the staff member.
    async fn delete_staff(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // ── Patients ────────────────────────────────────────────────────

    async fn insert_patient(&self, patient: &Patient) -> Result<(), DatabaseError>;

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, DatabaseError>;

    /// Patients ordered by name. `name` is a case-insensitive substring filter.
    async fn list_patients(
        &self,
        name: Option<&str>,
        page: Page,
    ) -> Result<Listing<Patient>, DatabaseError>;

    async fn update_patient(&self, patient: &Patient) -> Result<(), DatabaseError>;

    async fn delete_patient(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // ── Guardians ───────────────────────────────────────────────────

    async fn insert_guardian(&self, guardian: &Guardian) -> Result<(), DatabaseError>;

    async fn get_guardian(&self, id: Uuid) -> Result<Option<Guardian>, DatabaseError>;

    async fn update_guardian(&self, guardian: &Guardian) -> Result<(), DatabaseError>;

    async fn delete_guardian(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Link a guardian to a patient. Linking twice is a no-op.
    async fn link_guardian(&self, patient_id: Uuid, guardian_id: Uuid)
    -> Result<(), DatabaseError>;

    async fn unlink_guardian(
        &self,
        patient_id: Uuid,
        guardian_id: Uuid,
    ) -> Result<bool, DatabaseError>;

    async fn list_patient_guardians(&self, patient_id: Uuid)
    -> Result<Vec<Guardian>, DatabaseError>;

    // ── Sessions ────────────────────────────────────────────────────

    /// Check for overlap and insert atomically. Overlap → `Conflict`.
    async fn insert_session(&self, session: &Session) -> Result<(), DatabaseError>;

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, DatabaseError>;

    /// Sessions ordered by start time.
    async fn list_sessions(
        &self,
        filter: &SessionFilter,
        page: Page,
    ) -> Result<Listing<Session>, DatabaseError>;

    /// Check for overlap (excluding the session itself) and update atomically.
    async fn update_session(&self, session: &Session) -> Result<(), DatabaseError>;

    /// Fails with `Constraint` while activities reference the session.
    async fn delete_session(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Does any session of `staff_id`, other than `exclude`, overlap `interval`?
    async fn has_overlapping_session(
        &self,
        staff_id: Uuid,
        interval: &Interval,
        exclude: Option<Uuid>,
    ) -> Result<bool, DatabaseError>;

    // ── Activities ──────────────────────────────────────────────────

    async fn insert_activity(&self, activity: &Activity) -> Result<(), DatabaseError>;

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>, DatabaseError>;

    async fn list_activities(
        &self,
        session_id: Uuid,
        page: Page,
    ) -> Result<Listing<Activity>, DatabaseError>;

    async fn update_activity(&self, activity: &Activity) -> Result<(), DatabaseError>;

    async fn delete_activity(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // ── Medicines ───────────────────────────────────────────────────

    async fn insert_medicine(&self, medicine: &Medicine) -> Result<(), DatabaseError>;

    async fn get_medicine(&self, id: Uuid) -> Result<Option<Medicine>, DatabaseError>;

    async fn list_patient_medicines(
        &self,
        patient_id: Uuid,
        page: Page,
    ) -> Result<Listing<Medicine>, DatabaseError>;

    /// Medicines prescribed by one staff member.
    async fn list_prescriptions(
        &self,
        prescriber_id: Uuid,
        page: Page,
    ) -> Result<Listing<Medicine>, DatabaseError>;

    async fn update_medicine(&self, medicine: &Medicine) -> Result<(), DatabaseError>;

    async fn delete_medicine(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // ── Branches ────────────────────────────────────────────────────

    async fn insert_branch(&self, branch: &NewBranch) -> Result<Branch, DatabaseError>;

    async fn get_branch(&self, id: i64) -> Result<Option<Branch>, DatabaseError>;

    async fn list_branches(&self, page: Page) -> Result<Listing<Branch>, DatabaseError>;

    async fn update_branch(&self, branch: &Branch) -> Result<(), DatabaseError>;

    /// Removes the branch and its operating hours.
    async fn delete_branch(&self, id: i64) -> Result<bool, DatabaseError>;

    /// One row per (branch, day). A second insert for the same day → `Constraint`.
    async fn insert_operating_hours(&self, hours: &OperatingHours) -> Result<(), DatabaseError>;

    async fn get_operating_hours(
        &self,
        branch_id: i64,
        day_of_week: u8,
    ) -> Result<Option<OperatingHours>, DatabaseError>;

    /// Hours for every configured day, Sunday first.
    async fn list_operating_hours(&self, branch_id: i64)
    -> Result<Vec<OperatingHours>, DatabaseError>;

    async fn update_operating_hours(&self, hours: &OperatingHours) -> Result<(), DatabaseError>;

    async fn delete_operating_hours(
        &self,
        branch_id: i64,
        day_of_week: u8,
    ) -> Result<bool, DatabaseError>;

    // ── Assessments ─────────────────────────────────────────────────

    /// Insert a named assessment. Duplicate name → `Constraint`.
    async fn insert_assessment(&self, name: &str) -> Result<Assessment, DatabaseError>;

    /// Insert unless an assessment with this name exists. Returns whether a
    /// row was created.
    async fn insert_assessment_if_absent(&self, name: &str) -> Result<bool, DatabaseError>;

    async fn get_assessment(&self, id: i64) -> Result<Option<Assessment>, DatabaseError>;

    async fn find_assessment_by_name(&self, name: &str)
    -> Result<Option<Assessment>, DatabaseError>;

    async fn list_assessments(&self) -> Result<Vec<Assessment>, DatabaseError>;

    async fn update_assessment(&self, assessment: &Assessment) -> Result<(), DatabaseError>;

    /// Removes the assessment with its questions and their responses.
    async fn delete_assessment(&self, id: i64) -> Result<bool, DatabaseError>;

    // ── Onboarding questions ────────────────────────────────────────

    /// Insert a question. Text already in the catalog → `Constraint`.
    async fn insert_question(
        &self,
        question: &NewQuestion,
    ) -> Result<OnboardingQuestion, DatabaseError>;

    /// Insert unless the text is already in the catalog (any assessment,
    /// case-insensitive). Returns whether a row was created.
    async fn insert_question_if_absent(&self, question: &NewQuestion)
    -> Result<bool, DatabaseError>;

    async fn get_question(&self, id: i64) -> Result<Option<OnboardingQuestion>, DatabaseError>;

    /// Questions of one assessment in insertion order.
    async fn list_questions(
        &self,
        assessment_id: i64,
    ) -> Result<Vec<OnboardingQuestion>, DatabaseError>;

    async fn update_question(&self, question: &OnboardingQuestion) -> Result<(), DatabaseError>;

    async fn delete_question(&self, id: i64) -> Result<bool, DatabaseError>;

    // ── Onboarding responses ────────────────────────────────────────

    /// Insert a whole intake batch in one transaction: all rows or none.
    async fn insert_onboarding_responses(
        &self,
        responses: &[OnboardingResponse],
    ) -> Result<(), DatabaseError>;

    async fn get_onboarding_response(
        &self,
        id: Uuid,
    ) -> Result<Option<OnboardingResponse>, DatabaseError>;

    /// Responses of one patient, oldest batch first, optionally for one question.
    async fn list_onboarding_responses(
        &self,
        patient_id: Uuid,
        question_id: Option<i64>,
        page: Page,
    ) -> Result<Listing<OnboardingResponse>, DatabaseError>;

    async fn update_onboarding_response(
        &self,
        response: &OnboardingResponse,
    ) -> Result<(), DatabaseError>;

    async fn delete_onboarding_response(&self, id: Uuid) -> Result<bool, DatabaseError>;
}
