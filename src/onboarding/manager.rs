//! OnboardingManager: keeps the assessment catalog seeded and turns an
//! intake request into a batch of pending responses.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::catalog::{self, AssessmentSeed, DEFAULT_CATALOG};
use super::model::{IntakeBatch, NewQuestion, OnboardingResponse};
use crate::clock;
use crate::error::ServiceError;
use crate::store::Database;

/// Totals from one catalog seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub assessments_created: usize,
    pub questions_created: usize,
}

/// Coordinates the onboarding catalog and intake batches.
pub struct OnboardingManager {
    db: Arc<dyn Database>,
    catalog: &'static [AssessmentSeed],
}

impl OnboardingManager {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self::with_catalog(db, DEFAULT_CATALOG)
    }

    /// Use a catalog other than the built-in one.
    pub fn with_catalog(db: Arc<dyn Database>, catalog: &'static [AssessmentSeed]) -> Self {
        Self { db, catalog }
    }

    /// Insert every catalog assessment that does not exist yet, in catalog
    /// order. Returns the number created; repeated calls return 0.
    pub async fn ensure_default_assessments(&self) -> Result<usize, ServiceError> {
        let mut created = 0;
        for seed in self.catalog {
            if self.db.insert_assessment_if_absent(seed.name).await? {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Insert the catalog questions for `assessment_name` under
    /// `assessment_id`, skipping any text already present anywhere in the
    /// catalog. Unknown names seed nothing.
    pub async fn seed_questions_for_assessment(
        &self,
        assessment_id: i64,
        assessment_name: &str,
    ) -> Result<usize, ServiceError> {
        let mut created = 0;
        for seed in catalog::questions_for(self.catalog, assessment_name) {
            let question = NewQuestion::new(assessment_id, seed.text, seed.group).normalized()?;
            if self.db.insert_question_if_absent(&question).await? {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Ensure every catalog assessment and its questions exist.
    pub async fn seed_catalog(&self) -> Result<SeedReport, ServiceError> {
        let mut report = SeedReport {
            assessments_created: self.ensure_default_assessments().await?,
            ..SeedReport::default()
        };
        for seed in self.catalog {
            let assessment = self
                .db
                .find_assessment_by_name(seed.name)
                .await?
                .ok_or_else(|| ServiceError::not_found("assessment"))?;
            report.questions_created += self
                .seed_questions_for_assessment(assessment.id, seed.name)
                .await?;
        }
        info!(
            assessments = report.assessments_created,
            questions = report.questions_created,
            "Onboarding catalog seeded"
        );
        Ok(report)
    }

    /// Create one pending response per question of `assessment_id` for the
    /// patient. Each call is a new intake batch; the batch is written in one
    /// transaction, so a failure leaves no rows behind.
    pub async fn generate_intake_responses(
        &self,
        patient_id: Uuid,
        staff_id: Uuid,
        assessment_id: i64,
        session_id: Option<Uuid>,
    ) -> Result<IntakeBatch, ServiceError> {
        if self.db.get_assessment(assessment_id).await?.is_none() {
            return Err(ServiceError::not_found("assessment"));
        }
        let questions = self.db.list_questions(assessment_id).await?;

        let batch_id = Uuid::new_v4();
        let now = clock::now();
        let responses: Vec<OnboardingResponse> = questions
            .iter()
            .map(|q| OnboardingResponse::pending(batch_id, q, patient_id, staff_id, session_id, now))
            .collect();

        self.db.insert_onboarding_responses(&responses).await?;
        info!(
            batch_id = %batch_id,
            patient_id = %patient_id,
            assessment_id,
            count = responses.len(),
            "Intake batch generated"
        );
        Ok(IntakeBatch {
            batch_id,
            responses,
        })
    }

    /// Record the answer to a pending or answered response.
    pub async fn record_answer(
        &self,
        response_id: Uuid,
        answer: String,
        session_id: Option<Uuid>,
    ) -> Result<OnboardingResponse, ServiceError> {
        let mut response = self
            .db
            .get_onboarding_response(response_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("onboarding response"))?;
        response.answer(answer)?;
        if session_id.is_some() {
            response.session_id = session_id;
        }
        self.db.update_onboarding_response(&response).await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::onboarding::catalog::QuestionSeed;
    use crate::onboarding::model::ResponseStatus;
    use crate::store::Page;
    use crate::store::fixtures::{memory_db, seed_patient, seed_staff};

    #[tokio::test]
    async fn ensure_default_assessments_is_idempotent() {
        let db = memory_db().await;
        let manager = OnboardingManager::new(Arc::clone(&db));

        assert_eq!(manager.ensure_default_assessments().await.unwrap(), 3);
        assert_eq!(manager.ensure_default_assessments().await.unwrap(), 0);

        let names: Vec<_> = db
            .list_assessments()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["VB-MAPP", "ESFLS", "ABLLS-R"]);
    }

    #[tokio::test]
    async fn seed_catalog_twice_creates_nothing_new() {
        let db = memory_db().await;
        let manager = OnboardingManager::new(Arc::clone(&db));

        let first = manager.seed_catalog().await.unwrap();
        assert_eq!(first.assessments_created, 3);
        assert_eq!(first.questions_created, 47);

        let second = manager.seed_catalog().await.unwrap();
        assert_eq!(second, SeedReport::default());

        let vb = db.find_assessment_by_name("VB-MAPP").await.unwrap().unwrap();
        let questions = db.list_questions(vb.id).await.unwrap();
        assert_eq!(questions.len(), 41);
        assert_eq!(questions[0].text, "A kitty says...");
        assert_eq!(questions[0].group, Some(1));
    }

    static OVERLAPPING: &[AssessmentSeed] = &[
        AssessmentSeed {
            name: "First",
            questions: &[
                QuestionSeed { text: "Shared question?", group: None },
                QuestionSeed { text: "Only in first?", group: None },
            ],
        },
        AssessmentSeed {
            name: "Second",
            questions: &[
                QuestionSeed { text: "shared   QUESTION?", group: Some(2) },
                QuestionSeed { text: "Only in second?", group: None },
            ],
        },
    ];

    #[tokio::test]
    async fn overlapping_seed_lists_never_duplicate_text() {
        let db = memory_db().await;
        let manager = OnboardingManager::with_catalog(Arc::clone(&db), OVERLAPPING);
        let report = manager.seed_catalog().await.unwrap();
        assert_eq!(report.questions_created, 3);

        let mut texts = HashSet::new();
        for assessment in db.list_assessments().await.unwrap() {
            for q in db.list_questions(assessment.id).await.unwrap() {
                assert!(texts.insert(q.text.to_lowercase()), "duplicate {}", q.text);
            }
        }
        assert_eq!(texts.len(), 3);
    }

    #[tokio::test]
    async fn unknown_assessment_name_seeds_nothing() {
        let db = memory_db().await;
        let manager = OnboardingManager::new(Arc::clone(&db));
        let custom = db.insert_assessment("PEAK").await.unwrap();
        assert_eq!(
            manager
                .seed_questions_for_assessment(custom.id, "PEAK")
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn intake_creates_one_pending_response_per_question() {
        let db = memory_db().await;
        let manager = OnboardingManager::new(Arc::clone(&db));
        manager.seed_catalog().await.unwrap();
        let staff = seed_staff(db.as_ref(), "T1").await;
        let patient = seed_patient(db.as_ref(), "P1", staff.id).await;
        let vb = db.find_assessment_by_name("VB-MAPP").await.unwrap().unwrap();

        let batch = manager
            .generate_intake_responses(patient.id, staff.id, vb.id, None)
            .await
            .unwrap();

        assert_eq!(batch.responses.len(), 41);
        let texts: HashSet<_> = batch.responses.iter().map(|r| r.question_text.as_str()).collect();
        assert_eq!(texts.len(), 41);
        assert!(batch.responses.iter().all(|r| {
            r.patient_id == patient.id
                && r.staff_id == staff.id
                && r.batch_id == batch.batch_id
                && r.status == ResponseStatus::Pending
                && r.response_date == batch.responses[0].response_date
        }));

        let stored = db
            .list_onboarding_responses(patient.id, None, Page { limit: 100, offset: 0 })
            .await
            .unwrap();
        assert_eq!(stored.total, 41);

        // What the intake returned is exactly what reads back.
        let first = db
            .get_onboarding_response(batch.responses[0].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, batch.responses[0]);
    }

    #[tokio::test]
    async fn repeated_intake_is_a_new_batch() {
        let db = memory_db().await;
        let manager = OnboardingManager::new(Arc::clone(&db));
        manager.seed_catalog().await.unwrap();
        let staff = seed_staff(db.as_ref(), "T1").await;
        let patient = seed_patient(db.as_ref(), "P1", staff.id).await;
        let esfls = db.find_assessment_by_name("ESFLS").await.unwrap().unwrap();

        let first = manager
            .generate_intake_responses(patient.id, staff.id, esfls.id, None)
            .await
            .unwrap();
        let second = manager
            .generate_intake_responses(patient.id, staff.id, esfls.id, None)
            .await
            .unwrap();
        assert_ne!(first.batch_id, second.batch_id);

        let stored = db
            .list_onboarding_responses(patient.id, None, Page::default())
            .await
            .unwrap();
        assert_eq!(stored.total, 6);
    }

    #[tokio::test]
    async fn failed_intake_leaves_no_rows() {
        let db = memory_db().await;
        let manager = OnboardingManager::new(Arc::clone(&db));
        manager.seed_catalog().await.unwrap();
        let staff = seed_staff(db.as_ref(), "T1").await;
        let ablls = db.find_assessment_by_name("ABLLS-R").await.unwrap().unwrap();
        let missing_patient = Uuid::new_v4();

        let err = manager
            .generate_intake_responses(missing_patient, staff.id, ablls.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let stored = db
            .list_onboarding_responses(missing_patient, None, Page::default())
            .await
            .unwrap();
        assert_eq!(stored.total, 0);
    }

    #[tokio::test]
    async fn intake_for_unknown_assessment_is_not_found() {
        let db = memory_db().await;
        let manager = OnboardingManager::new(Arc::clone(&db));
        let staff = seed_staff(db.as_ref(), "T1").await;
        let patient = seed_patient(db.as_ref(), "P1", staff.id).await;

        let err = manager
            .generate_intake_responses(patient.id, staff.id, 999, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn recording_an_answer_marks_it_answered() {
        let db = memory_db().await;
        let manager = OnboardingManager::new(Arc::clone(&db));
        manager.seed_catalog().await.unwrap();
        let staff = seed_staff(db.as_ref(), "T1").await;
        let patient = seed_patient(db.as_ref(), "P1", staff.id).await;
        let esfls = db.find_assessment_by_name("ESFLS").await.unwrap().unwrap();
        let batch = manager
            .generate_intake_responses(patient.id, staff.id, esfls.id, None)
            .await
            .unwrap();

        let id = batch.responses[0].id;
        let answered = manager
            .record_answer(id, "Yes, with prompting".into(), None)
            .await
            .unwrap();
        assert_eq!(answered.status, ResponseStatus::Answered);

        let stored = db.get_onboarding_response(id).await.unwrap().unwrap();
        assert_eq!(stored.answer.as_deref(), Some("Yes, with prompting"));
        assert!(stored.answered_at.is_some());

        let err = manager
            .record_answer(Uuid::new_v4(), "x".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
