//! Seed records for unit tests.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::patients::model::{NewPatient, Patient};
use crate::sessions::model::{NewSession, Session};
use crate::staff::model::{NewStaff, Staff, StaffRole};
use crate::store::{Database, LibSqlBackend};

pub async fn memory_db() -> Arc<dyn Database> {
    Arc::new(LibSqlBackend::new_memory().await.unwrap())
}

/// 2026-03-02 at `h:m` UTC.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
}

pub async fn seed_staff(db: &dyn Database, name: &str) -> Staff {
    let staff = NewStaff {
        name: name.into(),
        join_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        expected_hours: 40,
        role: StaffRole::Therapist,
    }
    .into_staff()
    .unwrap();
    db.insert_staff(&staff).await.unwrap();
    staff
}

pub async fn seed_patient(db: &dyn Database, name: &str, staff_id: Uuid) -> Patient {
    let patient = NewPatient {
        name: name.into(),
        dob: NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
        active: true,
        doctor_id: None,
        staff_id,
        therapy_types: Some("ABA".into()),
    }
    .into_patient()
    .unwrap();
    db.insert_patient(&patient).await.unwrap();
    patient
}

pub fn session(patient_id: Uuid, staff_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Session {
    NewSession {
        patient_id,
        staff_id,
        start_time: start,
        end_time: end,
        description: "therapy".into(),
        response: Default::default(),
        payment_received: None,
    }
    .into_session()
    .unwrap()
}
