//! Patient data model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::error::ServiceError;

/// A patient under the clinic's care.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub dob: NaiveDate,
    pub active: bool,
    /// Referring or supervising doctor (a staff member).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,
    /// Primary therapist.
    pub staff_id: Uuid,
    /// Free-form list of therapy types, e.g. "ABA, speech".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapy_types: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/patients`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPatient {
    pub name: String,
    pub dob: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub doctor_id: Option<Uuid>,
    pub staff_id: Uuid,
    #[serde(default)]
    pub therapy_types: Option<String>,
}

fn default_active() -> bool {
    true
}

impl NewPatient {
    pub fn into_patient(self) -> Result<Patient, ServiceError> {
        let now = clock::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            dob: self.dob,
            active: self.active,
            doctor_id: self.doctor_id,
            staff_id: self.staff_id,
            therapy_types: self.therapy_types,
            created_at: now,
            updated_at: now,
        };
        patient.validate()?;
        Ok(patient)
    }
}

/// Partial update for a patient. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub active: Option<bool>,
    pub doctor_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub therapy_types: Option<String>,
}

impl PatientUpdate {
    pub fn apply(self, patient: &mut Patient) -> Result<(), ServiceError> {
        if let Some(name) = self.name {
            patient.name = name.trim().to_string();
        }
        if let Some(dob) = self.dob {
            patient.dob = dob;
        }
        if let Some(active) = self.active {
            patient.active = active;
        }
        if let Some(doctor_id) = self.doctor_id {
            patient.doctor_id = Some(doctor_id);
        }
        if let Some(staff_id) = self.staff_id {
            patient.staff_id = staff_id;
        }
        if let Some(types) = self.therapy_types {
            patient.therapy_types = Some(types);
        }
        patient.validate()?;
        patient.updated_at = clock::now();
        Ok(())
    }
}

impl Patient {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.name.is_empty() {
            return Err(ServiceError::invalid("patient name is required"));
        }
        if self.dob > Utc::now().date_naive() {
            return Err(ServiceError::invalid("date of birth cannot be in the future"));
        }
        Ok(())
    }
}
