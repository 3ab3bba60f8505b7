//! Medicine (prescription) data model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;

/// A medicine prescribed to a patient by a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub patient_id: Uuid,
    pub prescriber_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMedicine {
    pub name: String,
    #[serde(default)]
    pub brand_name: Option<String>,
    pub patient_id: Uuid,
    pub prescriber_id: Uuid,
}

impl NewMedicine {
    pub fn into_medicine(self) -> Result<Medicine, ServiceError> {
        let medicine = Medicine {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            brand_name: self.brand_name,
            patient_id: self.patient_id,
            prescriber_id: self.prescriber_id,
        };
        medicine.validate()?;
        Ok(medicine)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicineUpdate {
    pub name: Option<String>,
    pub brand_name: Option<String>,
    pub prescriber_id: Option<Uuid>,
}

impl MedicineUpdate {
    pub fn apply(self, medicine: &mut Medicine) -> Result<(), ServiceError> {
        if let Some(name) = self.name {
            medicine.name = name.trim().to_string();
        }
        if let Some(brand) = self.brand_name {
            medicine.brand_name = Some(brand);
        }
        if let Some(prescriber) = self.prescriber_id {
            medicine.prescriber_id = prescriber;
        }
        medicine.validate()
    }
}

impl Medicine {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.name.is_empty() {
            return Err(ServiceError::invalid("medicine name is required"));
        }
        Ok(())
    }
}
