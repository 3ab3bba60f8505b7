//! Guardian data model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;

/// A parent or legal guardian. Linked to patients many-to-many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewGuardian {
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewGuardian {
    pub fn into_guardian(self) -> Result<Guardian, ServiceError> {
        let guardian = Guardian {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            phone_number: self.phone_number,
            email: self.email,
        };
        guardian.validate()?;
        Ok(guardian)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardianUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl GuardianUpdate {
    pub fn apply(self, guardian: &mut Guardian) -> Result<(), ServiceError> {
        if let Some(name) = self.name {
            guardian.name = name.trim().to_string();
        }
        if let Some(phone) = self.phone_number {
            guardian.phone_number = Some(phone);
        }
        if let Some(email) = self.email {
            guardian.email = Some(email);
        }
        guardian.validate()
    }
}

impl Guardian {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.name.is_empty() {
            return Err(ServiceError::invalid("guardian name is required"));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(ServiceError::invalid("guardian email is malformed"));
            }
        }
        Ok(())
    }
}
