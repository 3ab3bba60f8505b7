//! Activity data model: work recorded during a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub session_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_received: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST .../activities`. The session comes from the path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewActivity {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub payment_received: Option<bool>,
}

impl NewActivity {
    pub fn into_activity(self, session_id: Uuid) -> Result<Activity, ServiceError> {
        let now = clock::now();
        let activity = Activity {
            id: Uuid::new_v4(),
            session_id,
            description: self.description,
            duration_minutes: self.duration_minutes,
            payment_received: self.payment_received,
            created_at: now,
            updated_at: now,
        };
        activity.validate()?;
        Ok(activity)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityUpdate {
    pub description: Option<String>,
    pub duration_minutes: Option<f64>,
    pub payment_received: Option<bool>,
}

impl ActivityUpdate {
    pub fn apply(self, activity: &mut Activity) -> Result<(), ServiceError> {
        if let Some(description) = self.description {
            activity.description = Some(description);
        }
        if let Some(minutes) = self.duration_minutes {
            activity.duration_minutes = Some(minutes);
        }
        if let Some(paid) = self.payment_received {
            activity.payment_received = Some(paid);
        }
        activity.validate()?;
        activity.updated_at = clock::now();
        Ok(())
    }
}

impl Activity {
    fn validate(&self) -> Result<(), ServiceError> {
        match self.duration_minutes {
            Some(m) if !m.is_finite() || m < 0.0 => {
                Err(ServiceError::invalid("duration must be a non-negative number of minutes"))
            }
            _ => Ok(()),
        }
    }
}
