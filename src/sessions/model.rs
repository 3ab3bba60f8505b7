//! Session data model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activities::model::Activity;
use crate::clock;
use crate::error::ServiceError;

/// How the patient responded during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLevel {
    #[default]
    NotRecorded,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ResponseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseLevel::NotRecorded => "not_recorded",
            ResponseLevel::Poor => "poor",
            ResponseLevel::Fair => "fair",
            ResponseLevel::Good => "good",
            ResponseLevel::Excellent => "excellent",
        }
    }
}

impl fmt::Display for ResponseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_recorded" => Ok(ResponseLevel::NotRecorded),
            "poor" => Ok(ResponseLevel::Poor),
            "fair" => Ok(ResponseLevel::Fair),
            "good" => Ok(ResponseLevel::Good),
            "excellent" => Ok(ResponseLevel::Excellent),
            other => Err(format!("unknown response level: {other}")),
        }
    }
}

/// A scheduled interaction between one staff member and one patient.
///
/// Invariant: `start_time < end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub staff_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: String,
    pub response: ResponseLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_received: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.start_time >= self.end_time {
            return Err(ServiceError::invalid("session start time must be before end time"));
        }
        Ok(())
    }
}

/// Body of `POST /api/sessions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSession {
    pub patient_id: Uuid,
    pub staff_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub response: ResponseLevel,
    #[serde(default)]
    pub payment_received: Option<bool>,
}

impl NewSession {
    pub fn into_session(self) -> Result<Session, ServiceError> {
        let now = clock::now();
        let session = Session {
            id: Uuid::new_v4(),
            patient_id: self.patient_id,
            staff_id: self.staff_id,
            start_time: clock::stored(self.start_time),
            end_time: clock::stored(self.end_time),
            description: self.description,
            response: self.response,
            payment_received: self.payment_received,
            created_at: now,
            updated_at: now,
        };
        session.validate()?;
        Ok(session)
    }
}

/// Partial update for a session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionUpdate {
    pub patient_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub response: Option<ResponseLevel>,
    pub payment_received: Option<bool>,
}

impl SessionUpdate {
    /// Whether applying this update can move the session on someone's schedule.
    pub fn touches_schedule(&self) -> bool {
        self.staff_id.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }

    pub fn apply(self, session: &mut Session) -> Result<(), ServiceError> {
        if let Some(patient_id) = self.patient_id {
            session.patient_id = patient_id;
        }
        if let Some(staff_id) = self.staff_id {
            session.staff_id = staff_id;
        }
        if let Some(start) = self.start_time {
            session.start_time = clock::stored(start);
        }
        if let Some(end) = self.end_time {
            session.end_time = clock::stored(end);
        }
        if let Some(description) = self.description {
            session.description = description;
        }
        if let Some(response) = self.response {
            session.response = response;
        }
        if let Some(paid) = self.payment_received {
            session.payment_received = Some(paid);
        }
        session.validate()?;
        session.updated_at = clock::now();
        Ok(())
    }
}

/// Filters for session listings. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub patient_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    /// Sessions starting at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Sessions ending at or before this instant.
    pub to: Option<DateTime<Utc>>,
}

/// A session together with the activities recorded during it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetails {
    #[serde(flatten)]
    pub session: Session,
    pub activities: Vec<Activity>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn new_session(start: DateTime<Utc>, end: DateTime<Utc>) -> NewSession {
        NewSession {
            patient_id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            description: String::new(),
            response: ResponseLevel::default(),
            payment_received: None,
        }
    }

    #[test]
    fn zero_length_session_is_invalid() {
        assert!(new_session(at(9, 0), at(9, 0)).into_session().is_err());
        assert!(new_session(at(10, 0), at(9, 0)).into_session().is_err());
        assert!(new_session(at(9, 0), at(10, 0)).into_session().is_ok());
    }

    #[test]
    fn times_are_kept_at_stored_precision() {
        let ns = chrono::Duration::nanoseconds;
        let session = new_session(at(9, 0) + ns(1_250), at(10, 0) + ns(500))
            .into_session()
            .unwrap();
        assert_eq!(session.start_time, at(9, 0) + ns(1_000));
        assert_eq!(session.end_time, at(10, 0));

        // Both ends inside one microsecond collapse to an empty interval.
        let err = new_session(at(9, 0) + ns(100), at(9, 0) + ns(900))
            .into_session()
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let mut session = session;
        let update = SessionUpdate {
            end_time: Some(at(11, 0) + ns(999)),
            ..Default::default()
        };
        update.apply(&mut session).unwrap();
        assert_eq!(session.end_time, at(11, 0));
    }

    #[test]
    fn update_that_inverts_interval_is_rejected() {
        let mut session = new_session(at(9, 0), at(10, 0)).into_session().unwrap();
        let update = SessionUpdate {
            start_time: Some(at(11, 0)),
            ..Default::default()
        };
        assert!(update.touches_schedule());
        assert!(update.apply(&mut session).is_err());
    }

    #[test]
    fn description_only_update_does_not_touch_schedule() {
        let update = SessionUpdate {
            description: Some("reviewed goals".into()),
            response: Some(ResponseLevel::Good),
            ..Default::default()
        };
        assert!(!update.touches_schedule());
    }

    #[test]
    fn response_level_parses_from_db_strings() {
        assert_eq!("good".parse::<ResponseLevel>().unwrap(), ResponseLevel::Good);
        assert_eq!(
            "not_recorded".parse::<ResponseLevel>().unwrap(),
            ResponseLevel::NotRecorded
        );
        assert!("great".parse::<ResponseLevel>().is_err());
    }
}
