//! Staff data model.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;

/// What a staff member does at the clinic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Therapist,
    Supervisor,
    Doctor,
    Administrator,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Therapist => "therapist",
            StaffRole::Supervisor => "supervisor",
            StaffRole::Doctor => "doctor",
            StaffRole::Administrator => "administrator",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "therapist" => Ok(StaffRole::Therapist),
            "supervisor" => Ok(StaffRole::Supervisor),
            "doctor" => Ok(StaffRole::Doctor),
            "administrator" => Ok(StaffRole::Administrator),
            other => Err(format!("unknown staff role: {other}")),
        }
    }
}

/// A clinic staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
    pub join_date: NaiveDate,
    /// Contracted hours per week.
    pub expected_hours: i32,
    pub role: StaffRole,
}

/// Body of `POST /api/staff`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewStaff {
    pub name: String,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub expected_hours: i32,
    pub role: StaffRole,
}

impl NewStaff {
    pub fn into_staff(self) -> Result<Staff, ServiceError> {
        let staff = Staff {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            join_date: self.join_date,
            expected_hours: self.expected_hours,
            role: self.role,
        };
        staff.validate()?;
        Ok(staff)
    }
}

/// Partial update for a staff member.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub expected_hours: Option<i32>,
    pub role: Option<StaffRole>,
}

impl StaffUpdate {
    pub fn apply(self, staff: &mut Staff) -> Result<(), ServiceError> {
        if let Some(name) = self.name {
            staff.name = name.trim().to_string();
        }
        if let Some(join_date) = self.join_date {
            staff.join_date = join_date;
        }
        if let Some(hours) = self.expected_hours {
            staff.expected_hours = hours;
        }
        if let Some(role) = self.role {
            staff.role = role;
        }
        staff.validate()
    }
}

impl Staff {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.name.is_empty() {
            return Err(ServiceError::invalid("staff name is required"));
        }
        if self.expected_hours < 0 {
            return Err(ServiceError::invalid("expected hours cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrips_through_str() {
        for role in [
            StaffRole::Therapist,
            StaffRole::Supervisor,
            StaffRole::Doctor,
            StaffRole::Administrator,
        ] {
            assert_eq!(role.as_str().parse::<StaffRole>().unwrap(), role);
        }
        assert!("janitor".parse::<StaffRole>().is_err());
    }

    #[test]
    fn update_rejects_blank_name() {
        let mut staff = NewStaff {
            name: "Dana".into(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            expected_hours: 40,
            role: StaffRole::Therapist,
        }
        .into_staff()
        .unwrap();

        let update = StaffUpdate {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(update.apply(&mut staff), Err(ServiceError::InvalidInput(_))));
    }
}
