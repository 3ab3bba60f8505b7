//! Branch and operating-hours data model.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// A clinic location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub opening_date: NaiveDate,
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBranch {
    #[serde(default)]
    pub location: Option<String>,
    pub opening_date: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchUpdate {
    pub location: Option<String>,
    pub opening_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

impl BranchUpdate {
    pub fn apply(self, branch: &mut Branch) {
        if let Some(location) = self.location {
            branch.location = Some(location);
        }
        if let Some(date) = self.opening_date {
            branch.opening_date = date;
        }
        if let Some(active) = self.active {
            branch.active = active;
        }
    }
}

/// Opening hours of one branch on one weekday (0 = Sunday … 6 = Saturday).
/// Times are `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub branch_id: i64,
    pub day_of_week: u8,
    pub open_time: String,
    pub close_time: String,
    pub is_closed: bool,
}

impl OperatingHours {
    pub fn validate(&self) -> Result<(), ServiceError> {
        validate_day(self.day_of_week)?;
        let open = parse_hhmm("open_time", &self.open_time)?;
        let close = parse_hhmm("close_time", &self.close_time)?;
        if !self.is_closed && open >= close {
            return Err(ServiceError::invalid("open_time must be before close_time"));
        }
        Ok(())
    }
}

pub fn validate_day(day: u8) -> Result<(), ServiceError> {
    if day > 6 {
        return Err(ServiceError::invalid("day_of_week must be between 0 (Sunday) and 6"));
    }
    Ok(())
}

fn parse_hhmm(field: &str, value: &str) -> Result<NaiveTime, ServiceError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ServiceError::invalid(format!("{field} must be HH:MM, got {value:?}")))
}

/// Body of `POST /api/branches/{id}/hours`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewOperatingHours {
    pub day_of_week: u8,
    #[serde(default = "default_open")]
    pub open_time: String,
    #[serde(default = "default_close")]
    pub close_time: String,
    #[serde(default)]
    pub is_closed: bool,
}

fn default_open() -> String {
    "09:00".into()
}

fn default_close() -> String {
    "17:00".into()
}

impl NewOperatingHours {
    pub fn into_hours(self, branch_id: i64) -> Result<OperatingHours, ServiceError> {
        let hours = OperatingHours {
            branch_id,
            day_of_week: self.day_of_week,
            open_time: self.open_time,
            close_time: self.close_time,
            is_closed: self.is_closed,
        };
        hours.validate()?;
        Ok(hours)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatingHoursUpdate {
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: Option<bool>,
}

impl OperatingHoursUpdate {
    pub fn apply(self, hours: &mut OperatingHours) -> Result<(), ServiceError> {
        if let Some(open) = self.open_time {
            hours.open_time = open;
        }
        if let Some(close) = self.close_time {
            hours.close_time = close;
        }
        if let Some(closed) = self.is_closed {
            hours.is_closed = closed;
        }
        hours.validate()
    }
}
