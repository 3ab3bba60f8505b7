//! Session scheduling: create, move and cancel sessions without
//! double-booking a staff member.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::model::{NewSession, Session, SessionUpdate};
use super::overlap::Interval;
use crate::error::ServiceError;
use crate::store::Database;

/// Owns the scheduling rules on top of the store.
///
/// The overlap check and the write it guards run inside one store
/// transaction (`insert_session` / `update_session`), so two concurrent
/// requests cannot both pass the check.
pub struct SessionScheduler {
    db: Arc<dyn Database>,
}

impl SessionScheduler {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Does `interval` overlap any session of `staff_id`, other than `exclude`?
    pub async fn has_overlap(
        &self,
        staff_id: Uuid,
        interval: Interval,
        exclude: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        Ok(self
            .db
            .has_overlapping_session(staff_id, &interval, exclude)
            .await?)
    }

    /// Validate and book a new session. Overlap → `Conflict`.
    pub async fn create(&self, new: NewSession) -> Result<Session, ServiceError> {
        let session = new.into_session()?;
        self.db.insert_session(&session).await?;
        info!(
            session_id = %session.id,
            staff_id = %session.staff_id,
            start = %session.start_time,
            end = %session.end_time,
            "Session scheduled"
        );
        Ok(session)
    }

    /// Apply a partial update. The session never conflicts with itself.
    pub async fn update(&self, id: Uuid, update: SessionUpdate) -> Result<Session, ServiceError> {
        let mut session = self
            .db
            .get_session(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("session"))?;
        let rescheduled = update.touches_schedule();
        update.apply(&mut session)?;
        self.db.update_session(&session).await?;
        if rescheduled {
            info!(session_id = %id, start = %session.start_time, end = %session.end_time, "Session rescheduled");
        }
        Ok(session)
    }

    /// Delete a session. Sessions with recorded activities cannot be deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if self.db.delete_session(id).await? {
            info!(session_id = %id, "Session deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("session"))
        }
    }
}
