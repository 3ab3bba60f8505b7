//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. Every call shares one
//! connection behind an async gate: reads hold it shared, writes hold it
//! exclusively. Multi-statement writes (session check + write, intake
//! batches) additionally run in `BEGIN IMMEDIATE` transactions, so no reader
//! ever observes a transaction in progress.

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use libsql::params::IntoParams;
use libsql::{
    Connection, Database as LibSqlDatabase, Row, Transaction, TransactionBehavior, Value, params,
    params_from_iter,
};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::activities::model::Activity;
use crate::branches::model::{Branch, NewBranch, OperatingHours};
use crate::error::DatabaseError;
use crate::guardians::model::Guardian;
use crate::medicines::model::Medicine;
use crate::onboarding::model::{
    Assessment, NewQuestion, OnboardingQuestion, OnboardingResponse, ResponseStatus,
};
use crate::patients::model::Patient;
use crate::sessions::model::{ResponseLevel, Session, SessionFilter};
use crate::sessions::overlap::{Interval, OVERLAP_CONFLICT};
use crate::staff::model::{Staff, StaffRole};
use crate::store::migrations;
use crate::store::traits::{Database, Listing, Page};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    /// Shared by reads, exclusive for the duration of every mutating call.
    gate: RwLock<()>,
}

/// The connection, borrowed for reading while the gate is held shared.
struct ReadConn<'a> {
    _guard: RwLockReadGuard<'a, ()>,
    conn: &'a Connection,
}

impl Deref for ReadConn<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
    }
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Pool(format!("Failed to create database directory: {e}"))
                })?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to enable foreign keys: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
            gate: RwLock::new(()),
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Get the connection for reading. Waits out any write in progress.
    async fn read(&self) -> ReadConn<'_> {
        ReadConn {
            _guard: self.gate.read().await,
            conn: &self.conn,
        }
    }

    async fn begin(&self, op: &str) -> Result<Transaction, DatabaseError> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await
            .map_err(|e| classify(op, e))
    }

    /// Run a single write statement under the write gate.
    async fn write(
        &self,
        op: &str,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<u64, DatabaseError> {
        let _gate = self.gate.write().await;
        self.conn
            .execute(sql, params)
            .await
            .map_err(|e| classify(op, e))
    }

    /// A write that must hit exactly one existing row.
    async fn write_existing(
        &self,
        op: &str,
        entity: &str,
        id: impl ToString,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<(), DatabaseError> {
        let changed = self.write(op, sql, params).await?;
        if changed == 0 {
            return Err(DatabaseError::not_found(entity, id));
        }
        Ok(())
    }

    /// Count matching rows and fetch one page, ordered by `order_by`.
    async fn fetch_page<T>(
        &self,
        op: &str,
        columns: &str,
        from_where: &str,
        order_by: &str,
        args: Vec<Value>,
        page: Page,
        map: fn(&Row) -> Result<T, DatabaseError>,
    ) -> Result<Listing<T>, DatabaseError> {
        let conn = self.read().await;
        let total = fetch_count(
            &conn,
            op,
            &format!("SELECT COUNT(*) {from_where}"),
            params_from_iter(args.clone()),
        )
        .await?;

        let mut args = args;
        args.push(Value::Integer(page.limit));
        args.push(Value::Integer(page.offset));
        let items = fetch_all(
            &conn,
            op,
            &format!("SELECT {columns} {from_where} ORDER BY {order_by} LIMIT ? OFFSET ?"),
            params_from_iter(args),
            map,
        )
        .await?;

        Ok(Listing { items, total })
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Classify a libSQL error. Constraint failures and the session overlap
/// trigger become typed errors; everything else stays an opaque query error.
fn classify(op: &str, e: libsql::Error) -> DatabaseError {
    let msg = e.to_string();
    if msg.contains("session overlap") {
        DatabaseError::Conflict(OVERLAP_CONFLICT.to_string())
    } else if msg.contains("FOREIGN KEY constraint failed") {
        DatabaseError::Constraint("referenced record is missing or still in use".to_string())
    } else if msg.contains("UNIQUE constraint failed") {
        DatabaseError::Constraint("record already exists".to_string())
    } else if msg.contains("constraint failed") {
        debug!(op, error = %msg, "Constraint violated");
        DatabaseError::Constraint("record violates a table constraint".to_string())
    } else {
        DatabaseError::Query(format!("{op}: {msg}"))
    }
}

/// Finish a transaction: commit on success, roll back on failure.
async fn finish<T>(
    tx: Transaction,
    op: &str,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(|e| classify(op, e))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(e) = tx.rollback().await {
                warn!(op, error = %e, "Rollback failed");
            }
            Err(err)
        }
    }
}

async fn fetch_all<T>(
    conn: &Connection,
    op: &str,
    sql: &str,
    params: impl IntoParams,
    map: fn(&Row) -> Result<T, DatabaseError>,
) -> Result<Vec<T>, DatabaseError> {
    let mut rows = conn
        .query(sql, params)
        .await
        .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?;

    let mut items = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?
    {
        items.push(map(&row)?);
    }
    Ok(items)
}

async fn fetch_optional<T>(
    conn: &Connection,
    op: &str,
    sql: &str,
    params: impl IntoParams,
    map: fn(&Row) -> Result<T, DatabaseError>,
) -> Result<Option<T>, DatabaseError> {
    let mut rows = conn
        .query(sql, params)
        .await
        .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?;

    match rows.next().await {
        Ok(Some(row)) => Ok(Some(map(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => Err(DatabaseError::Query(format!("{op}: {e}"))),
    }
}

async fn fetch_count(
    conn: &Connection,
    op: &str,
    sql: &str,
    params: impl IntoParams,
) -> Result<i64, DatabaseError> {
    fetch_optional(conn, op, sql, params, |row| {
        row.get::<i64>(0).map_err(decode_err)
    })
    .await
    .map(|count| count.unwrap_or(0))
}

/// `staff_id`'s sessions intersecting `interval`, other than `exclude`.
async fn overlap_exists(
    conn: &Connection,
    staff_id: Uuid,
    interval: &Interval,
    exclude: Option<Uuid>,
) -> Result<bool, DatabaseError> {
    let count = fetch_count(
        conn,
        "has_overlapping_session",
        "SELECT EXISTS (
            SELECT 1 FROM sessions
            WHERE staff_id = ?1
              AND start_time < ?2
              AND end_time > ?3
              AND (?4 IS NULL OR id <> ?4)
        )",
        params![
            staff_id.to_string(),
            fmt_ts(&interval.end),
            fmt_ts(&interval.start),
            opt_text(exclude.map(|id| id.to_string())),
        ],
    )
    .await?;
    Ok(count != 0)
}

fn decode_err(e: libsql::Error) -> DatabaseError {
    DatabaseError::Serialization(format!("row decode: {e}"))
}

/// Fixed-width RFC 3339, so text order matches time order.
fn fmt_ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Serialization(format!("bad timestamp {s:?}: {e}")))
}

fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Serialization(format!("bad date {s:?}: {e}")))
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::Serialization(format!("bad uuid {s:?}: {e}")))
}

fn opt_text(s: Option<String>) -> Value {
    match s {
        Some(s) => Value::Text(s),
        None => Value::Null,
    }
}

fn opt_int(v: Option<i64>) -> Value {
    match v {
        Some(v) => Value::Integer(v),
        None => Value::Null,
    }
}

fn opt_bool(v: Option<bool>) -> Value {
    opt_int(v.map(i64::from))
}

fn opt_real(v: Option<f64>) -> Value {
    match v {
        Some(v) => Value::Real(v),
        None => Value::Null,
    }
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ── Row mapping ─────────────────────────────────────────────────────

const STAFF_COLUMNS: &str = "id, name, join_date, expected_hours, role";

const PATIENT_COLUMNS: &str =
    "id, name, dob, active, doctor_id, staff_id, therapy_types, created_at, updated_at";

const GUARDIAN_COLUMNS: &str = "id, name, phone_number, email";

const SESSION_COLUMNS: &str = "id, patient_id, staff_id, start_time, end_time, description, response, payment_received, created_at, updated_at";

const ACTIVITY_COLUMNS: &str =
    "id, session_id, description, duration_minutes, payment_received, created_at, updated_at";

const MEDICINE_COLUMNS: &str = "id, name, brand_name, patient_id, prescriber_id";

const BRANCH_COLUMNS: &str = "id, location, opening_date, active";

const HOURS_COLUMNS: &str = "branch_id, day_of_week, open_time, close_time, is_closed";

const ASSESSMENT_COLUMNS: &str = "id, name";

const QUESTION_COLUMNS: &str = "id, text, group_number, assessment_id";

const RESPONSE_COLUMNS: &str = "r.id, r.batch_id, r.question_id, q.text, r.patient_id, r.staff_id, r.session_id, r.status, r.answer, r.response_date, r.answered_at";

const RESPONSE_FROM: &str =
    "FROM onboarding_responses r JOIN onboarding_questions q ON q.id = r.question_id";

fn row_to_staff(row: &Row) -> Result<Staff, DatabaseError> {
    let role: String = row.get(4).map_err(decode_err)?;
    let hours: i64 = row.get(3).map_err(decode_err)?;
    Ok(Staff {
        id: parse_uuid(&row.get::<String>(0).map_err(decode_err)?)?,
        name: row.get(1).map_err(decode_err)?,
        join_date: parse_date(&row.get::<String>(2).map_err(decode_err)?)?,
        expected_hours: i32::try_from(hours)
            .map_err(|e| DatabaseError::Serialization(format!("expected_hours: {e}")))?,
        role: role.parse().map_err(DatabaseError::Serialization)?,
    })
}

fn row_to_patient(row: &Row) -> Result<Patient, DatabaseError> {
    let doctor_id: Option<String> = row.get(4).ok();
    Ok(Patient {
        id: parse_uuid(&row.get::<String>(0).map_err(decode_err)?)?,
        name: row.get(1).map_err(decode_err)?,
        dob: parse_date(&row.get::<String>(2).map_err(decode_err)?)?,
        active: row.get::<i64>(3).map_err(decode_err)? != 0,
        doctor_id: doctor_id.as_deref().map(parse_uuid).transpose()?,
        staff_id: parse_uuid(&row.get::<String>(5).map_err(decode_err)?)?,
        therapy_types: row.get(6).ok(),
        created_at: parse_ts(&row.get::<String>(7).map_err(decode_err)?)?,
        updated_at: parse_ts(&row.get::<String>(8).map_err(decode_err)?)?,
    })
}

fn row_to_guardian(row: &Row) -> Result<Guardian, DatabaseError> {
    Ok(Guardian {
        id: parse_uuid(&row.get::<String>(0).map_err(decode_err)?)?,
        name: row.get(1).map_err(decode_err)?,
        phone_number: row.get(2).ok(),
        email: row.get(3).ok(),
    })
}

fn row_to_session(row: &Row) -> Result<Session, DatabaseError> {
    let response: String = row.get(6).map_err(decode_err)?;
    Ok(Session {
        id: parse_uuid(&row.get::<String>(0).map_err(decode_err)?)?,
        patient_id: parse_uuid(&row.get::<String>(1).map_err(decode_err)?)?,
        staff_id: parse_uuid(&row.get::<String>(2).map_err(decode_err)?)?,
        start_time: parse_ts(&row.get::<String>(3).map_err(decode_err)?)?,
        end_time: parse_ts(&row.get::<String>(4).map_err(decode_err)?)?,
        description: row.get(5).map_err(decode_err)?,
        response: response
            .parse::<ResponseLevel>()
            .map_err(DatabaseError::Serialization)?,
        payment_received: row.get::<i64>(7).ok().map(|v| v != 0),
        created_at: parse_ts(&row.get::<String>(8).map_err(decode_err)?)?,
        updated_at: parse_ts(&row.get::<String>(9).map_err(decode_err)?)?,
    })
}

fn row_to_activity(row: &Row) -> Result<Activity, DatabaseError> {
    Ok(Activity {
        id: parse_uuid(&row.get::<String>(0).map_err(decode_err)?)?,
        session_id: parse_uuid(&row.get::<String>(1).map_err(decode_err)?)?,
        description: row.get(2).ok(),
        duration_minutes: row.get::<f64>(3).ok(),
        payment_received: row.get::<i64>(4).ok().map(|v| v != 0),
        created_at: parse_ts(&row.get::<String>(5).map_err(decode_err)?)?,
        updated_at: parse_ts(&row.get::<String>(6).map_err(decode_err)?)?,
    })
}

fn row_to_medicine(row: &Row) -> Result<Medicine, DatabaseError> {
    Ok(Medicine {
        id: parse_uuid(&row.get::<String>(0).map_err(decode_err)?)?,
        name: row.get(1).map_err(decode_err)?,
        brand_name: row.get(2).ok(),
        patient_id: parse_uuid(&row.get::<String>(3).map_err(decode_err)?)?,
        prescriber_id: parse_uuid(&row.get::<String>(4).map_err(decode_err)?)?,
    })
}

fn row_to_branch(row: &Row) -> Result<Branch, DatabaseError> {
    Ok(Branch {
        id: row.get(0).map_err(decode_err)?,
        location: row.get(1).ok(),
        opening_date: parse_date(&row.get::<String>(2).map_err(decode_err)?)?,
        active: row.get::<i64>(3).map_err(decode_err)? != 0,
    })
}

fn row_to_hours(row: &Row) -> Result<OperatingHours, DatabaseError> {
    let day: i64 = row.get(1).map_err(decode_err)?;
    Ok(OperatingHours {
        branch_id: row.get(0).map_err(decode_err)?,
        day_of_week: u8::try_from(day)
            .map_err(|e| DatabaseError::Serialization(format!("day_of_week: {e}")))?,
        open_time: row.get(2).map_err(decode_err)?,
        close_time: row.get(3).map_err(decode_err)?,
        is_closed: row.get::<i64>(4).map_err(decode_err)? != 0,
    })
}

fn row_to_assessment(row: &Row) -> Result<Assessment, DatabaseError> {
    Ok(Assessment {
        id: row.get(0).map_err(decode_err)?,
        name: row.get(1).map_err(decode_err)?,
    })
}

fn row_to_question(row: &Row) -> Result<OnboardingQuestion, DatabaseError> {
    Ok(OnboardingQuestion {
        id: row.get(0).map_err(decode_err)?,
        text: row.get(1).map_err(decode_err)?,
        group: row.get::<i64>(2).ok(),
        assessment_id: row.get(3).map_err(decode_err)?,
    })
}

fn row_to_response(row: &Row) -> Result<OnboardingResponse, DatabaseError> {
    let session_id: Option<String> = row.get(6).ok();
    let status: String = row.get(7).map_err(decode_err)?;
    let answered_at: Option<String> = row.get(10).ok();
    Ok(OnboardingResponse {
        id: parse_uuid(&row.get::<String>(0).map_err(decode_err)?)?,
        batch_id: parse_uuid(&row.get::<String>(1).map_err(decode_err)?)?,
        question_id: row.get(2).map_err(decode_err)?,
        question_text: row.get(3).map_err(decode_err)?,
        patient_id: parse_uuid(&row.get::<String>(4).map_err(decode_err)?)?,
        staff_id: parse_uuid(&row.get::<String>(5).map_err(decode_err)?)?,
        session_id: session_id.as_deref().map(parse_uuid).transpose()?,
        status: status
            .parse::<ResponseStatus>()
            .map_err(DatabaseError::Serialization)?,
        answer: row.get(8).ok(),
        response_date: parse_ts(&row.get::<String>(9).map_err(decode_err)?)?,
        answered_at: answered_at.as_deref().map(parse_ts).transpose()?,
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let _gate = self.gate.write().await;
        migrations::run_migrations(&self.conn).await
    }

    // ── Staff ───────────────────────────────────────────────────────

    async fn insert_staff(&self, staff: &Staff) -> Result<(), DatabaseError> {
        self.write(
            "insert_staff",
            "INSERT INTO staff (id, name, join_date, expected_hours, role) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                staff.id.to_string(),
                staff.name.clone(),
                staff.join_date.to_string(),
                i64::from(staff.expected_hours),
                staff.role.as_str(),
            ],
        )
        .await?;
        debug!(staff_id = %staff.id, role = %staff.role, "Staff inserted");
        Ok(())
    }

    async fn get_staff(&self, id: Uuid) -> Result<Option<Staff>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_staff",
            &format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = ?1"),
            params![id.to_string()],
            row_to_staff,
        )
        .await
    }

    async fn list_staff(
        &self,
        role: Option<StaffRole>,
        page: Page,
    ) -> Result<Listing<Staff>, DatabaseError> {
        let (from_where, args) = match role {
            Some(role) => (
                "FROM staff WHERE role = ?",
                vec![Value::Text(role.as_str().to_string())],
            ),
            None => ("FROM staff", Vec::new()),
        };
        self.fetch_page(
            "list_staff",
            STAFF_COLUMNS,
            from_where,
            "name, id",
            args,
            page,
            row_to_staff,
        )
        .await
    }

    async fn update_staff(&self, staff: &Staff) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_staff",
            "staff",
            staff.id,
            "UPDATE staff SET name = ?2, join_date = ?3, expected_hours = ?4, role = ?5 WHERE id = ?1",
            params![
                staff.id.to_string(),
                staff.name.clone(),
                staff.join_date.to_string(),
                i64::from(staff.expected_hours),
                staff.role.as_str(),
            ],
        )
        .await
    }

    async fn delete_staff(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_staff",
                "DELETE FROM staff WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        Ok(changed > 0)
    }

    // ── Patients ────────────────────────────────────────────────────

    async fn insert_patient(&self, patient: &Patient) -> Result<(), DatabaseError> {
        self.write(
            "insert_patient",
            "INSERT INTO patients (id, name, dob, active, doctor_id, staff_id, therapy_types, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                patient.id.to_string(),
                patient.name.clone(),
                patient.dob.to_string(),
                i64::from(patient.active),
                opt_text(patient.doctor_id.map(|id| id.to_string())),
                patient.staff_id.to_string(),
                opt_text(patient.therapy_types.clone()),
                fmt_ts(&patient.created_at),
                fmt_ts(&patient.updated_at),
            ],
        )
        .await?;
        debug!(patient_id = %patient.id, "Patient inserted");
        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_patient",
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id.to_string()],
            row_to_patient,
        )
        .await
    }

    async fn list_patients(
        &self,
        name: Option<&str>,
        page: Page,
    ) -> Result<Listing<Patient>, DatabaseError> {
        let (from_where, args) = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(needle) => (
                "FROM patients WHERE name LIKE ? ESCAPE '\\'",
                vec![Value::Text(like_pattern(needle))],
            ),
            None => ("FROM patients", Vec::new()),
        };
        self.fetch_page(
            "list_patients",
            PATIENT_COLUMNS,
            from_where,
            "name, id",
            args,
            page,
            row_to_patient,
        )
        .await
    }

    async fn update_patient(&self, patient: &Patient) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_patient",
            "patient",
            patient.id,
            "UPDATE patients SET name = ?2, dob = ?3, active = ?4, doctor_id = ?5, staff_id = ?6, therapy_types = ?7, updated_at = ?8 WHERE id = ?1",
            params![
                patient.id.to_string(),
                patient.name.clone(),
                patient.dob.to_string(),
                i64::from(patient.active),
                opt_text(patient.doctor_id.map(|id| id.to_string())),
                patient.staff_id.to_string(),
                opt_text(patient.therapy_types.clone()),
                fmt_ts(&patient.updated_at),
            ],
        )
        .await
    }

    async fn delete_patient(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_patient",
                "DELETE FROM patients WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        Ok(changed > 0)
    }

    // ── Guardians ───────────────────────────────────────────────────

    async fn insert_guardian(&self, guardian: &Guardian) -> Result<(), DatabaseError> {
        self.write(
            "insert_guardian",
            "INSERT INTO guardians (id, name, phone_number, email) VALUES (?1, ?2, ?3, ?4)",
            params![
                guardian.id.to_string(),
                guardian.name.clone(),
                opt_text(guardian.phone_number.clone()),
                opt_text(guardian.email.clone()),
            ],
        )
        .await?;
        debug!(guardian_id = %guardian.id, "Guardian inserted");
        Ok(())
    }

    async fn get_guardian(&self, id: Uuid) -> Result<Option<Guardian>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_guardian",
            &format!("SELECT {GUARDIAN_COLUMNS} FROM guardians WHERE id = ?1"),
            params![id.to_string()],
            row_to_guardian,
        )
        .await
    }

    async fn update_guardian(&self, guardian: &Guardian) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_guardian",
            "guardian",
            guardian.id,
            "UPDATE guardians SET name = ?2, phone_number = ?3, email = ?4 WHERE id = ?1",
            params![
                guardian.id.to_string(),
                guardian.name.clone(),
                opt_text(guardian.phone_number.clone()),
                opt_text(guardian.email.clone()),
            ],
        )
        .await
    }

    async fn delete_guardian(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_guardian",
                "DELETE FROM guardians WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn link_guardian(
        &self,
        patient_id: Uuid,
        guardian_id: Uuid,
    ) -> Result<(), DatabaseError> {
        self.write(
            "link_guardian",
            "INSERT INTO patient_guardians (patient_id, guardian_id) VALUES (?1, ?2)
             ON CONFLICT (patient_id, guardian_id) DO NOTHING",
            params![patient_id.to_string(), guardian_id.to_string()],
        )
        .await?;
        debug!(patient_id = %patient_id, guardian_id = %guardian_id, "Guardian linked");
        Ok(())
    }

    async fn unlink_guardian(
        &self,
        patient_id: Uuid,
        guardian_id: Uuid,
    ) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "unlink_guardian",
                "DELETE FROM patient_guardians WHERE patient_id = ?1 AND guardian_id = ?2",
                params![patient_id.to_string(), guardian_id.to_string()],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn list_patient_guardians(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Guardian>, DatabaseError> {
        fetch_all(
            &*self.read().await,
            "list_patient_guardians",
            "SELECT g.id, g.name, g.phone_number, g.email
             FROM guardians g JOIN patient_guardians pg ON pg.guardian_id = g.id
             WHERE pg.patient_id = ?1
             ORDER BY g.name, g.id",
            params![patient_id.to_string()],
            row_to_guardian,
        )
        .await
    }

    // ── Sessions ────────────────────────────────────────────────────

    async fn insert_session(&self, session: &Session) -> Result<(), DatabaseError> {
        let _gate = self.gate.write().await;
        let tx = self.begin("insert_session").await?;
        let result = async {
            let interval = Interval::new(session.start_time, session.end_time);
            if overlap_exists(&tx, session.staff_id, &interval, None).await? {
                return Err(DatabaseError::Conflict(OVERLAP_CONFLICT.to_string()));
            }
            tx.execute(
                &format!("INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
                params![
                    session.id.to_string(),
                    session.patient_id.to_string(),
                    session.staff_id.to_string(),
                    fmt_ts(&session.start_time),
                    fmt_ts(&session.end_time),
                    session.description.clone(),
                    session.response.as_str(),
                    opt_bool(session.payment_received),
                    fmt_ts(&session.created_at),
                    fmt_ts(&session.updated_at),
                ],
            )
            .await
            .map_err(|e| classify("insert_session", e))?;
            Ok::<_, DatabaseError>(())
        }
        .await;
        finish(tx, "insert_session", result).await?;
        debug!(session_id = %session.id, staff_id = %session.staff_id, "Session inserted");
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_session",
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
            params![id.to_string()],
            row_to_session,
        )
        .await
    }

    async fn list_sessions(
        &self,
        filter: &SessionFilter,
        page: Page,
    ) -> Result<Listing<Session>, DatabaseError> {
        let mut clauses = Vec::new();
        let mut args = Vec::new();
        if let Some(patient_id) = filter.patient_id {
            clauses.push("patient_id = ?");
            args.push(Value::Text(patient_id.to_string()));
        }
        if let Some(staff_id) = filter.staff_id {
            clauses.push("staff_id = ?");
            args.push(Value::Text(staff_id.to_string()));
        }
        if let Some(from) = filter.from {
            clauses.push("start_time >= ?");
            args.push(Value::Text(fmt_ts(&from)));
        }
        if let Some(to) = filter.to {
            clauses.push("end_time <= ?");
            args.push(Value::Text(fmt_ts(&to)));
        }
        let from_where = if clauses.is_empty() {
            "FROM sessions".to_string()
        } else {
            format!("FROM sessions WHERE {}", clauses.join(" AND "))
        };
        self.fetch_page(
            "list_sessions",
            SESSION_COLUMNS,
            &from_where,
            "start_time, id",
            args,
            page,
            row_to_session,
        )
        .await
    }

    async fn update_session(&self, session: &Session) -> Result<(), DatabaseError> {
        let _gate = self.gate.write().await;
        let tx = self.begin("update_session").await?;
        let result = async {
            let interval = Interval::new(session.start_time, session.end_time);
            if overlap_exists(&tx, session.staff_id, &interval, Some(session.id)).await? {
                return Err(DatabaseError::Conflict(OVERLAP_CONFLICT.to_string()));
            }
            let changed = tx
                .execute(
                    "UPDATE sessions SET patient_id = ?2, staff_id = ?3, start_time = ?4, end_time = ?5, description = ?6, response = ?7, payment_received = ?8, updated_at = ?9 WHERE id = ?1",
                    params![
                        session.id.to_string(),
                        session.patient_id.to_string(),
                        session.staff_id.to_string(),
                        fmt_ts(&session.start_time),
                        fmt_ts(&session.end_time),
                        session.description.clone(),
                        session.response.as_str(),
                        opt_bool(session.payment_received),
                        fmt_ts(&session.updated_at),
                    ],
                )
                .await
                .map_err(|e| classify("update_session", e))?;
            if changed == 0 {
                return Err(DatabaseError::not_found("session", session.id));
            }
            Ok::<_, DatabaseError>(())
        }
        .await;
        finish(tx, "update_session", result).await?;
        debug!(session_id = %session.id, "Session updated");
        Ok(())
    }

    async fn delete_session(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_session",
                "DELETE FROM sessions WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn has_overlapping_session(
        &self,
        staff_id: Uuid,
        interval: &Interval,
        exclude: Option<Uuid>,
    ) -> Result<bool, DatabaseError> {
        overlap_exists(&*self.read().await, staff_id, interval, exclude).await
    }

    // ── Activities ──────────────────────────────────────────────────

    async fn insert_activity(&self, activity: &Activity) -> Result<(), DatabaseError> {
        self.write(
            "insert_activity",
            &format!("INSERT INTO activities ({ACTIVITY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                activity.id.to_string(),
                activity.session_id.to_string(),
                opt_text(activity.description.clone()),
                opt_real(activity.duration_minutes),
                opt_bool(activity.payment_received),
                fmt_ts(&activity.created_at),
                fmt_ts(&activity.updated_at),
            ],
        )
        .await?;
        debug!(activity_id = %activity.id, session_id = %activity.session_id, "Activity inserted");
        Ok(())
    }

    async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_activity",
            &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"),
            params![id.to_string()],
            row_to_activity,
        )
        .await
    }

    async fn list_activities(
        &self,
        session_id: Uuid,
        page: Page,
    ) -> Result<Listing<Activity>, DatabaseError> {
        self.fetch_page(
            "list_activities",
            ACTIVITY_COLUMNS,
            "FROM activities WHERE session_id = ?",
            "created_at, id",
            vec![Value::Text(session_id.to_string())],
            page,
            row_to_activity,
        )
        .await
    }

    async fn update_activity(&self, activity: &Activity) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_activity",
            "activity",
            activity.id,
            "UPDATE activities SET description = ?2, duration_minutes = ?3, payment_received = ?4, updated_at = ?5 WHERE id = ?1",
            params![
                activity.id.to_string(),
                opt_text(activity.description.clone()),
                opt_real(activity.duration_minutes),
                opt_bool(activity.payment_received),
                fmt_ts(&activity.updated_at),
            ],
        )
        .await
    }

    async fn delete_activity(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_activity",
                "DELETE FROM activities WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        Ok(changed > 0)
    }

    // ── Medicines ───────────────────────────────────────────────────

    async fn insert_medicine(&self, medicine: &Medicine) -> Result<(), DatabaseError> {
        self.write(
            "insert_medicine",
            &format!("INSERT INTO medicines ({MEDICINE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                medicine.id.to_string(),
                medicine.name.clone(),
                opt_text(medicine.brand_name.clone()),
                medicine.patient_id.to_string(),
                medicine.prescriber_id.to_string(),
            ],
        )
        .await?;
        debug!(medicine_id = %medicine.id, patient_id = %medicine.patient_id, "Medicine inserted");
        Ok(())
    }

    async fn get_medicine(&self, id: Uuid) -> Result<Option<Medicine>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_medicine",
            &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1"),
            params![id.to_string()],
            row_to_medicine,
        )
        .await
    }

    async fn list_patient_medicines(
        &self,
        patient_id: Uuid,
        page: Page,
    ) -> Result<Listing<Medicine>, DatabaseError> {
        self.fetch_page(
            "list_patient_medicines",
            MEDICINE_COLUMNS,
            "FROM medicines WHERE patient_id = ?",
            "name, id",
            vec![Value::Text(patient_id.to_string())],
            page,
            row_to_medicine,
        )
        .await
    }

    async fn list_prescriptions(
        &self,
        prescriber_id: Uuid,
        page: Page,
    ) -> Result<Listing<Medicine>, DatabaseError> {
        self.fetch_page(
            "list_prescriptions",
            MEDICINE_COLUMNS,
            "FROM medicines WHERE prescriber_id = ?",
            "name, id",
            vec![Value::Text(prescriber_id.to_string())],
            page,
            row_to_medicine,
        )
        .await
    }

    async fn update_medicine(&self, medicine: &Medicine) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_medicine",
            "medicine",
            medicine.id,
            "UPDATE medicines SET name = ?2, brand_name = ?3, patient_id = ?4, prescriber_id = ?5 WHERE id = ?1",
            params![
                medicine.id.to_string(),
                medicine.name.clone(),
                opt_text(medicine.brand_name.clone()),
                medicine.patient_id.to_string(),
                medicine.prescriber_id.to_string(),
            ],
        )
        .await
    }

    async fn delete_medicine(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_medicine",
                "DELETE FROM medicines WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        Ok(changed > 0)
    }

    // ── Branches ────────────────────────────────────────────────────

    async fn insert_branch(&self, branch: &NewBranch) -> Result<Branch, DatabaseError> {
        let _gate = self.gate.write().await;
        self.conn
            .execute(
                "INSERT INTO branches (location, opening_date, active) VALUES (?1, ?2, ?3)",
                params![
                    opt_text(branch.location.clone()),
                    branch.opening_date.to_string(),
                    i64::from(branch.active),
                ],
            )
            .await
            .map_err(|e| classify("insert_branch", e))?;
        let id = self.conn.last_insert_rowid();
        debug!(branch_id = id, "Branch inserted");
        Ok(Branch {
            id,
            location: branch.location.clone(),
            opening_date: branch.opening_date,
            active: branch.active,
        })
    }

    async fn get_branch(&self, id: i64) -> Result<Option<Branch>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_branch",
            &format!("SELECT {BRANCH_COLUMNS} FROM branches WHERE id = ?1"),
            params![id],
            row_to_branch,
        )
        .await
    }

    async fn list_branches(&self, page: Page) -> Result<Listing<Branch>, DatabaseError> {
        self.fetch_page(
            "list_branches",
            BRANCH_COLUMNS,
            "FROM branches",
            "id",
            Vec::new(),
            page,
            row_to_branch,
        )
        .await
    }

    async fn update_branch(&self, branch: &Branch) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_branch",
            "branch",
            branch.id,
            "UPDATE branches SET location = ?2, opening_date = ?3, active = ?4 WHERE id = ?1",
            params![
                branch.id,
                opt_text(branch.location.clone()),
                branch.opening_date.to_string(),
                i64::from(branch.active),
            ],
        )
        .await
    }

    async fn delete_branch(&self, id: i64) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_branch",
                "DELETE FROM branches WHERE id = ?1",
                params![id],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn insert_operating_hours(&self, hours: &OperatingHours) -> Result<(), DatabaseError> {
        self.write(
            "insert_operating_hours",
            &format!("INSERT INTO operating_hours ({HOURS_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                hours.branch_id,
                i64::from(hours.day_of_week),
                hours.open_time.clone(),
                hours.close_time.clone(),
                i64::from(hours.is_closed),
            ],
        )
        .await?;
        debug!(branch_id = hours.branch_id, day = hours.day_of_week, "Operating hours inserted");
        Ok(())
    }

    async fn get_operating_hours(
        &self,
        branch_id: i64,
        day_of_week: u8,
    ) -> Result<Option<OperatingHours>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_operating_hours",
            &format!(
                "SELECT {HOURS_COLUMNS} FROM operating_hours WHERE branch_id = ?1 AND day_of_week = ?2"
            ),
            params![branch_id, i64::from(day_of_week)],
            row_to_hours,
        )
        .await
    }

    async fn list_operating_hours(
        &self,
        branch_id: i64,
    ) -> Result<Vec<OperatingHours>, DatabaseError> {
        fetch_all(
            &*self.read().await,
            "list_operating_hours",
            &format!(
                "SELECT {HOURS_COLUMNS} FROM operating_hours WHERE branch_id = ?1 ORDER BY day_of_week"
            ),
            params![branch_id],
            row_to_hours,
        )
        .await
    }

    async fn update_operating_hours(&self, hours: &OperatingHours) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_operating_hours",
            "operating hours",
            format!("{}/{}", hours.branch_id, hours.day_of_week),
            "UPDATE operating_hours SET open_time = ?3, close_time = ?4, is_closed = ?5 WHERE branch_id = ?1 AND day_of_week = ?2",
            params![
                hours.branch_id,
                i64::from(hours.day_of_week),
                hours.open_time.clone(),
                hours.close_time.clone(),
                i64::from(hours.is_closed),
            ],
        )
        .await
    }

    async fn delete_operating_hours(
        &self,
        branch_id: i64,
        day_of_week: u8,
    ) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_operating_hours",
                "DELETE FROM operating_hours WHERE branch_id = ?1 AND day_of_week = ?2",
                params![branch_id, i64::from(day_of_week)],
            )
            .await?;
        Ok(changed > 0)
    }

    // ── Assessments ─────────────────────────────────────────────────

    async fn insert_assessment(&self, name: &str) -> Result<Assessment, DatabaseError> {
        let _gate = self.gate.write().await;
        self.conn
            .execute(
                "INSERT INTO assessments (name) VALUES (?1)",
                params![name],
            )
            .await
            .map_err(|e| classify("insert_assessment", e))?;
        let id = self.conn.last_insert_rowid();
        debug!(assessment_id = id, name, "Assessment inserted");
        Ok(Assessment {
            id,
            name: name.to_string(),
        })
    }

    async fn insert_assessment_if_absent(&self, name: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "insert_assessment_if_absent",
                "INSERT INTO assessments (name) VALUES (?1) ON CONFLICT (name) DO NOTHING",
                params![name],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn get_assessment(&self, id: i64) -> Result<Option<Assessment>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_assessment",
            &format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE id = ?1"),
            params![id],
            row_to_assessment,
        )
        .await
    }

    async fn find_assessment_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Assessment>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "find_assessment_by_name",
            &format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE name = ?1"),
            params![name],
            row_to_assessment,
        )
        .await
    }

    async fn list_assessments(&self) -> Result<Vec<Assessment>, DatabaseError> {
        fetch_all(
            &*self.read().await,
            "list_assessments",
            &format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments ORDER BY id"),
            (),
            row_to_assessment,
        )
        .await
    }

    async fn update_assessment(&self, assessment: &Assessment) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_assessment",
            "assessment",
            assessment.id,
            "UPDATE assessments SET name = ?2 WHERE id = ?1",
            params![assessment.id, assessment.name.clone()],
        )
        .await
    }

    async fn delete_assessment(&self, id: i64) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_assessment",
                "DELETE FROM assessments WHERE id = ?1",
                params![id],
            )
            .await?;
        Ok(changed > 0)
    }

    // ── Onboarding questions ────────────────────────────────────────

    async fn insert_question(
        &self,
        question: &NewQuestion,
    ) -> Result<OnboardingQuestion, DatabaseError> {
        let _gate = self.gate.write().await;
        self.conn
            .execute(
                "INSERT INTO onboarding_questions (text, group_number, assessment_id) VALUES (?1, ?2, ?3)",
                params![
                    question.text.clone(),
                    opt_int(question.group),
                    question.assessment_id,
                ],
            )
            .await
            .map_err(|e| classify("insert_question", e))?;
        let id = self.conn.last_insert_rowid();
        debug!(question_id = id, assessment_id = question.assessment_id, "Question inserted");
        Ok(OnboardingQuestion {
            id,
            text: question.text.clone(),
            group: question.group,
            assessment_id: question.assessment_id,
        })
    }

    async fn insert_question_if_absent(
        &self,
        question: &NewQuestion,
    ) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "insert_question_if_absent",
                "INSERT INTO onboarding_questions (text, group_number, assessment_id) VALUES (?1, ?2, ?3)
                 ON CONFLICT (text) DO NOTHING",
                params![
                    question.text.clone(),
                    opt_int(question.group),
                    question.assessment_id,
                ],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn get_question(&self, id: i64) -> Result<Option<OnboardingQuestion>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_question",
            &format!("SELECT {QUESTION_COLUMNS} FROM onboarding_questions WHERE id = ?1"),
            params![id],
            row_to_question,
        )
        .await
    }

    async fn list_questions(
        &self,
        assessment_id: i64,
    ) -> Result<Vec<OnboardingQuestion>, DatabaseError> {
        fetch_all(
            &*self.read().await,
            "list_questions",
            &format!(
                "SELECT {QUESTION_COLUMNS} FROM onboarding_questions WHERE assessment_id = ?1 ORDER BY id"
            ),
            params![assessment_id],
            row_to_question,
        )
        .await
    }

    async fn update_question(&self, question: &OnboardingQuestion) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_question",
            "question",
            question.id,
            "UPDATE onboarding_questions SET text = ?2, group_number = ?3, assessment_id = ?4 WHERE id = ?1",
            params![
                question.id,
                question.text.clone(),
                opt_int(question.group),
                question.assessment_id,
            ],
        )
        .await
    }

    async fn delete_question(&self, id: i64) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_question",
                "DELETE FROM onboarding_questions WHERE id = ?1",
                params![id],
            )
            .await?;
        Ok(changed > 0)
    }

    // ── Onboarding responses ────────────────────────────────────────

    async fn insert_onboarding_responses(
        &self,
        responses: &[OnboardingResponse],
    ) -> Result<(), DatabaseError> {
        let _gate = self.gate.write().await;
        let tx = self.begin("insert_onboarding_responses").await?;
        let result = async {
            for response in responses {
                tx.execute(
                    "INSERT INTO onboarding_responses (id, batch_id, question_id, patient_id, staff_id, session_id, status, answer, response_date, answered_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        response.id.to_string(),
                        response.batch_id.to_string(),
                        response.question_id,
                        response.patient_id.to_string(),
                        response.staff_id.to_string(),
                        opt_text(response.session_id.map(|id| id.to_string())),
                        response.status.as_str(),
                        opt_text(response.answer.clone()),
                        fmt_ts(&response.response_date),
                        opt_text(response.answered_at.as_ref().map(fmt_ts)),
                    ],
                )
                .await
                .map_err(|e| classify("insert_onboarding_responses", e))?;
            }
            Ok::<_, DatabaseError>(())
        }
        .await;
        finish(tx, "insert_onboarding_responses", result).await?;
        debug!(count = responses.len(), "Onboarding responses inserted");
        Ok(())
    }

    async fn get_onboarding_response(
        &self,
        id: Uuid,
    ) -> Result<Option<OnboardingResponse>, DatabaseError> {
        fetch_optional(
            &*self.read().await,
            "get_onboarding_response",
            &format!("SELECT {RESPONSE_COLUMNS} {RESPONSE_FROM} WHERE r.id = ?1"),
            params![id.to_string()],
            row_to_response,
        )
        .await
    }

    async fn list_onboarding_responses(
        &self,
        patient_id: Uuid,
        question_id: Option<i64>,
        page: Page,
    ) -> Result<Listing<OnboardingResponse>, DatabaseError> {
        let mut args = vec![Value::Text(patient_id.to_string())];
        let from_where = match question_id {
            Some(question_id) => {
                args.push(Value::Integer(question_id));
                format!("{RESPONSE_FROM} WHERE r.patient_id = ? AND r.question_id = ?")
            }
            None => format!("{RESPONSE_FROM} WHERE r.patient_id = ?"),
        };
        self.fetch_page(
            "list_onboarding_responses",
            RESPONSE_COLUMNS,
            &from_where,
            "r.response_date, r.batch_id, r.question_id",
            args,
            page,
            row_to_response,
        )
        .await
    }

    async fn update_onboarding_response(
        &self,
        response: &OnboardingResponse,
    ) -> Result<(), DatabaseError> {
        self.write_existing(
            "update_onboarding_response",
            "onboarding response",
            response.id,
            "UPDATE onboarding_responses SET session_id = ?2, status = ?3, answer = ?4, answered_at = ?5 WHERE id = ?1",
            params![
                response.id.to_string(),
                opt_text(response.session_id.map(|id| id.to_string())),
                response.status.as_str(),
                opt_text(response.answer.clone()),
                opt_text(response.answered_at.as_ref().map(fmt_ts)),
            ],
        )
        .await
    }

    async fn delete_onboarding_response(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self
            .write(
                "delete_onboarding_response",
                "DELETE FROM onboarding_responses WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        Ok(changed > 0)
    }
}
