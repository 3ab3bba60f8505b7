//! Version-tracked database migrations for the libSQL backend.
//!
//! Each migration has a version number and SQL. `run_migrations()` checks
//! the current version and applies only the new ones sequentially.

use libsql::Connection;

use crate::error::DatabaseError;

/// A single migration step.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. Add new versions to the end.
///
/// Timestamps are RFC 3339 UTC text with microseconds (fixed width), so
/// comparisons on the text columns order chronologically.
static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "clinic_schema",
        sql: r#"
            CREATE TABLE IF NOT EXISTS staff (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                join_date TEXT NOT NULL,
                expected_hours INTEGER NOT NULL DEFAULT 0,
                role TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_staff_role ON staff(role);

            CREATE TABLE IF NOT EXISTS guardians (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                phone_number TEXT,
                email TEXT
            );

            CREATE TABLE IF NOT EXISTS patients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                dob TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                doctor_id TEXT REFERENCES staff(id) ON DELETE SET NULL,
                staff_id TEXT NOT NULL REFERENCES staff(id) ON DELETE RESTRICT,
                therapy_types TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
            CREATE INDEX IF NOT EXISTS idx_patients_staff ON patients(staff_id);

            CREATE TABLE IF NOT EXISTS patient_guardians (
                patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                guardian_id TEXT NOT NULL REFERENCES guardians(id) ON DELETE CASCADE,
                PRIMARY KEY (patient_id, guardian_id)
            );
            CREATE INDEX IF NOT EXISTS idx_patient_guardians_guardian
                ON patient_guardians(guardian_id);

            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE RESTRICT,
                staff_id TEXT NOT NULL REFERENCES staff(id) ON DELETE RESTRICT,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                response TEXT NOT NULL DEFAULT 'not_recorded',
                payment_received INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CHECK (start_time < end_time)
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_staff_time
                ON sessions(staff_id, start_time, end_time);
            CREATE INDEX IF NOT EXISTS idx_sessions_patient ON sessions(patient_id);

            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE RESTRICT,
                description TEXT,
                duration_minutes REAL,
                payment_received INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_activities_session ON activities(session_id);

            CREATE TABLE IF NOT EXISTS medicines (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                brand_name TEXT,
                patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                prescriber_id TEXT NOT NULL REFERENCES staff(id) ON DELETE RESTRICT
            );
            CREATE INDEX IF NOT EXISTS idx_medicines_patient ON medicines(patient_id);
            CREATE INDEX IF NOT EXISTS idx_medicines_prescriber ON medicines(prescriber_id);

            CREATE TABLE IF NOT EXISTS branches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                location TEXT,
                opening_date TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS operating_hours (
                branch_id INTEGER NOT NULL REFERENCES branches(id) ON DELETE CASCADE,
                day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
                open_time TEXT NOT NULL,
                close_time TEXT NOT NULL,
                is_closed INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (branch_id, day_of_week)
            );
        "#,
    },
    Migration {
        version: 2,
        name: "onboarding",
        sql: r#"
            CREATE TABLE IF NOT EXISTS assessments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS onboarding_questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL UNIQUE COLLATE NOCASE,
                group_number INTEGER,
                assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_onboarding_questions_assessment
                ON onboarding_questions(assessment_id);

            CREATE TABLE IF NOT EXISTS onboarding_responses (
                id TEXT PRIMARY KEY,
                batch_id TEXT NOT NULL,
                question_id INTEGER NOT NULL
                    REFERENCES onboarding_questions(id) ON DELETE CASCADE,
                patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                staff_id TEXT NOT NULL REFERENCES staff(id) ON DELETE RESTRICT,
                session_id TEXT REFERENCES sessions(id) ON DELETE SET NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                answer TEXT,
                response_date TEXT NOT NULL,
                answered_at TEXT,
                UNIQUE (patient_id, question_id, batch_id)
            );
            CREATE INDEX IF NOT EXISTS idx_onboarding_responses_patient
                ON onboarding_responses(patient_id);
            CREATE INDEX IF NOT EXISTS idx_onboarding_responses_batch
                ON onboarding_responses(batch_id);
        "#,
    },
    Migration {
        version: 3,
        name: "session_overlap_guard",
        sql: r#"
            CREATE TRIGGER IF NOT EXISTS sessions_no_overlap_insert
            BEFORE INSERT ON sessions
            WHEN EXISTS (
                SELECT 1 FROM sessions s
                WHERE s.staff_id = NEW.staff_id
                  AND s.start_time < NEW.end_time
                  AND s.end_time > NEW.start_time
            )
            BEGIN
                SELECT RAISE(ABORT, 'session overlap');
            END;

            CREATE TRIGGER IF NOT EXISTS sessions_no_overlap_update
            BEFORE UPDATE OF staff_id, start_time, end_time ON sessions
            WHEN EXISTS (
                SELECT 1 FROM sessions s
                WHERE s.staff_id = NEW.staff_id
                  AND s.id <> NEW.id
                  AND s.start_time < NEW.end_time
                  AND s.end_time > NEW.start_time
            )
            BEGIN
                SELECT RAISE(ABORT, 'session overlap');
            END;
        "#,
    },
];

/// Run all pending migrations. Safe to call on every startup.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("Failed to create _migrations table: {e}")))?;

    let current_version = get_current_version(conn).await?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            conn.execute_batch(migration.sql).await.map_err(|e| {
                DatabaseError::Migration(format!(
                    "Migration V{} ({}) failed: {e}",
                    migration.version, migration.name
                ))
            })?;
            seed_version(conn, migration.version, migration.name).await?;
        }
    }

    let version = get_current_version(conn).await?;
    tracing::info!(version, "Database migrations complete");
    Ok(())
}

/// Get the highest applied migration version, or 0 if none.
async fn get_current_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to query migration version: {e}")))?;

    let row = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to read migration version: {e}")))?;

    match row {
        Some(row) => {
            let version: i64 = row.get(0).map_err(|e| {
                DatabaseError::Migration(format!("Failed to parse migration version: {e}"))
            })?;
            Ok(version)
        }
        None => Ok(0),
    }
}

/// Record a migration version as applied.
async fn seed_version(conn: &Connection, version: i64, name: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO _migrations (version, name) VALUES (?1, ?2)",
        libsql::params![version, name],
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("Failed to record migration V{version}: {e}")))?;
    Ok(())
}
