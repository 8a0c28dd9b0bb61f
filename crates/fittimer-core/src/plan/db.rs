//! SQLite-backed plan storage.
//!
//! Provides persistent storage for:
//! - The ordered workout plan
//! - Completed exercise runs
//! - Key-value store for host state (e.g. a parked timer engine)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{CompletionRecord, NewExercise, PlannedExercise, RunSummary, WorkoutPlanStore};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::storage::data_dir;

/// SQLite database for the workout plan and its history.
pub struct PlanDb {
    conn: Connection,
}

impl PlanDb {
    /// Open the database at `~/.config/fittimer/fittimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("fittimer.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS plan_exercises (
                    id               TEXT PRIMARY KEY,
                    name             TEXT NOT NULL,
                    position         INTEGER NOT NULL,
                    sets             INTEGER NOT NULL,
                    reps             INTEGER NOT NULL,
                    duration_seconds INTEGER,
                    rest_seconds     INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS completions (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    exercise_id    TEXT NOT NULL,
                    exercise_name  TEXT NOT NULL,
                    sets_performed INTEGER NOT NULL,
                    set_count      INTEGER NOT NULL,
                    forced         INTEGER NOT NULL DEFAULT 0,
                    completed_at   TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_plan_position ON plan_exercises(position);
                CREATE INDEX IF NOT EXISTS idx_completions_completed_at ON completions(completed_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Append an exercise to the end of the plan.
    ///
    /// # Errors
    /// Returns a validation error for an empty name or zero sets, or a
    /// database error if the insert fails.
    pub fn add_exercise(&self, exercise: &NewExercise) -> Result<PlannedExercise> {
        validate(exercise)?;
        let position: u32 = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM plan_exercises",
            [],
            |row| row.get(0),
        )?;
        let planned = PlannedExercise {
            id: uuid::Uuid::new_v4().to_string(),
            name: exercise.name.trim().to_string(),
            position,
            sets: exercise.sets,
            reps: exercise.reps,
            duration_seconds: exercise.duration_seconds,
            rest_seconds: exercise.rest_seconds,
        };
        self.conn.execute(
            "INSERT INTO plan_exercises (id, name, position, sets, reps, duration_seconds, rest_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                planned.id,
                planned.name,
                planned.position,
                planned.sets,
                planned.reps,
                planned.duration_seconds,
                planned.rest_seconds,
            ],
        )?;
        tracing::info!(id = %planned.id, name = %planned.name, "exercise added to plan");
        Ok(planned)
    }

    pub fn get_exercise(&self, id: &str) -> Result<Option<PlannedExercise>> {
        let exercise = self
            .conn
            .query_row(
                "SELECT id, name, position, sets, reps, duration_seconds, rest_seconds
                 FROM plan_exercises WHERE id = ?1",
                params![id],
                row_to_exercise,
            )
            .optional()?;
        Ok(exercise)
    }

    /// Remove an exercise. Returns whether a row was deleted.
    pub fn remove_exercise(&self, id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM plan_exercises WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Remove every exercise from the plan. History is kept.
    pub fn clear_plan(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM plan_exercises", [])?)
    }

    /// Most recent completions first.
    pub fn completions(&self, limit: usize) -> Result<Vec<CompletionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, exercise_id, exercise_name, sets_performed, set_count, forced, completed_at
             FROM completions
             ORDER BY completed_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let completed_at: String = row.get(6)?;
            Ok(CompletionRecord {
                id: row.get(0)?,
                exercise_id: row.get(1)?,
                exercise_name: row.get(2)?,
                sets_performed: row.get(3)?,
                set_count: row.get(4)?,
                forced: row.get(5)?,
                completed_at: parse_timestamp(&completed_at),
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl WorkoutPlanStore for PlanDb {
    fn current_exercises(&self) -> Result<Vec<PlannedExercise>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, position, sets, reps, duration_seconds, rest_seconds
             FROM plan_exercises
             ORDER BY position ASC",
        )?;
        let rows = stmt.query_map([], row_to_exercise)?;
        let exercises = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    fn record_completion(&self, exercise_id: &str, summary: &RunSummary) -> Result<i64> {
        if self.get_exercise(exercise_id)?.is_none() {
            return Err(ValidationError::NotFound {
                kind: "exercise".into(),
                id: exercise_id.to_string(),
            }
            .into());
        }
        self.conn.execute(
            "INSERT INTO completions (exercise_id, exercise_name, sets_performed, set_count, forced, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                exercise_id,
                summary.exercise_name,
                summary.sets_performed,
                summary.set_count,
                summary.forced,
                summary.completed_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(
            exercise = %summary.exercise_name,
            sets = summary.sets_performed,
            "completion recorded"
        );
        Ok(id)
    }
}

pub(super) fn validate(exercise: &NewExercise) -> Result<()> {
    if exercise.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".into(),
            message: "must not be empty".into(),
        }
        .into());
    }
    if exercise.sets == 0 {
        return Err(ValidationError::InvalidValue {
            field: "sets".into(),
            message: "must be at least 1".into(),
        }
        .into());
    }
    Ok(())
}

fn row_to_exercise(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlannedExercise> {
    Ok(PlannedExercise {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        sets: row.get(3)?,
        reps: row.get(4)?,
        duration_seconds: row.get(5)?,
        rest_seconds: row.get(6)?,
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squat() -> NewExercise {
        NewExercise {
            name: "Squat".into(),
            sets: 3,
            reps: 12,
            duration_seconds: None,
            rest_seconds: 60,
        }
    }

    #[test]
    fn add_and_list_in_order() {
        let db = PlanDb::open_memory().unwrap();
        let a = db.add_exercise(&squat()).unwrap();
        let b = db
            .add_exercise(&NewExercise {
                name: "Plank".into(),
                duration_seconds: Some(45),
                ..squat()
            })
            .unwrap();
        assert_eq!(a.position, 0);
        assert_eq!(b.position, 1);

        let plan = db.current_exercises().unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].name, "Squat");
        assert_eq!(plan[1].duration_seconds, Some(45));
    }

    #[test]
    fn rejects_invalid_exercise() {
        let db = PlanDb::open_memory().unwrap();
        let blank = NewExercise {
            name: "  ".into(),
            ..squat()
        };
        assert!(db.add_exercise(&blank).is_err());
        let no_sets = NewExercise { sets: 0, ..squat() };
        assert!(db.add_exercise(&no_sets).is_err());
    }

    #[test]
    fn remove_and_clear() {
        let db = PlanDb::open_memory().unwrap();
        let a = db.add_exercise(&squat()).unwrap();
        db.add_exercise(&squat()).unwrap();
        assert!(db.remove_exercise(&a.id).unwrap());
        assert!(!db.remove_exercise(&a.id).unwrap());
        assert_eq!(db.clear_plan().unwrap(), 1);
        assert!(db.current_exercises().unwrap().is_empty());
    }

    #[test]
    fn record_completion_requires_known_exercise() {
        let db = PlanDb::open_memory().unwrap();
        let summary = RunSummary {
            exercise_name: "Ghost".into(),
            sets_performed: 1,
            set_count: 1,
            forced: false,
            completed_at: Utc::now(),
        };
        assert!(db.record_completion("missing", &summary).is_err());

        let a = db.add_exercise(&squat()).unwrap();
        let id = db.record_completion(&a.id, &summary).unwrap();
        let history = db.completions(10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, id);
        assert_eq!(history[0].exercise_id, a.id);
    }

    #[test]
    fn kv_roundtrip() {
        let db = PlanDb::open_memory().unwrap();
        assert_eq!(db.kv_get("k").unwrap(), None);
        db.kv_set("k", "v1").unwrap();
        db.kv_set("k", "v2").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v2"));
        db.kv_delete("k").unwrap();
        assert_eq!(db.kv_get("k").unwrap(), None);
    }
}
