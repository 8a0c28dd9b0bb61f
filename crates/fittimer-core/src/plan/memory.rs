use std::cell::RefCell;

use super::db::validate;
use super::{CompletionRecord, NewExercise, PlannedExercise, RunSummary, WorkoutPlanStore};
use crate::error::{Result, ValidationError};

/// Plan store held entirely in memory. Used by hosts without a database
/// and by tests.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    exercises: RefCell<Vec<PlannedExercise>>,
    completions: RefCell<Vec<CompletionRecord>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(name, sets, reps, rest_seconds)` tuples.
    pub fn with_exercises<'a>(items: impl IntoIterator<Item = (&'a str, u32, u32, u32)>) -> Result<Self> {
        let store = Self::new();
        for (name, sets, reps, rest_seconds) in items {
            store.add_exercise(&NewExercise {
                name: name.to_string(),
                sets,
                reps,
                duration_seconds: None,
                rest_seconds,
            })?;
        }
        Ok(store)
    }

    pub fn add_exercise(&self, exercise: &NewExercise) -> Result<PlannedExercise> {
        validate(exercise)?;
        let mut exercises = self.exercises.borrow_mut();
        let position = exercises.iter().map(|e| e.position + 1).max().unwrap_or(0);
        let planned = PlannedExercise {
            id: uuid::Uuid::new_v4().to_string(),
            name: exercise.name.trim().to_string(),
            position,
            sets: exercise.sets,
            reps: exercise.reps,
            duration_seconds: exercise.duration_seconds,
            rest_seconds: exercise.rest_seconds,
        };
        exercises.push(planned.clone());
        Ok(planned)
    }

    pub fn completions(&self) -> Vec<CompletionRecord> {
        self.completions.borrow().clone()
    }
}

impl WorkoutPlanStore for MemoryPlanStore {
    fn current_exercises(&self) -> Result<Vec<PlannedExercise>> {
        let mut exercises = self.exercises.borrow().clone();
        exercises.sort_by_key(|e| e.position);
        Ok(exercises)
    }

    fn record_completion(&self, exercise_id: &str, summary: &RunSummary) -> Result<i64> {
        if !self.exercises.borrow().iter().any(|e| e.id == exercise_id) {
            return Err(ValidationError::NotFound {
                kind: "exercise".into(),
                id: exercise_id.to_string(),
            }
            .into());
        }
        let mut completions = self.completions.borrow_mut();
        let id = completions.len() as i64 + 1;
        completions.push(CompletionRecord {
            id,
            exercise_id: exercise_id.to_string(),
            exercise_name: summary.exercise_name.clone(),
            sets_performed: summary.sets_performed,
            set_count: summary.set_count,
            forced: summary.forced,
            completed_at: summary.completed_at,
        });
        Ok(id)
    }
}
