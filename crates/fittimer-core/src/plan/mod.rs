//! Workout plan storage.
//!
//! The timer engine never persists anything itself. Its host reads the
//! ordered exercise list from a [`WorkoutPlanStore`] and writes a completion
//! record back when a run finishes.

mod db;
mod memory;

pub use db::PlanDb;
pub use memory::MemoryPlanStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::TimerEvent;
use crate::storage::TimingConfig;
use crate::timer::ExerciseSpec;

/// One exercise in the user's current plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub id: String,
    pub name: String,
    /// 0-based order within the plan.
    pub position: u32,
    pub sets: u32,
    pub reps: u32,
    /// Explicit work duration for timed exercises (planks, holds).
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    pub rest_seconds: u32,
}

/// Input for adding an exercise to the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub duration_seconds: Option<u32>,
    pub rest_seconds: u32,
}

impl NewExercise {
    /// A rep-based exercise using the configured defaults.
    pub fn with_defaults(name: impl Into<String>, timing: &TimingConfig) -> Self {
        Self {
            name: name.into(),
            sets: timing.default_sets,
            reps: timing.default_reps,
            duration_seconds: None,
            rest_seconds: timing.default_rest_secs,
        }
    }
}

impl PlannedExercise {
    /// Timer input for this exercise. Timed exercises use their duration,
    /// rep-based ones derive it from `reps × seconds_per_rep`.
    pub fn to_spec(&self, timing: &TimingConfig) -> ExerciseSpec {
        match self.duration_seconds {
            Some(secs) => ExerciseSpec::new(&self.name, self.sets, secs, self.rest_seconds),
            None => ExerciseSpec::from_reps(
                &self.name,
                self.sets,
                self.reps,
                self.rest_seconds,
                timing.seconds_per_rep,
            ),
        }
    }
}

/// What the host persists when a run finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub exercise_name: String,
    pub sets_performed: u32,
    pub set_count: u32,
    pub forced: bool,
    pub completed_at: DateTime<Utc>,
}

impl RunSummary {
    /// Summary carried by a `RunCompleted` event; `None` for any other event.
    pub fn from_event(event: &TimerEvent) -> Option<Self> {
        match event {
            TimerEvent::RunCompleted {
                exercise,
                sets_performed,
                set_count,
                forced,
                at,
            } => Some(Self {
                exercise_name: exercise.clone(),
                sets_performed: *sets_performed,
                set_count: *set_count,
                forced: *forced,
                completed_at: *at,
            }),
            _ => None,
        }
    }
}

/// A stored completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: i64,
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets_performed: u32,
    pub set_count: u32,
    pub forced: bool,
    pub completed_at: DateTime<Utc>,
}

/// Source of the current plan and sink for completed runs.
pub trait WorkoutPlanStore {
    /// Exercises in plan order.
    fn current_exercises(&self) -> Result<Vec<PlannedExercise>>;

    /// Record a finished run. Returns the new record id.
    ///
    /// # Errors
    /// Fails with a validation error if `exercise_id` is not in the plan.
    fn record_completion(&self, exercise_id: &str, summary: &RunSummary) -> Result<i64>;
}
