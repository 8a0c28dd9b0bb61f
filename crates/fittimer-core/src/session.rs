//! Workout session host.
//!
//! Walks the plan one exercise at a time, owning exactly one
//! [`IntervalTimerEngine`]. Switching exercises discards the engine instead
//! of pausing it. Events from the engine go to the notification dispatcher,
//! and a finished run is written back to the plan store once.

use crate::error::{Result, ValidationError};
use crate::events::TimerEvent;
use crate::notify::NotificationDispatcher;
use crate::plan::{PlannedExercise, RunSummary, WorkoutPlanStore};
use crate::storage::TimingConfig;
use crate::timer::{IntervalTimerEngine, TickResult, TimerRunState};

pub struct WorkoutSession<S: WorkoutPlanStore> {
    store: S,
    timing: TimingConfig,
    dispatcher: NotificationDispatcher,
    exercises: Vec<PlannedExercise>,
    index: usize,
    engine: IntervalTimerEngine,
    /// Completion id of the current run once it has been stored.
    recorded: Option<i64>,
}

impl<S: WorkoutPlanStore> WorkoutSession<S> {
    /// Read the plan and start its first exercise.
    ///
    /// # Errors
    /// Fails if the store cannot be read or the plan is empty.
    pub fn load(store: S, timing: TimingConfig, dispatcher: NotificationDispatcher) -> Result<Self> {
        let exercises = store.current_exercises()?;
        if exercises.is_empty() {
            return Err(ValidationError::EmptyCollection("workout plan".into()).into());
        }
        let engine = IntervalTimerEngine::new(timing.engine_config());
        let mut session = Self {
            store,
            timing,
            dispatcher,
            exercises,
            index: 0,
            engine,
            recorded: None,
        };
        session.select(0)?;
        Ok(session)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &IntervalTimerEngine {
        &self.engine
    }

    pub fn exercises(&self) -> &[PlannedExercise] {
        &self.exercises
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_exercise(&self) -> &PlannedExercise {
        &self.exercises[self.index]
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last exercise of the plan has completed.
    pub fn is_finished(&self) -> bool {
        self.index + 1 == self.exercises.len() && self.engine.is_completed()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Discard the current run and start the exercise at `index`.
    ///
    /// # Errors
    /// Fails if `index` is outside the plan.
    pub fn select(&mut self, index: usize) -> Result<TimerRunState> {
        let exercise = self
            .exercises
            .get(index)
            .ok_or_else(|| ValidationError::OutOfBounds {
                collection: "workout plan".into(),
                index,
                len: self.exercises.len(),
            })?;
        let spec = exercise.to_spec(&self.timing);
        tracing::info!(index, exercise = %exercise.name, "exercise selected");

        self.engine = IntervalTimerEngine::new(self.timing.engine_config());
        self.index = index;
        self.recorded = None;
        Ok(self.engine.start(spec))
    }

    /// Move to the next exercise. Returns `false` when the plan is done.
    ///
    /// An unfinished run is dropped without being recorded.
    pub fn advance(&mut self) -> Result<bool> {
        if self.index + 1 >= self.exercises.len() {
            return Ok(false);
        }
        self.select(self.index + 1)?;
        Ok(true)
    }

    /// Restart the current exercise from set 1.
    pub fn reset(&mut self) -> TimerRunState {
        let spec = self.current_exercise().to_spec(&self.timing);
        self.recorded = None;
        self.engine.reset(spec)
    }

    /// Tick the engine once and handle its events.
    pub fn tick(&mut self) -> TickResult {
        let result = self.engine.tick();
        self.handle(result.events());
        result
    }

    pub fn pause(&mut self) -> bool {
        self.engine.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.engine.resume()
    }

    pub fn skip_to_rest(&mut self) -> Result<TimerEvent> {
        let event = self.engine.skip_to_rest()?;
        self.handle(std::slice::from_ref(&event));
        Ok(event)
    }

    pub fn skip_to_next_set(&mut self) -> Result<TimerEvent> {
        let event = self.engine.skip_to_next_set()?;
        self.handle(std::slice::from_ref(&event));
        Ok(event)
    }

    /// Mark the current exercise done and record it.
    pub fn force_complete(&mut self) -> Option<TimerEvent> {
        let event = self.engine.force_complete()?;
        self.handle(std::slice::from_ref(&event));
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Store failures are logged; the engine keeps its progress either way.
    fn handle(&mut self, events: &[TimerEvent]) {
        self.dispatcher.dispatch(events);

        if self.recorded.is_some() {
            return;
        }
        let Some(summary) = events.iter().find_map(RunSummary::from_event) else {
            return;
        };
        let exercise_id = &self.exercises[self.index].id;
        match self.store.record_completion(exercise_id, &summary) {
            Ok(id) => self.recorded = Some(id),
            Err(e) => {
                tracing::warn!(error = %e, %exercise_id, "failed to record finished run");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::MemoryPlanStore;
    use crate::timer::Phase;

    fn timing() -> TimingConfig {
        TimingConfig {
            seconds_per_rep: 1.0,
            ..TimingConfig::default()
        }
    }

    fn session(items: &[(&'static str, u32, u32, u32)]) -> WorkoutSession<MemoryPlanStore> {
        let store = MemoryPlanStore::with_exercises(items.iter().copied()).unwrap();
        WorkoutSession::load(store, timing(), NotificationDispatcher::silent()).unwrap()
    }

    #[test]
    fn empty_plan_is_rejected() {
        let result = WorkoutSession::load(
            MemoryPlanStore::new(),
            timing(),
            NotificationDispatcher::silent(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn natural_completion_is_recorded_once() {
        let mut s = session(&[("Squat", 2, 3, 2)]);
        let mut completed = 0;
        for _ in 0..20 {
            if s.tick().completed() {
                completed += 1;
            }
        }
        assert_eq!(completed, 1);
        assert!(s.is_finished());
        assert!(s.force_complete().is_none());

        let history = s.store().completions();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sets_performed, 2);
        assert!(!history[0].forced);
    }

    #[test]
    fn select_discards_previous_engine() {
        let mut s = session(&[("Squat", 3, 10, 5), ("Row", 2, 4, 5)]);
        s.tick();
        s.pause();
        let state = s.select(1).unwrap();
        assert!(state.running);
        assert_eq!(state.seconds_remaining, 4);
        assert_eq!(s.current_exercise().name, "Row");
        assert!(s.select(5).is_err());
    }

    #[test]
    fn advance_walks_the_plan() {
        let mut s = session(&[("Squat", 1, 2, 0), ("Row", 1, 2, 0)]);
        assert!(s.advance().unwrap());
        assert_eq!(s.index(), 1);
        assert!(!s.advance().unwrap());
    }

    #[test]
    fn forced_completion_records_partial_sets() {
        let mut s = session(&[("Squat", 4, 2, 2)]);
        s.tick();
        s.tick();
        assert_eq!(s.engine().state().unwrap().phase, Phase::Rest);
        s.force_complete();
        let history = s.store().completions();
        assert_eq!(history[0].sets_performed, 1);
        assert_eq!(history[0].set_count, 4);
        assert!(history[0].forced);
    }

    #[test]
    fn rejected_skip_propagates() {
        let mut s = session(&[("Squat", 1, 5, 0)]);
        assert!(s.skip_to_next_set().is_err());
        assert!(s.skip_to_rest().is_err());
        assert_eq!(s.engine().state().unwrap().seconds_remaining, 5);
    }
}
