//! Interval timer engine.
//!
//! Drives one exercise through its sets, alternating Work and Rest phases.
//! The engine owns no clock and no threads - the host calls `tick()` once per
//! elapsed second and forwards the returned events to display, audio and
//! storage.
//!
//! ## State Transitions
//!
//! ```text
//! start -> Work(1) -> Rest(1) -> Work(2) -> ... -> Work(n) -> Completed
//! ```
//!
//! The final set is never followed by a Rest phase.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = IntervalTimerEngine::new(EngineConfig::default());
//! engine.start(spec);
//! // Once per second:
//! let result = engine.tick();
//! for event in result.events() { /* ... */ }
//! ```

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::spec::ExerciseSpec;
use crate::error::TransitionError;
use crate::events::TimerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Work => f.write_str("work"),
            Phase::Rest => f.write_str("rest"),
        }
    }
}

/// Mutable state of one run. Owned exclusively by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRunState {
    pub phase: Phase,
    /// 1-indexed, never exceeds the spec's set count.
    pub current_set: u32,
    pub seconds_remaining: u32,
    pub running: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Emit a `Warning` when a countdown reaches this many seconds. 0 disables.
    pub warning_threshold_secs: u32,
    /// Work phase length used when a spec carries `work_seconds == 0`.
    pub default_work_secs: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            warning_threshold_secs: 3,
            default_work_secs: 30,
        }
    }
}

/// Outcome of a single `tick()`.
///
/// An empty event list means the tick was a no-op (paused, completed or
/// never started).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickResult {
    events: Vec<TimerEvent>,
}

impl TickResult {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn is_unchanged(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[TimerEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TimerEvent> {
        self.events
    }

    pub fn warned(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TimerEvent::Warning { .. }))
    }

    /// The phase entered on this tick, if any.
    pub fn phase_changed(&self) -> Option<Phase> {
        self.events.iter().find_map(|e| match e {
            TimerEvent::PhaseChanged { phase, .. } => Some(*phase),
            _ => None,
        })
    }

    pub fn completed(&self) -> bool {
        self.events.iter().any(TimerEvent::is_run_completed)
    }
}

/// Display-oriented view of the current run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub exercise: String,
    pub phase: Phase,
    pub current_set: u32,
    pub set_count: u32,
    pub seconds_remaining: u32,
    pub phase_total_secs: u32,
    pub running: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Run {
    /// Normalized at start; `set_count >= 1` and `work_seconds` filled in.
    spec: ExerciseSpec,
    state: TimerRunState,
}

impl Run {
    fn new(spec: ExerciseSpec) -> Self {
        let state = TimerRunState {
            phase: Phase::Work,
            current_set: 1,
            seconds_remaining: spec.work_seconds,
            running: true,
            completed: false,
        };
        Self { spec, state }
    }

    fn is_last_set(&self) -> bool {
        self.state.current_set >= self.spec.set_count
    }

    fn enter_rest(&mut self) -> TimerEvent {
        self.state.phase = Phase::Rest;
        self.state.seconds_remaining = self.spec.rest_seconds;
        tracing::debug!(
            exercise = %self.spec.name,
            set = self.state.current_set,
            "entering rest"
        );
        self.phase_changed()
    }

    fn enter_next_set(&mut self) -> TimerEvent {
        self.state.current_set += 1;
        self.state.phase = Phase::Work;
        self.state.seconds_remaining = self.spec.work_seconds;
        tracing::debug!(
            exercise = %self.spec.name,
            set = self.state.current_set,
            "starting next set"
        );
        self.phase_changed()
    }

    fn complete(&mut self, forced: bool) -> TimerEvent {
        let sets_performed = self.sets_performed();
        self.state.running = false;
        self.state.completed = true;
        tracing::debug!(exercise = %self.spec.name, sets_performed, forced, "run completed");
        TimerEvent::RunCompleted {
            exercise: self.spec.name.clone(),
            sets_performed,
            set_count: self.spec.set_count,
            forced,
            at: Utc::now(),
        }
    }

    /// Countdown hit zero.
    fn expire(&mut self) -> TimerEvent {
        match self.state.phase {
            Phase::Work if self.is_last_set() => self.complete(false),
            Phase::Work => self.enter_rest(),
            // A restored rest on the last set must not push past set_count.
            Phase::Rest if self.is_last_set() => self.complete(false),
            Phase::Rest => self.enter_next_set(),
        }
    }

    /// Work phases finished so far.
    fn sets_performed(&self) -> u32 {
        if self.state.completed {
            return self.spec.set_count;
        }
        match self.state.phase {
            Phase::Work => self.state.current_set.saturating_sub(1),
            Phase::Rest => self.state.current_set,
        }
    }

    fn phase_total_secs(&self) -> u32 {
        match self.state.phase {
            Phase::Work => self.spec.work_seconds,
            Phase::Rest => self.spec.rest_seconds,
        }
    }

    fn phase_changed(&self) -> TimerEvent {
        TimerEvent::PhaseChanged {
            phase: self.state.phase,
            current_set: self.state.current_set,
            seconds_remaining: self.state.seconds_remaining,
        }
    }
}

/// Work/rest countdown across the sets of one exercise.
///
/// Serializable so a stateless host can park it between invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervalTimerEngine {
    #[serde(default)]
    config: EngineConfig,
    #[serde(default)]
    run: Option<Run>,
}

impl IntervalTimerEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, run: None }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `None` until `start()` has been called.
    pub fn state(&self) -> Option<&TimerRunState> {
        self.run.as_ref().map(|r| &r.state)
    }

    /// The normalized spec of the current run.
    pub fn spec(&self) -> Option<&ExerciseSpec> {
        self.run.as_ref().map(|r| &r.spec)
    }

    pub fn is_completed(&self) -> bool {
        self.state().is_some_and(|s| s.completed)
    }

    pub fn sets_performed(&self) -> u32 {
        self.run.as_ref().map(Run::sets_performed).unwrap_or(0)
    }

    pub fn phase_total_secs(&self) -> u32 {
        self.run.as_ref().map(Run::phase_total_secs).unwrap_or(0)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let Some(run) = self.run.as_ref() else {
            return 0.0;
        };
        if run.state.completed {
            return 1.0;
        }
        let total = run.phase_total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (run.state.seconds_remaining as f64 / total as f64)
    }

    pub fn snapshot(&self) -> Option<TimerSnapshot> {
        let run = self.run.as_ref()?;
        Some(TimerSnapshot {
            exercise: run.spec.name.clone(),
            phase: run.state.phase,
            current_set: run.state.current_set,
            set_count: run.spec.set_count,
            seconds_remaining: run.state.seconds_remaining,
            phase_total_secs: run.phase_total_secs(),
            running: run.state.running,
            completed: run.state.completed,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run, discarding any previous progress.
    pub fn start(&mut self, spec: ExerciseSpec) -> TimerRunState {
        if spec.set_count == 0 {
            tracing::debug!(exercise = %spec.name, "set count of 0 floored to 1");
        }
        let run = Run::new(spec.normalized(self.config.default_work_secs));
        let state = run.state.clone();
        tracing::debug!(
            exercise = %run.spec.name,
            sets = run.spec.set_count,
            work_secs = run.spec.work_seconds,
            rest_secs = run.spec.rest_seconds,
            "timer started"
        );
        self.run = Some(run);
        state
    }

    /// Same as `start()`.
    pub fn reset(&mut self, spec: ExerciseSpec) -> TimerRunState {
        self.start(spec)
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickResult {
        let warning_at = self.config.warning_threshold_secs;
        let Some(run) = self.run.as_mut() else {
            return TickResult::unchanged();
        };
        if !run.state.running || run.state.completed {
            return TickResult::unchanged();
        }

        run.state.seconds_remaining = run.state.seconds_remaining.saturating_sub(1);
        let remaining = run.state.seconds_remaining;

        let mut events = Vec::with_capacity(2);
        if warning_at > 0 && remaining == warning_at {
            events.push(TimerEvent::Warning {
                phase: run.state.phase,
                current_set: run.state.current_set,
                seconds_remaining: remaining,
            });
        }

        if remaining > 0 {
            events.push(TimerEvent::Continuing {
                seconds_remaining: remaining,
            });
        } else {
            events.push(run.expire());
        }
        TickResult { events }
    }

    /// Stop ticking. Returns whether anything changed.
    pub fn pause(&mut self) -> bool {
        match self.run.as_mut() {
            Some(run) if run.state.running && !run.state.completed => {
                run.state.running = false;
                true
            }
            _ => false,
        }
    }

    /// Continue ticking. Returns whether anything changed.
    pub fn resume(&mut self) -> bool {
        match self.run.as_mut() {
            Some(run) if !run.state.running && !run.state.completed => {
                run.state.running = true;
                true
            }
            _ => false,
        }
    }

    /// End the current Work phase early and start resting.
    ///
    /// # Errors
    /// Rejected outside a Work phase, on the final set, or when the run is
    /// finished. The state is left unchanged.
    pub fn skip_to_rest(&mut self) -> Result<TimerEvent, TransitionError> {
        let run = self.active_run_mut()?;
        if run.state.phase != Phase::Work {
            return Err(TransitionError::WrongPhase {
                operation: "skip_to_rest",
                phase: run.state.phase,
            });
        }
        if run.is_last_set() {
            return Err(TransitionError::NoRestAfterFinalSet);
        }
        Ok(run.enter_rest())
    }

    /// End the current Rest phase early and start the next set.
    ///
    /// # Errors
    /// Rejected outside a Rest phase, when there is no next set, or when the
    /// run is finished. The state is left unchanged.
    pub fn skip_to_next_set(&mut self) -> Result<TimerEvent, TransitionError> {
        let run = self.active_run_mut()?;
        if run.state.phase != Phase::Rest {
            return Err(TransitionError::WrongPhase {
                operation: "skip_to_next_set",
                phase: run.state.phase,
            });
        }
        if run.is_last_set() {
            return Err(TransitionError::NoNextSet {
                current_set: run.state.current_set,
                set_count: run.spec.set_count,
            });
        }
        Ok(run.enter_next_set())
    }

    /// Mark the run done immediately.
    ///
    /// Returns `None` when there is no run or it already completed, so
    /// `RunCompleted` is emitted at most once per run.
    pub fn force_complete(&mut self) -> Option<TimerEvent> {
        let run = self.run.as_mut()?;
        if run.state.completed {
            return None;
        }
        Some(run.complete(true))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn active_run_mut(&mut self) -> Result<&mut Run, TransitionError> {
        let run = self.run.as_mut().ok_or(TransitionError::NotStarted)?;
        if run.state.completed {
            return Err(TransitionError::Completed);
        }
        Ok(run)
    }
}
