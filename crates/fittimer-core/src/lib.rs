//! # fittimer Core Library
//!
//! Core logic for the fittimer workout interval timer. The CLI is a thin
//! shell over this crate; any other front end can drive the same engine.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a set/rest countdown state machine advanced by
//!   external `tick()` calls, one per second
//! - **Events**: the engine's only output; hosts route them to display,
//!   notifications and storage
//! - **Plan storage**: SQLite-backed workout plan and completion history
//! - **Session**: the host layer that walks a plan exercise by exercise
//!
//! ## Key Components
//!
//! - [`IntervalTimerEngine`]: core timer state machine
//! - [`WorkoutSession`]: plan-level host around the engine
//! - [`PlanDb`]: plan and history persistence
//! - [`Config`]: application configuration management
//! - [`NotificationDispatcher`]: event-to-pulse adapter

pub mod error;
pub mod events;
pub mod notify;
pub mod plan;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, TransitionError, ValidationError};
pub use events::{PulseKind, TimerEvent};
pub use notify::{NotificationDispatcher, NotificationSink, NotifyError};
pub use plan::{
    CompletionRecord, MemoryPlanStore, NewExercise, PlanDb, PlannedExercise, RunSummary,
    WorkoutPlanStore,
};
pub use session::WorkoutSession;
pub use storage::{Config, TimingConfig};
pub use timer::{
    EngineConfig, ExerciseSpec, IntervalTimerEngine, Phase, TickResult, TimerRunState,
    TimerSnapshot,
};
