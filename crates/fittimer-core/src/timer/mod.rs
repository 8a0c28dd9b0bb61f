mod engine;
mod spec;

pub use engine::{
    EngineConfig, IntervalTimerEngine, Phase, TickResult, TimerRunState, TimerSnapshot,
};
pub use spec::{work_seconds_for_reps, ExerciseSpec, DEFAULT_SECONDS_PER_REP};
