use serde::{Deserialize, Serialize};

/// Seconds of work assumed per repetition when an exercise is not timed.
pub const DEFAULT_SECONDS_PER_REP: f64 = 2.5;

/// Work duration for a rep-based exercise, rounded up to whole seconds.
///
/// Negative or non-finite factors count as zero.
pub fn work_seconds_for_reps(reps: u32, seconds_per_rep: f64) -> u32 {
    if !seconds_per_rep.is_finite() || seconds_per_rep <= 0.0 {
        return 0;
    }
    let secs = (reps as f64 * seconds_per_rep).ceil();
    if secs >= u32::MAX as f64 {
        u32::MAX
    } else {
        secs as u32
    }
}

/// Immutable input to a single timer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSpec {
    pub name: String,
    /// Number of sets. Zero is floored to one when the run starts.
    pub set_count: u32,
    /// Active phase length per set, in seconds.
    pub work_seconds: u32,
    /// Rest phase length between sets, in seconds.
    pub rest_seconds: u32,
}

impl ExerciseSpec {
    pub fn new(name: impl Into<String>, set_count: u32, work_seconds: u32, rest_seconds: u32) -> Self {
        Self {
            name: name.into(),
            set_count,
            work_seconds,
            rest_seconds,
        }
    }

    /// Build a spec for a rep-based exercise, deriving the work phase from
    /// `reps × seconds_per_rep`.
    pub fn from_reps(
        name: impl Into<String>,
        set_count: u32,
        reps: u32,
        rest_seconds: u32,
        seconds_per_rep: f64,
    ) -> Self {
        Self::new(
            name,
            set_count,
            work_seconds_for_reps(reps, seconds_per_rep),
            rest_seconds,
        )
    }

    /// Copy with `set_count` floored to 1 and a zero work phase replaced by
    /// `default_work_secs`.
    pub fn normalized(&self, default_work_secs: u32) -> Self {
        Self {
            name: self.name.clone(),
            set_count: self.set_count.max(1),
            work_seconds: if self.work_seconds == 0 {
                default_work_secs
            } else {
                self.work_seconds
            },
            rest_seconds: self.rest_seconds,
        }
    }

    /// Total seconds of a full natural run (no trailing rest after the last set).
    pub fn total_seconds(&self) -> u64 {
        let sets = self.set_count.max(1) as u64;
        sets * self.work_seconds as u64 + (sets - 1) * self.rest_seconds as u64
    }
}
