use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Everything the interval timer reports back to its host.
/// Display, audio/haptics and persistence all consume this stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    /// The countdown reached the warning threshold. Advisory only.
    Warning {
        phase: Phase,
        current_set: u32,
        seconds_remaining: u32,
    },
    /// A tick that did not cross a phase boundary.
    Continuing { seconds_remaining: u32 },
    /// Work -> Rest or Rest -> Work.
    PhaseChanged {
        phase: Phase,
        current_set: u32,
        seconds_remaining: u32,
    },
    /// Terminal event, emitted once per run.
    RunCompleted {
        exercise: String,
        sets_performed: u32,
        set_count: u32,
        /// True when the user marked the exercise done early.
        forced: bool,
        at: DateTime<Utc>,
    },
}

/// Pulse kinds understood by a notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseKind {
    Warning,
    Complete,
}

impl TimerEvent {
    /// Which pulse, if any, this event should trigger.
    pub fn pulse(&self) -> Option<PulseKind> {
        match self {
            TimerEvent::Warning { .. } => Some(PulseKind::Warning),
            TimerEvent::PhaseChanged { .. } | TimerEvent::RunCompleted { .. } => {
                Some(PulseKind::Complete)
            }
            TimerEvent::Continuing { .. } => None,
        }
    }

    pub fn is_run_completed(&self) -> bool {
        matches!(self, TimerEvent::RunCompleted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_mapping() {
        let warning = TimerEvent::Warning {
            phase: Phase::Work,
            current_set: 1,
            seconds_remaining: 3,
        };
        assert_eq!(warning.pulse(), Some(PulseKind::Warning));

        let changed = TimerEvent::PhaseChanged {
            phase: Phase::Rest,
            current_set: 1,
            seconds_remaining: 60,
        };
        assert_eq!(changed.pulse(), Some(PulseKind::Complete));

        let tick = TimerEvent::Continuing {
            seconds_remaining: 9,
        };
        assert_eq!(tick.pulse(), None);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = TimerEvent::PhaseChanged {
            phase: Phase::Rest,
            current_set: 2,
            seconds_remaining: 5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase_changed");
        assert_eq!(json["phase"], "rest");
        assert_eq!(json["current_set"], 2);
    }
}
