pub mod config;
pub mod history;
pub mod plan;
pub mod run;
pub mod timer;

use fittimer_core::{Phase, TimerSnapshot};

/// `mm:ss`, or `h:mm:ss` past an hour.
pub fn format_clock(secs: u32) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// One status line for a running exercise.
pub fn status_line(snapshot: &TimerSnapshot) -> String {
    if snapshot.completed {
        return format!("{}  done", snapshot.exercise);
    }
    let phase = match snapshot.phase {
        Phase::Work => "WORK",
        Phase::Rest => "REST",
    };
    let paused = if snapshot.running { "" } else { "  (paused)" };
    format!(
        "{}  set {}/{}  {phase}  {}{paused}",
        snapshot.exercise,
        snapshot.current_set,
        snapshot.set_count,
        format_clock(snapshot.seconds_remaining),
    )
}
