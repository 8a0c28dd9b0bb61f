use clap::Subcommand;
use fittimer_core::{
    Config, IntervalTimerEngine, NotificationDispatcher, PlanDb, RunSummary, TimerEvent,
    WorkoutPlanStore,
};
use serde_json::json;

const ENGINE_KEY: &str = "timer_engine";
const EXERCISE_KEY: &str = "timer_exercise_id";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a fresh run of a planned exercise
    Start {
        /// Exercise ID (see `plan list`)
        exercise_id: String,
    },
    /// Advance the countdown
    Tick {
        /// Number of one-second ticks
        #[arg(long, default_value = "1")]
        count: u32,
    },
    /// Pause the countdown
    Pause,
    /// Resume the countdown
    Resume,
    /// End the current work phase and start resting
    SkipRest,
    /// End the current rest and start the next set
    NextSet,
    /// Mark the exercise done now
    Complete,
    /// Restart the current exercise from set 1
    Reset,
    /// Print current timer state as JSON
    Status,
}

fn load_engine(db: &PlanDb) -> Result<IntervalTimerEngine, Box<dyn std::error::Error>> {
    let json = db
        .kv_get(ENGINE_KEY)?
        .ok_or("no active timer; start one with `fittimer timer start <exercise-id>`")?;
    Ok(serde_json::from_str(&json)?)
}

fn save_engine(db: &PlanDb, engine: &IntervalTimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Pulse notifications and store the run if it just finished.
///
/// A run that cannot be stored is logged and dropped; the parked engine
/// has already moved on.
fn handle_events(db: &PlanDb, config: &Config, events: &[TimerEvent]) {
    NotificationDispatcher::from_config(config.notifications.clone()).dispatch(events);

    let Some(summary) = events.iter().find_map(RunSummary::from_event) else {
        return;
    };
    let exercise_id = match db.kv_get(EXERCISE_KEY) {
        Ok(Some(id)) => id,
        Ok(None) => {
            tracing::warn!("finished run has no exercise id; not recorded");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read exercise id; run not recorded");
            return;
        }
    };
    if let Err(e) = db.record_completion(&exercise_id, &summary) {
        tracing::warn!(error = %e, %exercise_id, "failed to record finished run");
    }
}

fn print_state(
    engine: &IntervalTimerEngine,
    events: &[TimerEvent],
) -> Result<(), Box<dyn std::error::Error>> {
    let output = json!({
        "events": events,
        "snapshot": engine.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn start_engine(
    db: &PlanDb,
    config: &Config,
    exercise_id: &str,
) -> Result<IntervalTimerEngine, Box<dyn std::error::Error>> {
    let exercise = db
        .get_exercise(exercise_id)?
        .ok_or_else(|| format!("no exercise with id '{exercise_id}'"))?;
    let mut engine = IntervalTimerEngine::new(config.timing.engine_config());
    engine.start(exercise.to_spec(&config.timing));
    db.kv_set(EXERCISE_KEY, &exercise.id)?;
    Ok(engine)
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;
    let config = Config::load_or_default();

    let mut engine = match &action {
        TimerAction::Start { exercise_id } => start_engine(&db, &config, exercise_id)?,
        _ => load_engine(&db)?,
    };

    let events: Vec<TimerEvent> = match action {
        TimerAction::Start { .. } | TimerAction::Status => Vec::new(),
        TimerAction::Tick { count } => {
            let mut events = Vec::new();
            for _ in 0..count {
                let result = engine.tick();
                if result.is_unchanged() {
                    break;
                }
                events.extend(result.into_events());
            }
            events
        }
        TimerAction::Pause => {
            engine.pause();
            Vec::new()
        }
        TimerAction::Resume => {
            engine.resume();
            Vec::new()
        }
        TimerAction::SkipRest => vec![engine.skip_to_rest()?],
        TimerAction::NextSet => vec![engine.skip_to_next_set()?],
        TimerAction::Complete => engine.force_complete().into_iter().collect(),
        TimerAction::Reset => {
            let spec = engine.spec().cloned().ok_or("no exercise has been started")?;
            engine.reset(spec);
            Vec::new()
        }
    };

    save_engine(&db, &engine)?;
    handle_events(&db, &config, &events);
    print_state(&engine, &events)
}
