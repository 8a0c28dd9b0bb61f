use std::time::Duration;

use clap::Args;
use fittimer_core::{
    Config, NotificationDispatcher, PlanDb, TickResult, TimerEvent, WorkoutPlanStore,
    WorkoutSession,
};
use tokio::time::MissedTickBehavior;

use super::status_line;

#[derive(Args)]
pub struct RunArgs {
    /// Start at this plan position (1-based)
    #[arg(
        long,
        default_value = "1",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    from: usize,
    /// Tick period in milliseconds (default from config)
    #[arg(long)]
    tick_ms: Option<u64>,
}

enum Outcome {
    Finished,
    Interrupted,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = PlanDb::open()?;
    let dispatcher = NotificationDispatcher::from_config(config.notifications.clone());
    let mut session = WorkoutSession::load(db, config.timing.clone(), dispatcher)?;
    if args.from > 1 {
        session.select(args.from - 1)?;
    }

    let period = Duration::from_millis(args.tick_ms.unwrap_or(config.driver.tick_interval_ms).max(1));
    tracing::info!(?period, exercises = session.exercises().len(), "starting workout");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    match runtime.block_on(drive(&mut session, period))? {
        Outcome::Finished => println!("workout complete"),
        Outcome::Interrupted => println!("workout stopped; current exercise not recorded"),
    }
    Ok(())
}

/// Tick the session on a fixed period until the plan is done or Ctrl-C.
async fn drive<S: WorkoutPlanStore>(
    session: &mut WorkoutSession<S>,
    period: Duration,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    print_current(session);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let result = session.tick();
                render(session, &result);
                if result.completed() {
                    if !session.advance()? {
                        return Ok(Outcome::Finished);
                    }
                    print_current(session);
                }
            }
            _ = &mut ctrl_c => {
                return Ok(Outcome::Interrupted);
            }
        }
    }
}

fn print_current<S: WorkoutPlanStore>(session: &WorkoutSession<S>) {
    let exercise = session.current_exercise();
    println!(
        "== {} ({}/{})",
        exercise.name,
        session.index() + 1,
        session.exercises().len()
    );
    if let Some(snapshot) = session.engine().snapshot() {
        println!("{}", status_line(&snapshot));
    }
}

fn render<S: WorkoutPlanStore>(session: &WorkoutSession<S>, result: &TickResult) {
    for event in result.events() {
        match event {
            TimerEvent::PhaseChanged { phase, current_set, .. } => {
                println!("-> {phase} (set {current_set})");
            }
            TimerEvent::RunCompleted {
                exercise,
                sets_performed,
                set_count,
                ..
            } => {
                println!("-> {exercise} done, {sets_performed}/{set_count} sets");
                return;
            }
            TimerEvent::Warning { .. } | TimerEvent::Continuing { .. } => {}
        }
    }
    if let Some(snapshot) = session.engine().snapshot() {
        println!("{}", status_line(&snapshot));
    }
}
