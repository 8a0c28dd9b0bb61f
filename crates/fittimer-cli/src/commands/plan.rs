use clap::Subcommand;
use fittimer_core::{Config, NewExercise, PlanDb, PlannedExercise, WorkoutPlanStore};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Append an exercise to the plan
    Add {
        /// Exercise name
        name: String,
        /// Number of sets (default from config)
        #[arg(long)]
        sets: Option<u32>,
        /// Reps per set; work time is derived from reps (default from config)
        #[arg(long)]
        reps: Option<u32>,
        /// Fixed work time per set in seconds, instead of reps
        #[arg(long)]
        duration: Option<u32>,
        /// Rest between sets in seconds (default from config)
        #[arg(long)]
        rest: Option<u32>,
    },
    /// List the plan in order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an exercise from the plan
    Remove {
        /// Exercise ID
        id: String,
    },
    /// Remove every exercise (history is kept)
    Clear,
}

fn describe(exercise: &PlannedExercise) -> String {
    let work = match exercise.duration_seconds {
        Some(secs) => format!("{secs}s"),
        None => format!("{} reps", exercise.reps),
    };
    format!(
        "{}. {}  {} x {}  rest {}s  [{}]",
        exercise.position + 1,
        exercise.name,
        exercise.sets,
        work,
        exercise.rest_seconds,
        exercise.id
    )
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        PlanAction::Add {
            name,
            sets,
            reps,
            duration,
            rest,
        } => {
            let config = Config::load_or_default();
            let defaults = NewExercise::with_defaults(name, &config.timing);
            let exercise = NewExercise {
                sets: sets.unwrap_or(defaults.sets),
                reps: reps.unwrap_or(defaults.reps),
                duration_seconds: duration,
                rest_seconds: rest.unwrap_or(defaults.rest_seconds),
                ..defaults
            };
            let planned = db.add_exercise(&exercise)?;
            println!("{}", serde_json::to_string_pretty(&planned)?);
        }
        PlanAction::List { json } => {
            let exercises = db.current_exercises()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&exercises)?);
            } else if exercises.is_empty() {
                println!("plan is empty");
            } else {
                for exercise in &exercises {
                    println!("{}", describe(exercise));
                }
            }
        }
        PlanAction::Remove { id } => {
            if !db.remove_exercise(&id)? {
                return Err(format!("no exercise with id '{id}'").into());
            }
            println!("removed {id}");
        }
        PlanAction::Clear => {
            let n = db.clear_plan()?;
            println!("removed {n} exercise(s)");
        }
    }
    Ok(())
}
