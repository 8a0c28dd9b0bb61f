use clap::Args;
use fittimer_core::PlanDb;

#[derive(Args)]
pub struct HistoryArgs {
    /// Number of records to show
    #[arg(long, default_value = "20")]
    limit: usize,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;
    let records = db.completions(args.limit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("no completed exercises yet");
        return Ok(());
    }
    for record in &records {
        let forced = if record.forced { "  (ended early)" } else { "" };
        println!(
            "{}  {}  {}/{} sets{forced}",
            record.completed_at.format("%Y-%m-%d %H:%M"),
            record.exercise_name,
            record.sets_performed,
            record.set_count,
        );
    }
    Ok(())
}
