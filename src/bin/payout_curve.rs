//! Sweep one count input of a role and write the payout curve as CSV
//!
//! One row per input value, one column per payout line plus the total.

use anyhow::{bail, Context, Result};
use clap::Parser;
use incentive_engine::{RuleTable, ScenarioRunner};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "payout_curve", about = "Write a role's payout curve over one count input")]
struct Args {
    /// Role id or title
    #[arg(long)]
    role: String,
    /// Count input to vary
    #[arg(long)]
    input: String,
    #[arg(long, default_value_t = 0)]
    from: i64,
    #[arg(long, default_value_t = 100)]
    to: i64,
    /// Fixed input assignment `key=value` for every point
    #[arg(long = "set", value_name = "KEY=VALUE")]
    assignments: Vec<String>,
    /// Directory with goal CSV files
    #[arg(long)]
    goals_dir: Option<PathBuf>,
    #[arg(long, default_value = "payout_curve.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.from > args.to {
        bail!("--from {} is greater than --to {}", args.from, args.to);
    }

    let table = RuleTable::load_configured(args.goals_dir.as_deref())?;
    let role = table.get(&args.role)?.clone();
    let mut base = role.default_inputs();
    for assignment in &args.assignments {
        base.assign(&role.inputs, assignment)
            .with_context(|| format!("applying --set {}", assignment))?;
    }

    let runner = ScenarioRunner::with_table(table);
    let start = Instant::now();
    let points = runner.sweep_from(role.id, &base, &args.input, args.from..=args.to)?;
    log::info!("Evaluated {} points in {:?}", points.len(), start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let mut header = vec![args.input.clone()];
    if let Some(first) = points.first() {
        header.extend(first.evaluation.result.lines().iter().map(|line| line.name.clone()));
    }
    header.push("Total".to_string());
    header.push("Eligible".to_string());
    writer.write_record(&header)?;

    for point in &points {
        let mut row = vec![point.value.to_string()];
        row.extend(point.evaluation.result.lines().iter().map(|line| format!("{:.2}", line.amount)));
        row.push(format!("{:.2}", point.evaluation.total()));
        row.push(point.evaluation.eligible.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;

    println!(
        "{} ({}) over {} = {}..={}: {} rows written to {}",
        role.title,
        role.currency,
        args.input,
        args.from,
        args.to,
        points.len(),
        args.output.display()
    );
    Ok(())
}
