//! Incentive Engine CLI
//!
//! Command-line interface for evaluating role payouts, consultant quarters
//! and historical payroll reports

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use incentive_engine::history::{self, HistoryQuery};
use incentive_engine::{
    evaluate, Evaluation, InputSet, QuarterlyAggregate, QuarterlyAggregator, QuotaFlags, RoleDefinition, RuleTable,
};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "incentive_engine",
    about = "Evaluate variable compensation by role and browse payroll history",
    version
)]
struct Cli {
    /// Directory with goal CSV files (defaults to $INCENTIVE_GOALS_DIR, then data/goals)
    #[arg(long, global = true)]
    goals_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every role and its inputs
    Roles {
        #[arg(long)]
        json: bool,
    },
    /// Evaluate one role for one month
    Evaluate(EvaluateArgs),
    /// Aggregate three months of a consultant role into a quarter
    Quarterly(QuarterlyArgs),
    /// Browse the historical payroll export
    History(HistoryArgs),
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Role id or title
    #[arg(long)]
    role: String,
    /// JSON object of input values, applied over the role defaults
    #[arg(long)]
    inputs: Option<PathBuf>,
    /// Input assignment `key=value`, applied after --inputs
    #[arg(long = "set", value_name = "KEY=VALUE")]
    assignments: Vec<String>,
    /// Print the evaluation as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct QuarterlyArgs {
    /// Consultant role id or title
    #[arg(long)]
    role: String,
    /// JSON input file for one month; give exactly three, in month order
    #[arg(long = "month", value_name = "FILE", num_args = 1)]
    months: Vec<PathBuf>,
    /// The consultant met the creation quota
    #[arg(long)]
    creation_quota: bool,
    /// The consultant met the minimum-effective quota
    #[arg(long)]
    effective_quota: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Payroll history CSV
    #[arg(long, default_value = history::DEFAULT_HISTORY_PATH)]
    file: PathBuf,
    /// Role (Cargo) to filter on; lists roles when omitted
    #[arg(long)]
    role: Option<String>,
    /// Person (Nick Name) to filter on; lists people when omitted
    #[arg(long)]
    person: Option<String>,
    /// First period label of the range
    #[arg(long)]
    from: Option<String>,
    /// Last period label of the range
    #[arg(long)]
    to: Option<String>,
    /// Write the filtered detail to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Roles { json } => {
            let table = RuleTable::load_configured(cli.goals_dir.as_deref())?;
            list_roles(&table, json)
        }
        Command::Evaluate(args) => {
            let table = RuleTable::load_configured(cli.goals_dir.as_deref())?;
            run_evaluate(&table, args)
        }
        Command::Quarterly(args) => {
            let table = RuleTable::load_configured(cli.goals_dir.as_deref())?;
            run_quarterly(&table, args)
        }
        Command::History(args) => run_history(args),
    }
}

fn list_roles(table: &RuleTable, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(table.roles())?);
        return Ok(());
    }

    for role in table.roles() {
        println!("{:<28} {} [{}]", role.id, role.title, role.currency);
        for spec in &role.inputs {
            let options = if spec.options.is_empty() {
                String::new()
            } else {
                format!(" ({})", spec.options.join("|"))
            };
            println!("    {:<28} {:<8} default {}{}", spec.key, spec.kind.as_str(), spec.default, options);
        }
    }
    Ok(())
}

/// Role defaults overlaid with a JSON input file and `key=value` assignments
fn collect_inputs(role: &RoleDefinition, file: Option<&Path>, assignments: &[String]) -> Result<InputSet> {
    let mut inputs = role.default_inputs();
    if let Some(path) = file {
        let reader = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let overrides: InputSet =
            serde_json::from_reader(reader).with_context(|| format!("parsing {}", path.display()))?;
        inputs.merge(overrides);
    }
    for assignment in assignments {
        inputs
            .assign(&role.inputs, assignment)
            .with_context(|| format!("applying --set {}", assignment))?;
    }
    Ok(inputs)
}

fn print_evaluation(evaluation: &Evaluation) {
    println!("{} ({})", evaluation.title, evaluation.role_id);
    if !evaluation.eligible {
        println!("  Eligibility gate not met: variable pay withheld");
    }
    for line in evaluation.result.lines() {
        println!("  {:<34} {:>22}", line.name, evaluation.currency.format(line.amount));
    }
    println!("  {}", "-".repeat(57));
    println!("  {:<34} {:>22}", "Total", evaluation.currency.format(evaluation.total()));
}

fn run_evaluate(table: &RuleTable, args: EvaluateArgs) -> Result<()> {
    let role = table.get(&args.role)?;
    let inputs = collect_inputs(role, args.inputs.as_deref(), &args.assignments)?;
    let evaluation = evaluate(role, &inputs)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print_evaluation(&evaluation);
    }
    Ok(())
}

fn print_quarter(aggregate: &QuarterlyAggregate) {
    let currency = aggregate.currency;
    println!("{:>5} {:>8} {:>22}", "Month", "Points", "Total");
    for (idx, (month, points)) in aggregate.months.iter().zip(aggregate.month_points).enumerate() {
        println!("{:>5} {:>8} {:>22}", idx + 1, points, currency.format(month.total()));
    }
    println!("{}", "-".repeat(37));
    println!("Quarter points:  {}", aggregate.points_quarter);
    println!(
        "Quotas met:      creation {} / effective {}",
        aggregate.flags.meets_creation_quota, aggregate.flags.meets_effective_quota
    );
    println!("Quarterly bonus: {}", currency.format(aggregate.quarterly_bonus));
    println!("Quarter total:   {}", currency.format(aggregate.quarterly_total));
}

fn run_quarterly(table: &RuleTable, args: QuarterlyArgs) -> Result<()> {
    let role = table.get(&args.role)?;
    if args.months.len() != 3 {
        bail!("expected exactly three --month files, got {}", args.months.len());
    }

    let months = args
        .months
        .iter()
        .map(|path| collect_inputs(role, Some(path), &[]))
        .collect::<Result<Vec<_>>>()?;
    let flags = QuotaFlags::new(args.creation_quota, args.effective_quota);
    let aggregate = QuarterlyAggregator::new().aggregate_slice(role, &months, flags)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&aggregate)?);
    } else {
        print_quarter(&aggregate);
    }
    Ok(())
}

fn run_history(args: HistoryArgs) -> Result<()> {
    let history = history::load_history(&args.file)
        .with_context(|| format!("loading payroll history from {}", args.file.display()))?;

    let Some(role) = args.role else {
        for role in history.roles() {
            println!("{}", role);
        }
        return Ok(());
    };
    let Some(person) = args.person else {
        for person in history.people(&role) {
            println!("{}", person);
        }
        return Ok(());
    };

    let mut query = HistoryQuery::new(role, person);
    let periods = history.periods(&query.role, &query.person);
    if periods.is_empty() {
        bail!("no periods for {} / {}", query.role, query.person);
    }
    if args.from.is_some() || args.to.is_some() {
        let first = periods[0].label.clone();
        let last = periods[periods.len() - 1].label.clone();
        query = query.between(args.from.unwrap_or(first), args.to.unwrap_or(last));
    }

    let selected = history.select(&query)?;
    if selected.is_empty() {
        bail!("no records in the selected range");
    }

    let totals = history::totals(selected.iter().copied());
    let usd = incentive_engine::Currency::USD;
    println!("Role: {}  |  Person: {}", query.role, query.person);
    println!("  Basic salary   {:>18}", usd.format(totals.basic_salary));
    println!("  Benefits       {:>18}", usd.format(totals.social_benefits));
    println!("  Vivecasa       {:>18}", usd.format(totals.vivecasa_commissions));
    println!("  Viveprestamo   {:>18}", usd.format(totals.viveprestamo_commissions));
    println!("  Bonuses        {:>18}", usd.format(totals.bonuses));
    println!();

    println!("Summary by period");
    history::write_summary_csv(
        &history::summary_by_period(selected.iter().copied()),
        history.columns(),
        std::io::stdout(),
    )?;

    if let Some(path) = args.export {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        history::write_csv(selected.iter().copied(), history.columns(), file)?;
        println!("\nDetail written to {}", path.display());
    }
    Ok(())
}
