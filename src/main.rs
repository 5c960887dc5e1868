//! Annuity Solver CLI
//!
//! Solves an annuity definition read from a JSON file

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use annuity_solver::{load_annuity, AnnuityEngine, SolveResult, SolverConfig};

/// Solve for the unknown rate or cash flow of an annuity
#[derive(Parser, Debug)]
#[command(name = "annuity-solver", version, about)]
struct Cli {
    /// Annuity definition (JSON)
    file: PathBuf,

    /// Build the amortization schedule and year-end valuations
    #[arg(long)]
    schedule: bool,

    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Write the amortization schedule to this CSV file (implies --schedule)
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let annuity = load_annuity(&cli.file)
        .with_context(|| format!("Failed to load annuity from {}", cli.file.display()))?;

    let include_schedule = cli.schedule || cli.csv.is_some();
    let engine = AnnuityEngine::new(SolverConfig::from_env());
    let result = engine.solve(&annuity, include_schedule).context("Solve failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    if let Some(path) = &cli.csv {
        write_schedule_csv(&result, path)
            .with_context(|| format!("Failed to write schedule to {}", path.display()))?;
        println!("\nSchedule written to: {}", path.display());
    }

    Ok(())
}

fn print_summary(result: &SolveResult) {
    println!("Annuity Solver v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    println!("{}", result.answer_label());
    println!("  As-of date:     {}", result.solved.as_of);
    println!("  Nominal rate:   {:.6}", result.solved.nominal);
    println!("  Effective rate: {:.6}", result.solved.effective);
    println!("  PV:             ${:.2}", result.pv);
    println!("  DCF PV:         ${:.2}", result.dcf_pv);
    println!("  Total payout:   ${:.2}", result.total_payout);
    println!("  WAL:            {:.1} years", result.wal);
    println!("  Term:           {:.1} years", result.term);

    println!("\nCash flows:");
    println!("{:>4} {:>7} {:>11} {:>11} {:>6} {:>14} {:>14}", "Row", "Type", "First", "Last", "Num", "Amount", "Aggregate");
    println!("{}", "-".repeat(74));
    for flow in &result.flows {
        println!(
            "{:>4} {:>7} {:>11} {:>11} {:>6} {:>14.2} {:>14.2}",
            flow.row, flow.kind.to_string(), flow.first, flow.last, flow.number, flow.amount, flow.aggregate
        );
    }

    if let Some(year_end) = &result.year_end {
        println!("\nYear-end valuations:");
        println!("{:>6} {:>14} {:>14} {:>14} {:>14}", "Year", "Value", "Aggregate", "Interest", "Cumulative");
        println!("{}", "-".repeat(66));
        for ye in year_end {
            println!(
                "{:>6} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
                ye.date, ye.value, ye.aggregate, ye.yearly_interest, ye.yearly_cumulative
            );
        }
        println!("\n  Rounding:      {:.2}", result.rounding);
        println!("  DCF rounding:  {:.2}", result.dcf_rounding);
        if let Some(date) = &result.hw_mark_date {
            println!("  High water:    ${:.2} on {}", result.hw_mark, date);
        }
    }
}

fn write_schedule_csv(result: &SolveResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in result.schedule_rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
