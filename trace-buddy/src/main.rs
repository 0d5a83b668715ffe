use anyhow::{Context, Result};
use clap::Parser;

use futures::executor;
use trace_crab::helpers::{bootstrap, logging};

mod error;
/// Seam between scheduling and whatever actually sends the probes.
mod hop_source;
/// Local interface & target address lookup.
mod lookup;
/// Submits the repeated jobs and collects the records into one report.
mod report;
/// Runs traceroute jobs on a pool of workers.
mod schedule;
mod traceroute_call;

#[cfg(test)]
mod test_utils;

/// Traces the same host a number of times and prints all runs as one JSON report.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[clap(flatten)]
    report: report::Params,

    #[clap(flatten)]
    scheduler: schedule::Params,

    #[clap(flatten)]
    logging: logging::Params,
}

fn main() -> Result<()> {
    bootstrap::run(Cli::parse, |cli: &Cli| &cli.logging, do_run)
}

fn do_run(cli: Cli) -> Result<()> {
    let scheduler = cli.scheduler.to_scheduler()?;
    let records = executor::block_on(report::collect(&cli.report, scheduler))?;
    let line = hop_models::report::render(&records)
        .with_context(|| "Failed to serialise traceroutes")?;
    println!("{}", line);
    Ok(())
}
