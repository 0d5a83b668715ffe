use std::num::NonZeroUsize;

use anyhow::{bail, Context, Result};
use clap::Args;
use hop_models::probe_request::JobDescriptor;
use hop_models::record::TracerouteRecord;
use log::{debug, info};
use thiserror::Error;
use tokio::sync::mpsc;
use trace_crab::helpers::join::flatten;

use crate::schedule::{self, Scheduler};

#[derive(Args)]
#[group(id = "report")]
pub struct Params {
    /// Host to trace, either a name or an IPv4 address
    target: String,

    /// How many times to trace the host
    #[arg(value_parser = parse_repeat_count)]
    repeat_count: NonZeroUsize,
}

#[cfg(test)]
impl Params {
    pub fn new(target: impl Into<String>, repeat_count: NonZeroUsize) -> Self {
        Self {
            target: target.into(),
            repeat_count,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidRepeatCount {
    #[error("`{0}` is not a number of repetitions")]
    NotANumber(String),

    #[error("need to trace at least once")]
    Zero,
}

pub fn parse_repeat_count(raw: &str) -> Result<NonZeroUsize, InvalidRepeatCount> {
    let count = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| InvalidRepeatCount::NotANumber(raw.to_string()))?;
    NonZeroUsize::new(count).ok_or(InvalidRepeatCount::Zero)
}

/// Traces the target as often as requested and returns the records in the order
/// they were completed.
pub async fn collect(params: &Params, scheduler: Scheduler) -> Result<Vec<TracerouteRecord>> {
    let count = params.repeat_count.get();
    let (job_tx, job_rx) = mpsc::channel(count);
    let (result_tx, mut result_rx) = mpsc::channel(count);

    for job in JobDescriptor::repeated(&params.target, count) {
        job_tx
            .send(job)
            .await
            .with_context(|| "while submitting job to the worker pool")?;
    }
    drop(job_tx); // no more jobs, lets the workers stop once drained
    debug!("Submitted {} jobs for {}", count, params.target);

    let scheduler_handle = tokio::spawn(schedule::run(job_rx, result_tx, scheduler));

    let mut records = Vec::with_capacity(count);
    while records.len() < count {
        match result_rx.recv().await {
            Some(record) => records.push(record),
            None => break, // scheduler gave up, its error is more interesting
        }
    }
    flatten(scheduler_handle).await?;
    if records.len() != count {
        bail!(
            "Worker pool stopped after {} of {} traceroutes",
            records.len(),
            count
        );
    }
    info!("Collected {} traceroutes to {}", count, params.target);
    Ok(records)
}
