use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use futures::{StreamExt, TryStreamExt};
use hop_models::probe_request::{
    JobDescriptor, ProbeOptions, DEFAULT_FIRST_HOP, DEFAULT_MAX_HOPS, DEFAULT_RETRIES,
};
use hop_models::record::TracerouteRecord;
use log::{debug, info};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_stream::wrappers::ReceiverStream;

use crate::hop_source::HopSource;
use crate::lookup::{InterfaceLookup, SystemInterfaces, SystemResolver, TargetResolver};
use crate::schedule::task::ProbeTask;
use crate::traceroute_call;

pub use self::normalize::HopNormalizer;

mod normalize;
mod task;

#[derive(Args)]
#[group(id = "scheduler")]
pub struct Params {
    #[clap(flatten)]
    base: traceroute_call::Params,

    /// Max time-to-live (max number of hops) used in outgoing probe packets
    #[arg(short = 'm', long, env = "MAX_HOPS", default_value_t = DEFAULT_MAX_HOPS)]
    max_hops: u8,

    /// First time-to-live used, i.e. the first hop
    #[arg(short = 'f', long, env = "FIRST_HOP", default_value_t = DEFAULT_FIRST_HOP)]
    first_hop: u8,

    /// Additional probes per TTL if the first one goes unanswered
    #[arg(short = 'q', long, env = "RETRIES", default_value_t = DEFAULT_RETRIES)]
    retries: u8,

    /// How many traceroutes may run at the same time
    #[arg(long, env = "WORKERS", default_value = "1")]
    workers: NonZeroUsize,
}

impl Params {
    pub fn probe_options(&self) -> Result<ProbeOptions> {
        let options = ProbeOptions {
            max_hops: self.max_hops,
            first_hop: self.first_hop,
            retries: self.retries,
        };
        options
            .validate()
            .with_context(|| "Invalid probe options, check -m, -f and -q")
    }

    /// Builds a scheduler that talks to the real system: interfaces, resolver & traceroute.
    pub fn to_scheduler(&self) -> Result<Scheduler> {
        let context = ProbeContext::new(
            self.probe_options()?,
            Arc::new(self.base.to_caller()),
            Arc::new(SystemInterfaces),
            Arc::new(SystemResolver),
        );
        Ok(Scheduler::new(self.workers, context))
    }
}

/// Everything a single probe needs, shared read-only between all workers.
pub struct ProbeContext {
    pub options: ProbeOptions,
    pub source: Arc<dyn HopSource>,
    pub interfaces: Arc<dyn InterfaceLookup>,
    pub resolver: Arc<dyn TargetResolver>,
}

impl ProbeContext {
    pub fn new(
        options: ProbeOptions,
        source: Arc<dyn HopSource>,
        interfaces: Arc<dyn InterfaceLookup>,
        resolver: Arc<dyn TargetResolver>,
    ) -> Self {
        Self {
            options,
            source,
            interfaces,
            resolver,
        }
    }
}

pub struct Scheduler {
    workers: NonZeroUsize,
    context: Arc<ProbeContext>,
}

/// Runs jobs until the job channel is closed & drained, sending one record per job.
/// Only fails for problems that would hit every job, e.g. no usable network interface.
pub async fn run(
    job_rx: Receiver<JobDescriptor>,
    result_tx: Sender<TracerouteRecord>,
    scheduler: Scheduler,
) -> Result<()> {
    scheduler.run(job_rx, result_tx).await
}

impl Scheduler {
    pub fn new(workers: NonZeroUsize, context: ProbeContext) -> Self {
        Self {
            workers,
            context: Arc::new(context),
        }
    }

    async fn run(
        &self,
        job_rx: Receiver<JobDescriptor>,
        result_tx: Sender<TracerouteRecord>,
    ) -> Result<()> {
        let source_addr = self
            .context
            .interfaces
            .outbound_v4()
            .with_context(|| "pre-flight interface check failed")?;
        info!(
            "Scheduler up & running with {} worker(s), probing from {}",
            self.workers, source_addr
        );

        ReceiverStream::new(job_rx)
            .map(Ok)
            .try_for_each_concurrent(self.workers.get(), |job| {
                self.handle_job(job, result_tx.clone())
            })
            .await?;

        info!("Job queue drained, scheduler shutting down.");
        Ok(())
    }

    async fn handle_job(
        &self,
        job: JobDescriptor,
        result_tx: Sender<TracerouteRecord>,
    ) -> Result<()> {
        debug!("Picked up job {:?}", job);
        let record = ProbeTask::new(job, Arc::clone(&self.context))
            .run()
            .await
            .with_context(|| "Unable to run traceroute at all")?;
        result_tx
            .send(record)
            .await
            .with_context(|| "while sending traceroute over result channel")?;
        Ok(())
    }
}
