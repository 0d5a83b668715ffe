use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::Utc;
use hop_models::probe_request::JobDescriptor;
use hop_models::record::{HopRecord, TracerouteRecord};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use trace_crab::helpers::join::flatten;

use crate::error::TraceError;
use crate::schedule::{HopNormalizer, ProbeContext};

/// One traceroute run for one job. Always produces a record unless the machine itself is
/// unfit for probing; failures to resolve or trace only make the record shorter.
pub struct ProbeTask {
    job: JobDescriptor,
    context: Arc<ProbeContext>,
}

impl ProbeTask {
    pub fn new(job: JobDescriptor, context: Arc<ProbeContext>) -> Self {
        Self { job, context }
    }

    pub async fn run(self) -> Result<TracerouteRecord, TraceError> {
        // the record is stamped with the start of the run, not the end of resolution
        let ts = Utc::now().timestamp();
        let source_addr = self.context.interfaces.outbound_v4()?;
        let target = match self.context.resolver.resolve(&self.job.target).await {
            Ok(addr) => addr,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Not tracing, keeping an empty record: {}", e);
                return Ok(self.record_for(ts, source_addr, self.job.target.clone()));
            }
        };
        let record = self.record_for(ts, source_addr, target.to_string());
        let hops = self.trace(target).await;
        info!("Traced {} in {} hops", target, hops.len());
        Ok(record.with_hops(hops))
    }

    fn record_for(&self, ts: i64, source_addr: Ipv4Addr, target_address: String) -> TracerouteRecord {
        TracerouteRecord::new(ts, source_addr.to_string(), target_address)
    }

    /// Runs the (blocking) source on the blocking pool while normalising its hops here.
    async fn trace(&self, target: Ipv4Addr) -> Vec<HopRecord> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let source = Arc::clone(&self.context.source);
        let options = self.context.options;
        let source_task =
            tokio::task::spawn_blocking(move || source.trace(target, &options, event_tx));

        let hops = HopNormalizer::new().drain(event_rx).await;
        match flatten(source_task).await {
            Ok(()) => debug!("Hop source for {} finished cleanly", target),
            Err(e) => warn!(
                "Tracing {} failed after {} hops, keeping those: {:#}",
                target,
                hops.len(),
                e
            ),
        }
        hops
    }
}
