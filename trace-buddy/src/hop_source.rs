use std::net::Ipv4Addr;

use anyhow::Result;
use hop_models::hop_event::HopEvent;
use hop_models::probe_request::ProbeOptions;
use tokio::sync::mpsc::UnboundedSender;

/// Something that can actually trace a route, e.g. the system traceroute binary.
///
/// Implementations block until the trace is complete. Each hop is sent to `events` as soon as
/// it is known; dropping `events` on return is what tells the consumer that no more hops follow.
/// An error returned here does not invalidate hops that were already sent.
pub trait HopSource: Send + Sync {
    fn trace(
        &self,
        target: Ipv4Addr,
        options: &ProbeOptions,
        events: UnboundedSender<HopEvent>,
    ) -> Result<()>;
}
