use hop_models::hop_event::HopEvent;
use hop_models::record::HopRecord;
use log::trace;
use tokio::sync::mpsc::UnboundedReceiver;

/// Turns hop events into records while a probe is still running.
///
/// Hops are numbered by arrival, starting at 0. The TTL the source reports is not carried
/// over, so a source that skips TTLs (e.g. first hop > 1) still yields a gapless sequence.
#[derive(Debug, Default)]
pub struct HopNormalizer {
    next_ttl: u32,
}

impl HopNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, event: &HopEvent) -> HopRecord {
        let ttl = self.next_ttl;
        self.next_ttl += 1;
        trace!("hop #{} from source TTL {}: {:?}", ttl, event.ttl, event);
        if event.success {
            let rtt_millis = event.elapsed.as_secs_f64() * 1000.0;
            HopRecord::answered(ttl, event.address.to_string(), rtt_millis)
        } else {
            HopRecord::no_response(ttl)
        }
    }

    /// Consumes events until the sender side is dropped. Every event sent before that is
    /// included, in the order it was sent.
    pub async fn drain(mut self, mut events: UnboundedReceiver<HopEvent>) -> Vec<HopRecord> {
        let mut hops = vec![];
        while let Some(event) = events.recv().await {
            hops.push(self.normalize(&event));
        }
        hops
    }
}
