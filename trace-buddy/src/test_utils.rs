use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use hop_models::hop_event::HopEvent;
use hop_models::probe_request::ProbeOptions;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::TraceError;
use crate::hop_source::HopSource;
use crate::lookup::{InterfaceLookup, TargetResolver};
use crate::schedule::ProbeContext;

pub const SOURCE_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 121);

/// Replays the same hops on every call, optionally failing after all of them were sent.
#[derive(Default)]
pub struct ScriptedSource {
    hops: Vec<HopEvent>,
    fail_at_end: bool,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn answering(count: u8) -> Self {
        let hops = (1..=count)
            .map(|ttl| {
                HopEvent::answered(ttl, Ipv4Addr::new(10, 0, 0, ttl), Duration::from_micros(250 * ttl as u64))
            })
            .collect();
        Self {
            hops,
            ..Default::default()
        }
    }

    pub fn of(hops: Vec<HopEvent>) -> Self {
        Self {
            hops,
            ..Default::default()
        }
    }

    pub fn failing_at_end(mut self) -> Self {
        self.fail_at_end = true;
        self
    }
}

impl HopSource for ScriptedSource {
    fn trace(&self, target: Ipv4Addr, _: &ProbeOptions, events: UnboundedSender<HopEvent>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for hop in self.hops.iter() {
            events.send(hop.clone())?;
        }
        if self.fail_at_end {
            bail!("scripted failure tracing {}", target)
        }
        Ok(())
    }
}

pub struct FixedInterface(pub Option<Ipv4Addr>);

impl InterfaceLookup for FixedInterface {
    fn outbound_v4(&self) -> Result<Ipv4Addr, TraceError> {
        self.0.ok_or(TraceError::NoInterface)
    }
}

/// Only knows IPv4 literals, everything else is "not found".
pub struct LiteralResolver;

#[async_trait]
impl TargetResolver for LiteralResolver {
    async fn resolve(&self, host: &str) -> Result<Ipv4Addr, TraceError> {
        host.parse().map_err(|_| TraceError::Resolution {
            host: host.to_string(),
            source: io::ErrorKind::NotFound.into(),
        })
    }
}

pub fn context_with(source: Arc<ScriptedSource>) -> ProbeContext {
    ProbeContext::new(
        ProbeOptions::default(),
        source,
        Arc::new(FixedInterface(Some(SOURCE_ADDR))),
        Arc::new(LiteralResolver),
    )
}

pub fn context_without_interface(source: Arc<ScriptedSource>) -> ProbeContext {
    ProbeContext::new(
        ProbeOptions::default(),
        source,
        Arc::new(FixedInterface(None)),
        Arc::new(LiteralResolver),
    )
}

/// Every trace waits (up to a deadline) until `expected` traces are running at the same time,
/// and remembers the highest number it saw.
pub struct RendezvousSource {
    expected: usize,
    deadline: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl RendezvousSource {
    pub fn new(expected: usize, deadline: Duration) -> Self {
        Self {
            expected,
            deadline,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl HopSource for RendezvousSource {
    fn trace(&self, target: Ipv4Addr, _: &ProbeOptions, events: UnboundedSender<HopEvent>) -> Result<()> {
        let now_running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_running, Ordering::SeqCst);
        let started = std::time::Instant::now();
        while self.max_in_flight.load(Ordering::SeqCst) < self.expected && started.elapsed() < self.deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        events.send(HopEvent::answered(1, target, Duration::from_millis(1)))?;
        Ok(())
    }
}

pub fn context_with_source(source: Arc<dyn HopSource>) -> ProbeContext {
    ProbeContext::new(
        ProbeOptions::default(),
        source,
        Arc::new(FixedInterface(Some(SOURCE_ADDR))),
        Arc::new(LiteralResolver),
    )
}
