use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use log::trace;

use crate::error::TraceError;

/// Finds the local address that probes are sent from.
pub trait InterfaceLookup: Send + Sync {
    fn outbound_v4(&self) -> Result<Ipv4Addr, TraceError>;
}

#[async_trait]
pub trait TargetResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> Result<Ipv4Addr, TraceError>;
}

#[derive(Debug, Default)]
pub struct SystemInterfaces;

impl InterfaceLookup for SystemInterfaces {
    fn outbound_v4(&self) -> Result<Ipv4Addr, TraceError> {
        let interfaces = if_addrs::get_if_addrs().map_err(TraceError::InterfaceQuery)?;
        trace!("Local interfaces: {:?}", interfaces);
        first_outbound_v4(interfaces.iter().map(|it| it.ip()))
    }
}

/// First IPv4 address that is neither loopback nor unspecified.
pub fn first_outbound_v4(addrs: impl IntoIterator<Item = IpAddr>) -> Result<Ipv4Addr, TraceError> {
    addrs
        .into_iter()
        .find_map(|addr| match addr {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
            _ => None,
        })
        .ok_or(TraceError::NoInterface)
}

/// Resolves via the system resolver. IP literals are returned as-is.
#[derive(Debug, Default)]
pub struct SystemResolver;

#[async_trait]
impl TargetResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<Ipv4Addr, TraceError> {
        if let Ok(literal) = host.parse::<Ipv4Addr>() {
            return Ok(literal);
        }
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|source| TraceError::Resolution {
                host: host.to_string(),
                source,
            })?;
        first_v4(addrs.map(|it| it.ip())).ok_or_else(|| TraceError::NoIpv4 {
            host: host.to_string(),
        })
    }
}

fn first_v4(addrs: impl Iterator<Item = IpAddr>) -> Option<Ipv4Addr> {
    addrs
        .filter_map(|addr| match addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
}
