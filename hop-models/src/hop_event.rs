use std::net::Ipv4Addr;
use std::time::Duration;

/// One hop measurement as reported by a traceroute implementation, one per TTL reached.
#[derive(Debug, Clone, PartialEq)]
pub struct HopEvent {
    /// TTL the probe was sent with, as reported by the source.
    pub ttl: u8,
    /// Responding router, [Ipv4Addr::UNSPECIFIED] if nobody answered.
    pub address: Ipv4Addr,
    pub success: bool,
    /// Reverse name of [Self::address]; empty if not looked up.
    pub host_name: String,
    pub elapsed: Duration,
}

impl HopEvent {
    pub fn answered(ttl: u8, address: Ipv4Addr, elapsed: Duration) -> Self {
        Self {
            ttl,
            address,
            success: true,
            host_name: String::new(),
            elapsed,
        }
    }

    pub fn timed_out(ttl: u8) -> Self {
        Self {
            ttl,
            address: Ipv4Addr::UNSPECIFIED,
            success: false,
            host_name: String::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self
    }
}
