use serde::{Deserialize, Serialize};

/// Address shown for hops where no router answered.
pub const NO_RESPONSE_IP: &str = "*";

/// One completed traceroute run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerouteRecord {
    /// Start of the run, seconds since the Unix epoch.
    pub ts: i64,
    pub source_address: String,
    /// Resolved target, or the host exactly as requested if it could not be resolved.
    pub target_address: String,
    /// Hops in the order they were reported, never padded.
    /// Serialized under the lowercase `packets` key that report consumers read.
    pub packets: Vec<HopRecord>,
}

impl TracerouteRecord {
    pub fn new(ts: i64, source_address: String, target_address: String) -> Self {
        Self {
            ts,
            source_address,
            target_address,
            packets: vec![],
        }
    }

    pub fn with_hops(mut self, hops: Vec<HopRecord>) -> Self {
        self.packets = hops;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopRecord {
    /// Position of this hop in the run, starting at 0.
    pub ttl: u32,
    pub ip: String,
    /// Round-trip time in milliseconds, `None` (JSON `null`) if there was no response.
    pub rtt: Option<f64>,
}

impl HopRecord {
    pub fn answered(ttl: u32, ip: String, rtt_millis: f64) -> Self {
        Self {
            ttl,
            ip,
            rtt: Some(rtt_millis),
        }
    }

    pub fn no_response(ttl: u32) -> Self {
        Self {
            ttl,
            ip: NO_RESPONSE_IP.to_string(),
            rtt: None,
        }
    }

    pub fn is_response(&self) -> bool {
        self.rtt.is_some()
    }
}
