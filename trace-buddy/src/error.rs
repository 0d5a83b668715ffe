use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("You do not appear to be connected to the Internet: no non-loopback IPv4 interface found")]
    NoInterface,

    #[error("Failed to query network interfaces: {0}")]
    InterfaceQuery(#[source] io::Error),

    #[error("Failed to resolve target {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("Target {host} has no IPv4 address")]
    NoIpv4 { host: String },
}

impl TraceError {
    /// Fatal errors are configuration problems that will hit every run the same way,
    /// so the whole batch is aborted. Everything else only affects one record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NoInterface | Self::InterfaceQuery(_))
    }
}
