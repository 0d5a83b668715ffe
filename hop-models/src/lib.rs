//! Models for one traceroute run: the raw hop events produced by a probe and the
//! normalised records that end up in the report.

pub mod hop_event;
pub mod probe_request;
pub mod record;
pub mod report;
