use thiserror::Error;

pub const DEFAULT_MAX_HOPS: u8 = 30;
pub const DEFAULT_FIRST_HOP: u8 = 1;
pub const DEFAULT_RETRIES: u8 = 0;
/// `traceroute` sends at most 10 queries per hop.
pub const MAX_RETRIES: u8 = 9;

/// Settings for a single traceroute run. Shared read-only between all runs of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    pub max_hops: u8,
    pub first_hop: u8,
    /// Additional probes per TTL after the first one.
    pub retries: u8,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            first_hop: DEFAULT_FIRST_HOP,
            retries: DEFAULT_RETRIES,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidOptions {
    #[error("first hop must be at least 1")]
    FirstHopZero,

    #[error("first hop {first_hop} is beyond max hops {max_hops}")]
    FirstHopBeyondMax { first_hop: u8, max_hops: u8 },

    #[error("at most {max} retries per hop are supported, got {retries}")]
    TooManyRetries { retries: u8, max: u8 },
}

impl ProbeOptions {
    pub fn validate(self) -> Result<Self, InvalidOptions> {
        if self.first_hop == 0 {
            Err(InvalidOptions::FirstHopZero)
        } else if self.first_hop > self.max_hops {
            Err(InvalidOptions::FirstHopBeyondMax {
                first_hop: self.first_hop,
                max_hops: self.max_hops,
            })
        } else if self.retries > MAX_RETRIES {
            Err(InvalidOptions::TooManyRetries {
                retries: self.retries,
                max: MAX_RETRIES,
            })
        } else {
            Ok(self)
        }
    }

    /// Total number of probes sent per TTL.
    pub fn queries_per_hop(&self) -> u16 {
        self.retries as u16 + 1
    }
}

/// One unit of work for the worker pool: trace this host once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub target: String,
}

impl JobDescriptor {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The same job, `count` times, for repeated measurements of one target.
    pub fn repeated(target: &str, count: usize) -> Vec<Self> {
        std::iter::repeat_with(|| Self::new(target))
            .take(count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, EqualityAssertion, ResultAssertion};

    use super::*;

    #[test]
    fn defaults_validate() {
        assert_that!(ProbeOptions::default().validate()).is_ok();
    }

    #[test]
    fn first_hop_zero() {
        // given
        let options = ProbeOptions {
            first_hop: 0,
            ..Default::default()
        };

        // when
        let res = options.validate();

        // then
        assert_that!(res).is_equal_to(Err(InvalidOptions::FirstHopZero));
    }

    #[test]
    fn first_hop_beyond_max() {
        // given
        let options = ProbeOptions {
            max_hops: 4,
            first_hop: 5,
            retries: 0,
        };

        // when
        let res = options.validate();

        // then
        assert_that!(res).is_equal_to(Err(InvalidOptions::FirstHopBeyondMax {
            first_hop: 5,
            max_hops: 4,
        }));
    }

    #[test]
    fn too_many_retries() {
        // given
        let options = ProbeOptions {
            retries: MAX_RETRIES + 1,
            ..Default::default()
        };

        // when
        let res = options.validate();

        // then
        assert_that!(res).is_equal_to(Err(InvalidOptions::TooManyRetries {
            retries: MAX_RETRIES + 1,
            max: MAX_RETRIES,
        }));
    }

    #[test]
    fn max_retries_still_valid() {
        let options = ProbeOptions {
            retries: MAX_RETRIES,
            ..Default::default()
        };
        assert_that!(options.validate()).is_ok();
        assert_that!(options.queries_per_hop()).is_equal_to(10);
    }

    #[test]
    fn retries_add_queries() {
        let options = ProbeOptions {
            retries: 2,
            ..Default::default()
        };
        assert_that!(options.queries_per_hop()).is_equal_to(3);
    }

    #[test]
    fn repeated_jobs() {
        // when
        let jobs = JobDescriptor::repeated("8.8.8.8", 3);

        // then
        assert_that!(jobs).is_equal_to(vec![
            JobDescriptor::new("8.8.8.8"),
            JobDescriptor::new("8.8.8.8"),
            JobDescriptor::new("8.8.8.8"),
        ]);
    }
}
