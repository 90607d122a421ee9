use std::{

    net::{Ipv4Addr},
    time::{Duration},
};

use super::statistics::{

    Statistics,
    aggregate,
};

/// The outcome of a single echo request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialOutcome {
    /// A matching reply arrived. `corrected` marks a round trip below one
    /// millisecond that is reported as one, a lower bound rather than a measurement.
    Delay { milliseconds: u64, corrected: bool },
    Lost,
}

impl TrialOutcome {

    /// Convert a measured round trip to whole milliseconds, rounding half away
    /// from zero and promoting zero to a corrected one.
    pub fn from_round_trip(elapsed: Duration) -> TrialOutcome {
        let milliseconds = ((elapsed.as_nanos() + 500_000) / 1_000_000) as u64;

        match milliseconds {

            0 => TrialOutcome::Delay {
                milliseconds: 1,
                corrected: true,
            },

            milliseconds => TrialOutcome::Delay {
                milliseconds,
                corrected: false,
            },
        }
    }

    pub fn milliseconds(&self) -> Option<u64> {
        match self {

            Self::Delay { milliseconds, .. } => Some(*milliseconds),
            Self::Lost => None,
        }
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, Self::Lost)
    }
}

/// Summary of a probe session, handed to whatever renders or records it.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeResult {
    pub host: String,
    /// `0.0.0.0` when the host name could not be resolved.
    pub address: Ipv4Addr,
    /// Echo payload size in octets, zero when no request was built.
    ///
    /// This is the 192 octets of filler after the ICMP header. Older `ping`
    /// scripts printed a length of 25 here, the whole 200 octet message
    /// divided by eight.
    pub payload_size: usize,
    /// Time to live of the most recent matched reply.
    pub ttl: u8,

    pub sent: u32,
    pub received: u32,
    pub lost: u32,
    pub loss_percentage: f64,

    pub min_ms: u64,
    pub max_ms: u64,
    pub average_ms: u64,

    pub trials: Vec<TrialOutcome>,
}

impl ProbeResult {

    pub fn new(host: String, address: Ipv4Addr, payload_size: usize, ttl: u8, statistics: Statistics, trials: Vec<TrialOutcome>) -> ProbeResult {
        ProbeResult {

            host: host,
            address: address,
            payload_size: payload_size,
            ttl: ttl,

            sent: statistics.sent,
            received: statistics.received,
            lost: statistics.lost,
            loss_percentage: statistics.loss_percentage,

            min_ms: statistics.min_ms,
            max_ms: statistics.max_ms,
            average_ms: statistics.average_ms,

            trials: trials,
        }
    }

    /// Result for a host name that did not resolve.
    ///
    /// No trials are run, every configured trial counts as lost, so the delays
    /// all report the timeout.
    pub fn unresolved<S: Into<String>>(host: S, trial_count: u32, timeout: Duration) -> ProbeResult {
        ProbeResult::new(host.into(), Ipv4Addr::UNSPECIFIED, 0, 0, aggregate(&[], trial_count, timeout), Vec::new())
    }

    pub fn is_resolved(&self) -> bool {
        !self.address.is_unspecified()
    }
}
