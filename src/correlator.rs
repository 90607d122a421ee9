use std::time::{

    Duration,
    Instant,
};

use tracing::{instrument};

use super::{

    packets::{

        IcmpHeader,
        Ipv4Header,
        decode,
    },

    transport::{

        Transport,
        Received,
    },

    error::{ProbeError},
};

/// The reply matched to an outstanding request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub delay: Duration,
    pub ip: Ipv4Header,
    pub icmp: IcmpHeader,
}

/// States of the wait for one request's reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Correlation {
    /// Still waiting, with this much of the budget left.
    Waiting(Duration),
    Matched(Reply),
    TimedOut,
}

impl Correlation {

    /// Charge `elapsed` against the budget after a datagram that was not our reply.
    ///
    /// A budget that is used up, or would go negative, ends the wait.
    pub fn charge(remaining: Duration, elapsed: Duration) -> Correlation {
        match remaining.checked_sub(elapsed) {

            Some(left) if left > Duration::ZERO => Correlation::Waiting(left),
            _ => Correlation::TimedOut,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, Correlation::Waiting(_))
    }
}

/// Wait for the echo reply carrying `identifier`, sent at `sent_at`, within `budget`.
///
/// Stray datagrams, replies to other requests and anything that fails to decode
/// are skipped. Each one charges the time since `sent_at` against the remaining
/// budget. The result is never `Correlation::Waiting`.
#[instrument(skip(transport, sent_at), level = "trace")]
pub fn correlate<T: Transport + ?Sized>(transport: &mut T, identifier: u16, sent_at: Instant, budget: Duration) -> Result<Correlation, ProbeError> {
    let mut state = Correlation::Waiting(budget);

    loop {

        state = match state {

            Correlation::Waiting(remaining) => match transport.receive(remaining)? {

                Some(received) => inspect(received, identifier, sent_at, remaining),
                None => Correlation::TimedOut,
            },

            finished => break Ok(finished),
        };
    }
}

fn inspect(Received { datagram, received_at }: Received, identifier: u16, sent_at: Instant, remaining: Duration) -> Correlation {
    let elapsed = received_at.saturating_duration_since(sent_at);

    match decode(&datagram) {

        Ok((ip, icmp)) if icmp.identifier == identifier && icmp.is_echo_reply() => {
            return Correlation::Matched(Reply {
                delay: elapsed,
                ip: ip,
                icmp: icmp,
            })
        }

        Ok((ip, icmp)) => tracing::debug!(
            source = %ip.source,
            icmp_type = icmp.icmp_type,
            identifier = icmp.identifier,
            expected = identifier,
            "ignoring datagram for another request"
        ),

        Err(e) => tracing::debug!(error = %e, "ignoring undecodable datagram"),
    }

    Correlation::charge(remaining, elapsed)
}
