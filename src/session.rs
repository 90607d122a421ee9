use std::{

    net::{Ipv4Addr},
    thread,

    time::{

        Duration,
        Instant,
    },
};

use tracing::{instrument};

use super::{

    correlator::{

        Correlation,
        correlate,
        Reply,
    },

    resolver::{

        SystemResolver,
        Resolution,
        Resolver,
        resolve,
    },

    transport::{

        Transport,
        RawSocket,
    },

    packets::{

        PAYLOAD_SIZE,
        EchoRequest,
    },

    privilege::{Capability},
    statistics::{aggregate},
    config::{SessionConfig},
    error::{ProbeError},

    responses::{

        TrialOutcome,
        ProbeResult,
    },
};

/// Where a session is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resolving,
    /// Running the given trial, counting from one.
    Probing(u32),
    Done,
}

/// Correlation identifier for a request, scaled from the timeout by a random fraction.
///
/// Identifiers only have to differ from stray replies within one trial, so
/// collisions between trials are harmless.
pub fn correlation_id(timeout: Duration, fraction: f64) -> u16 {
    ((timeout.as_nanos() as f64 * fraction) as u64 % 65536) as u16
}

/// Sends a series of echo requests to one target and summarises the replies.
pub struct ProbeSession {
    config: SessionConfig,

    resolver: Box<dyn Resolver>,
    capability: Box<dyn Capability>,

    state: SessionState,
}

impl ProbeSession {

    /// Build a session using the system resolver and this platform's privilege check.
    pub fn new(config: SessionConfig) -> ProbeSession {
        ProbeSession::with_parts(config, Box::new(SystemResolver), super::privilege::platform())
    }

    pub fn with_parts(config: SessionConfig, resolver: Box<dyn Resolver>, capability: Box<dyn Capability>) -> ProbeSession {
        ProbeSession {

            config: config,

            resolver: resolver,
            capability: capability,

            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &(self.config)
    }

    /// Run every trial over a raw socket.
    pub fn run(&mut self) -> Result<ProbeResult, ProbeError> {
        self.run_with(RawSocket::open)
    }

    /// Run every trial over the transport returned by `open`.
    ///
    /// The transport is opened only once the target has resolved and is
    /// dropped before returning. Missing privileges and failing to open the
    /// transport end the session with an error, while failures within a
    /// trial only count that trial as lost.
    #[instrument(skip_all, fields(target = %self.config.target()), level = "trace")]
    pub fn run_with<T, F>(&mut self, open: F) -> Result<ProbeResult, ProbeError>
    where
        T: Transport,
        F: FnOnce() -> Result<T, ProbeError>,
    {
        if !self.capability.can_open_raw_sockets() {
            return Err(ProbeError::InsufficientPrivilege)
        }

        self.transition(SessionState::Resolving);

        let (host, address) = match resolve(self.resolver.as_ref(), self.config.target()) {

            Resolution::Resolved { host, address } => (host, address),

            Resolution::Unresolved { host } => {
                self.transition(SessionState::Done);
                return Ok(ProbeResult::unresolved(host, self.config.trials(), self.config.timeout()))
            }
        };

        let mut transport = open()?;

        let trials = self.config.trials();
        let mut outcomes = Vec::with_capacity(trials as usize);
        let mut ttl = 0;

        for trial in 1..=trials {
            self.transition(SessionState::Probing(trial));

            let identifier = correlation_id(self.config.timeout(), rand::random());
            let outcome = match self.trial(&mut transport, address, identifier) {

                Ok(Some(reply)) => {
                    ttl = reply.ip.ttl;
                    TrialOutcome::from_round_trip(reply.delay)
                }

                Ok(None) => TrialOutcome::Lost,

                Err(e) if e.is_fatal() => return Err(e),

                Err(e) => {
                    tracing::warn!(trial, error = %e, "trial failed");
                    TrialOutcome::Lost
                }
            };

            tracing::debug!(trial, ?outcome);
            outcomes.push(outcome);

            if trial < trials {
                thread::sleep(self.config.pause());
            }
        }

        drop(transport);
        self.transition(SessionState::Done);

        let statistics = aggregate(&outcomes, trials, self.config.timeout());
        Ok(ProbeResult::new(host, address, PAYLOAD_SIZE, ttl, statistics, outcomes))
    }

    #[instrument(skip(self, transport), level = "trace")]
    fn trial<T: Transport>(&self, transport: &mut T, address: Ipv4Addr, identifier: u16) -> Result<Option<Reply>, ProbeError> {
        let request = EchoRequest::new(identifier);

        transport.send(address, request.as_slice())?;
        let sent_at = Instant::now();

        match correlate(transport, identifier, sent_at, self.config.timeout())? {

            Correlation::Matched(reply) => Ok(Some(reply)),
            _ => Ok(None),
        }
    }

    fn transition(&mut self, state: SessionState) {
        tracing::debug!(from = ?self.state, to = ?state, "session state");
        self.state = state;
    }
}

/// Probe `target` with the default settings.
pub fn probe<S: Into<String>>(target: S) -> Result<ProbeResult, ProbeError> {
    ProbeSession::new(SessionConfig::new(target)).run()
}
