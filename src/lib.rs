//! Ekko probe sends ICMP echo requests to a host and reports reachability,
//! round-trip delays and packet loss, much like `ping`.
//!
//! Opening raw sockets needs elevated privileges, a session without them
//! fails with [`error::ProbeError::InsufficientPrivilege`] before sending anything.
//!
//! ## Example
//! ```rust,no_run
//! use ekko_probe::{ error::{ProbeError},
//!     SessionConfig,
//!     ProbeSession,
//!     TrialOutcome,
//! };
//!
//! fn main() -> Result<(), ProbeError> {
//!     let config = SessionConfig::new("example.com")
//!         .with_trials(4)
//!         .with_timeout_secs(2);
//!
//!     let result = ProbeSession::new(config).run()?;
//!     for (trial, outcome) in result.trials.iter().enumerate() {
//!         match outcome {
//!
//!             TrialOutcome::Delay { milliseconds, corrected } => {
//!                 let bound = if *corrected { "<" } else { "" };
//!                 println!("{}: ttl={} time={}{}ms", trial + 1, result.ttl, bound, milliseconds)
//!             }
//!
//!             TrialOutcome::Lost => println!("{}: timed out", trial + 1),
//!         }
//!     }
//!
//!     println!("{} sent, {} received, {:.1}% loss", result.sent, result.received, result.loss_percentage);
//!     Ok(())
//! }
//! ```

mod checksum;
mod correlator;
mod config;
mod packets;
mod privilege;
mod resolver;
mod responses;
mod session;
mod statistics;
mod transport;

pub mod error;

pub use checksum::{checksum};
pub use config::{SessionConfig};
pub use correlator::{Correlation, Reply, correlate};
pub use statistics::{Statistics, aggregate};

pub use packets::{

    IcmpHeader,
    Ipv4Header,
    EchoRequest,
    decode,

    ICMP_ECHO_REQUEST,
    ICMP_ECHO_REPLY,
    PAYLOAD_SIZE,
    PACKET_SIZE,
};

pub use privilege::{

    Capability,
    SocketProbe,
    platform,
};

#[cfg(unix)]
pub use privilege::{Posix};

pub use resolver::{

    SystemResolver,
    Resolution,
    Resolver,
    Target,

    primary_address,
    resolve,
};

pub use responses::{

    TrialOutcome,
    ProbeResult,
};

pub use session::{

    SessionState,
    ProbeSession,

    correlation_id,
    probe,
};

pub use transport::{

    Transport,
    RawSocket,
    Received,
};
