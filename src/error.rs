use thiserror::{Error};

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Insufficient privileges to open socket and send echo requests.")]
    InsufficientPrivilege,
    #[error("Permission denied while creating raw socket, reason: {0}")]
    PermissionDenied(String),
    #[error("Failed to create socket, reason: {0}")]
    SocketCreate(String),
    #[error("Could not set sockets read timeout, reason: {0}")]
    SocketSetReadTimeout(String),
    #[error("Socket send to '{0}', reason: {1}")]
    SocketSend(String, String),
    #[error("Socket send to '{0}' stalled after {1} of {2} octets.")]
    SocketSendStalled(String, usize, usize),
    #[error("Socket receive, reason: {0}")]
    SocketReceive(String),
    #[error("Malformed packet, expected at least {expected} octets but got {actual}.")]
    MalformedPacket { expected: usize, actual: usize },
    #[error("Failed to read response field '{0}', reason: {1}")]
    ResponseReadField(&'static str, String),
    #[error("Failed to resolve address for hostname: '{0}'")]
    ResolverIpLookup(String),
    #[error("Failed to resolve domain for address: '{0}'")]
    ResolverDomainLookup(String),
}

impl ProbeError {
    /// Errors that end the whole session rather than a single trial.
    pub fn is_fatal(&self) -> bool {
        match self {

            Self::InsufficientPrivilege
                | Self::PermissionDenied(_)
                | Self::SocketCreate(_) => true,

            _ => false,
        }
    }
}
