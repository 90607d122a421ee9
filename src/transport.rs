use std::{

    io::{

        ErrorKind,
        Read,
    },

    net::{

        SocketAddrV4,
        Ipv4Addr,
    },

    time::{

        Duration,
        Instant,
    },
};

use socket2::{

    Protocol,
    Domain,
    Socket,
    Type,
};

use tracing::{instrument};

use super::error::{ProbeError};

/// Largest datagram read from the socket in one go.
pub const MAX_RECEIVE_SIZE: usize = 2048;

/// A raw datagram and the instant it was read.
#[derive(Clone, Debug)]
pub struct Received {
    pub datagram: Vec<u8>,
    pub received_at: Instant,
}

/// Sends echo requests and hands back whatever arrives on the socket.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {

    /// Transmit the whole packet to `target`.
    fn send(&mut self, target: Ipv4Addr, packet: &[u8]) -> Result<(), ProbeError>;

    /// Wait up to `remaining` for a datagram.
    ///
    /// Returns `None` when nothing became readable in time.
    fn receive(&mut self, remaining: Duration) -> Result<Option<Received>, ProbeError>;
}

/// Read timeout covering `remaining`, or `None` once too little is left to wait.
///
/// Socket timeouts are kept in whole microseconds and a zero timeout blocks
/// forever, so anything under a microsecond has to count as expired.
fn read_timeout(remaining: Duration) -> Option<Duration> {
    if remaining < Duration::from_micros(1) {
        return None
    }

    Some(remaining)
}

/// Hand `packet` to `send` until every octet is written.
fn send_all<F>(target: Ipv4Addr, packet: &[u8], mut send: F) -> Result<(), ProbeError>
where
    F: FnMut(&[u8]) -> std::io::Result<usize>,
{
    let mut written = 0;
    while written < packet.len() {
        let sent = send(&(packet[written..])).map_err(|e| {
            ProbeError::SocketSend(target.to_string(), e.to_string())
        })?;

        if sent == 0 {
            return Err(ProbeError::SocketSendStalled(target.to_string(), written, packet.len()))
        }

        written += sent;
    }

    Ok(())
}

/// Raw ICMPv4 socket, closed when dropped.
pub struct RawSocket {
    socket: Socket,
}

impl RawSocket {

    /// Open a raw ICMPv4 socket bound to the unspecified address.
    pub fn open() -> Result<RawSocket, ProbeError> {
        let source_address = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0);
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)).map_err(|e| {
            match e.kind() {

                ErrorKind::PermissionDenied => ProbeError::PermissionDenied(e.to_string()),
                _ => ProbeError::SocketCreate(e.to_string()),
            }
        })?;

        socket.bind(&(source_address.into())).map_err(|e| {
            ProbeError::SocketCreate(format!("binding to '{}', {}", source_address, e))
        })?;

        tracing::debug!(%source_address, "opened raw icmp socket");

        Ok(RawSocket {
            socket: socket,
        })
    }
}

impl Transport for RawSocket {

    #[instrument(skip(self, packet), level = "trace")]
    fn send(&mut self, target: Ipv4Addr, packet: &[u8]) -> Result<(), ProbeError> {
        // ICMP has no ports, any value is ignored by the kernel.
        let target_address = SocketAddrV4::new(target, 1).into();

        send_all(target, packet, |chunk| self.socket.send_to(chunk, &target_address))
    }

    #[instrument(skip(self), level = "trace")]
    fn receive(&mut self, remaining: Duration) -> Result<Option<Received>, ProbeError> {
        let timeout = match read_timeout(remaining) {

            Some(timeout) => timeout,
            None => return Ok(None),
        };

        self.socket.set_read_timeout(Some(timeout)).map_err(|e| {
            ProbeError::SocketSetReadTimeout(e.to_string())
        })?;

        let mut buf: [u8; MAX_RECEIVE_SIZE] = {
            [0; MAX_RECEIVE_SIZE]
        };

        match self.socket.read(&mut buf[..]) {

            Ok(length) => Ok(Some(Received {
                datagram: buf[..length].to_vec(),
                received_at: Instant::now(),
            })),

            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(ProbeError::SocketReceive(e.to_string())),
        }
    }
}
