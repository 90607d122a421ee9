use socket2::{

    Protocol,
    Domain,
    Socket,
    Type,
};

/// Decides whether this process may open raw ICMP sockets.
pub trait Capability {
    fn can_open_raw_sockets(&self) -> bool;
}

/// Raw sockets require the effective user to be root.
#[cfg(unix)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Posix;

#[cfg(unix)]
impl Capability for Posix {
    fn can_open_raw_sockets(&self) -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
}

/// Asks the platform directly by opening, and closing, a raw socket.
#[derive(Clone, Copy, Debug, Default)]
pub struct SocketProbe;

impl Capability for SocketProbe {
    fn can_open_raw_sockets(&self) -> bool {
        Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)).is_ok()
    }
}

/// A fixed answer, for embedders that have already checked.
impl Capability for bool {
    fn can_open_raw_sockets(&self) -> bool {
        *self
    }
}

/// The check used on this platform.
pub fn platform() -> Box<dyn Capability> {
    #[cfg(unix)]
    return Box::new(Posix);

    #[cfg(not(unix))]
    return Box::new(SocketProbe);
}
