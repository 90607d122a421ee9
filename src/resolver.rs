use std::net::{

    SocketAddrV4,
    Ipv4Addr,
    IpAddr,
};

use socket2::{

    Domain,
    Socket,
    Type,
};

use super::error::{ProbeError};

/// Forward and reverse name lookups.
pub trait Resolver {
    fn lookup_address(&self, host: &str) -> Result<Ipv4Addr, ProbeError>;
    fn lookup_name(&self, address: Ipv4Addr) -> Result<String, ProbeError>;
}

/// Lookups through the system resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup_address(&self, host: &str) -> Result<Ipv4Addr, ProbeError> {
        let addresses = dns_lookup::lookup_host(host).map_err(|_| {
            ProbeError::ResolverIpLookup(host.to_string())
        })?;

        addresses.into_iter().find_map(|address| match address {

            IpAddr::V4(address) => Some(address),
            IpAddr::V6(_) => None,

        }).ok_or_else(|| ProbeError::ResolverIpLookup(host.to_string()))
    }

    fn lookup_name(&self, address: Ipv4Addr) -> Result<String, ProbeError> {
        dns_lookup::lookup_addr(&(IpAddr::V4(address))).map_err(|_| {
            ProbeError::ResolverDomainLookup(address.to_string())
        })
    }
}

/// What the caller asked to probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Address(Ipv4Addr),
    Name(String),
}

impl Target {
    pub fn parse(target: &str) -> Target {
        match target.trim().parse::<Ipv4Addr>() {

            Ok(address) => Target::Address(address),
            Err(_) => Target::Name(target.trim().to_string()),
        }
    }
}

/// A target's display name and, when it resolved, its address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved { host: String, address: Ipv4Addr },
    Unresolved { host: String },
}

/// Resolve `target` for probing.
///
/// A literal address is looked up in reverse for a display name and falls back
/// to its own text. A name that does not resolve is reported, not an error.
pub fn resolve(resolver: &dyn Resolver, target: &str) -> Resolution {
    match Target::parse(target) {

        Target::Address(address) => Resolution::Resolved {
            host: resolver.lookup_name(address).unwrap_or_else(|_| address.to_string()),
            address: address,
        },

        Target::Name(host) => match resolver.lookup_address(&host) {

            Ok(address) => Resolution::Resolved { host, address },

            Err(e) => {
                tracing::warn!(error = %e, "name resolution failed");
                Resolution::Unresolved { host }
            }
        },
    }
}

/// Address of the interface used for outbound traffic, `127.0.0.1` if there is none.
///
/// Connecting a datagram socket sends nothing, it only selects a route.
pub fn primary_address() -> Ipv4Addr {
    fn route_source() -> std::io::Result<Option<Ipv4Addr>> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, None)?;
        socket.connect(&(SocketAddrV4::new(Ipv4Addr::new(10, 255, 255, 255), 1).into()))?;

        Ok(socket.local_addr()?
            .as_socket_ipv4()
            .map(|address| *address.ip())
            .filter(|address| !address.is_unspecified()))
    }

    match route_source() {

        Ok(Some(address)) => address,
        _ => Ipv4Addr::LOCALHOST,
    }
}
