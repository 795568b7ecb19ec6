use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use url::Host;

use crate::error::ScanError;

/// Maps `target` to every socket address it could be reached at on `port`.
///
/// IP literals never hit the resolver. Bare IPv6 literals (`::1`) are
/// accepted as well as the bracketed form (`[::1]`).
pub fn lookup(target: &str, port: u16) -> Result<Vec<SocketAddr>, ScanError> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let addrs = match Host::parse(target).map_err(ScanError::HostParseFailed)? {
        Host::Domain(dmn) => {
            let addrs: Vec<_> = (dmn.as_str(), port)
                .to_socket_addrs()
                .map_err(ScanError::ResolverFailed)?
                .collect();

            if addrs.is_empty() {
                return Err(ScanError::DomainLookupFailed(target.into()));
            }

            log::trace!("Found {} address(es) mapped by target `{}`", addrs.len(), target);

            addrs
        }
        Host::Ipv4(ip) => vec![SocketAddr::new(IpAddr::V4(ip), port)],
        Host::Ipv6(ip) => vec![SocketAddr::new(IpAddr::V6(ip), port)],
    };

    Ok(addrs)
}
