//! Network allow-list guarding the admin page.
//!
//! This is a convenience fence for a home network, not authentication.

use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("invalid network {0:?}: expected address/prefix")]
    InvalidNetwork(String),
}

/// An IPv4 or IPv6 network in CIDR form, e.g. `192.168.31.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpNetwork {
    addr: IpAddr,
    prefix: u8,
}

impl FromStr for IpNetwork {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AccessError::InvalidNetwork(s.to_string());
        let (addr, prefix) = s.trim().split_once('/').ok_or_else(invalid)?;
        let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        let max = if addr.is_ipv4() { 32 } else { 128 };
        if prefix > max {
            return Err(invalid());
        }
        Ok(Self { addr, prefix })
    }
}

impl IpNetwork {
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, canonical(ip)) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = u128::MAX.checked_shl(128 - u32::from(self.prefix)).unwrap_or(0);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

// `::ffff:a.b.c.d` from dual-stack listeners compares as IPv4
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

#[derive(Debug, Clone, Default)]
pub struct NetworkAllowList {
    networks: Vec<IpNetwork>,
}

impl NetworkAllowList {
    pub fn from_cidrs<I, S>(cidrs: I) -> Result<Self, AccessError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let networks = cidrs
            .into_iter()
            .map(|c| c.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { networks })
    }

    pub fn allows(&self, ip: IpAddr) -> bool {
        self.networks.iter().any(|net| net.contains(ip))
    }
}

/// Middleware: only peers inside the configured networks reach the admin page.
pub async fn require_admin_network(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    if !state.admin_networks.allows(peer.ip()) {
        warn!(peer = %peer.ip(), path = %req.uri().path(), "admin access denied");
        return (StatusCode::FORBIDDEN, "Access denied: local network only.").into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn ipv4_subnet_membership() {
        let net: IpNetwork = "192.168.31.0/24".parse().unwrap();
        assert!(net.contains(ip("192.168.31.1")));
        assert!(net.contains(ip("192.168.31.255")));
        assert!(!net.contains(ip("192.168.32.1")));
        assert!(!net.contains(ip("10.0.0.1")));
        assert!(net.contains(ip("::ffff:192.168.31.7")));
    }

    #[test]
    fn prefix_edges() {
        let all: IpNetwork = "0.0.0.0/0".parse().unwrap();
        assert!(all.contains(ip("8.8.8.8")));
        assert!(!all.contains(ip("::1")));

        let host: IpNetwork = "10.1.2.3/32".parse().unwrap();
        assert!(host.contains(ip("10.1.2.3")));
        assert!(!host.contains(ip("10.1.2.4")));

        let v6: IpNetwork = "fd00::/8".parse().unwrap();
        assert!(v6.contains(ip("fd12:3456::1")));
        assert!(!v6.contains(ip("fe80::1")));
    }

    #[test]
    fn rejects_malformed_networks() {
        for bad in ["192.168.31.*", "192.168.31.0", "192.168.31.0/33", "::1/129", "host/8", ""] {
            assert!(bad.parse::<IpNetwork>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn allow_list_checks_every_network() {
        let list = NetworkAllowList::from_cidrs(["192.168.31.0/24", "127.0.0.0/8"]).unwrap();
        assert!(list.allows(ip("127.0.0.1")));
        assert!(list.allows(ip("192.168.31.40")));
        assert!(!list.allows(ip("192.168.1.40")));
        assert!(!NetworkAllowList::default().allows(ip("127.0.0.1")));
        assert!(NetworkAllowList::from_cidrs(["nope"]).is_err());
    }
}
