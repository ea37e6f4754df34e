//! Connectivity as seen by the state query.
//!
//! Bringing the network up is the host's job. The controller only needs to
//! know whether it joined an existing network (station) or is serving its
//! own access point, because clients are told the matching address.

use std::net::Ipv4Addr;

/// Address a soft access point hands itself by default.
pub const DEFAULT_ACCESS_POINT_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectivityMode {
    /// Joined an existing network
    Station,
    /// Serving a local access point
    AccessPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkInfo {
    pub mode: ConnectivityMode,
    pub station_ip: Ipv4Addr,
    pub access_point_ip: Ipv4Addr,
}

impl NetworkInfo {
    pub fn station(ip: Ipv4Addr) -> Self {
        Self {
            mode: ConnectivityMode::Station,
            station_ip: ip,
            access_point_ip: DEFAULT_ACCESS_POINT_IP,
        }
    }

    pub fn access_point(ip: Ipv4Addr) -> Self {
        Self {
            mode: ConnectivityMode::AccessPoint,
            station_ip: Ipv4Addr::UNSPECIFIED,
            access_point_ip: ip,
        }
    }

    /// The address clients should use right now.
    pub fn current_ip(&self) -> Ipv4Addr {
        match self.mode {
            ConnectivityMode::Station => self.station_ip,
            ConnectivityMode::AccessPoint => self.access_point_ip,
        }
    }
}

/// Pick the station address to report for a server bound to `host`.
///
/// A wildcard bind says nothing about where clients reach us, so fall back
/// to loopback unless an address was given explicitly.
pub fn advertised_ip(host: Ipv4Addr, advertise: Option<Ipv4Addr>) -> Ipv4Addr {
    match advertise {
        Some(ip) => ip,
        None if host.is_unspecified() => Ipv4Addr::LOCALHOST,
        None => host,
    }
}
