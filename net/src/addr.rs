// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Transport addresses: an IP address paired with a transport port.

use std::fmt::Display;
use std::net::{Ipv4Addr, Ipv6Addr};

/// An IPv4 address and port.
///
/// Ordering is lexicographic on `(addr, port)`; the session table relies on
/// this to keep its trees in a deterministic, resumable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransportAddrV4 {
    addr: Ipv4Addr,
    port: u16,
}

impl TransportAddrV4 {
    #[must_use]
    pub const fn new(addr: Ipv4Addr, port: u16) -> Self {
        Self { addr, port }
    }

    #[must_use]
    pub const fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl Display for TransportAddrV4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.addr, self.port)
    }
}

/// An IPv6 address and port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransportAddrV6 {
    addr: Ipv6Addr,
    port: u16,
}

impl TransportAddrV6 {
    #[must_use]
    pub const fn new(addr: Ipv6Addr, port: u16) -> Self {
        Self { addr, port }
    }

    #[must_use]
    pub const fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl Display for TransportAddrV6 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.addr, self.port)
    }
}
