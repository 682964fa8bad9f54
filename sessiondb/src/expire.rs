// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Shared session timeout policies.

use std::sync::Arc;
use std::time::Duration;

use net::L4Proto;

use crate::entry::SessionState;

/// Default timeout for UDP sessions (RFC 6146 recommends at least 5 minutes).
pub const UDP_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Default timeout for ICMP sessions.
pub const ICMP_TIMEOUT: Duration = Duration::from_secs(60);
/// Default timeout for established TCP sessions.
pub const TCP_EST_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);
/// Default timeout for transitory TCP sessions (handshake and teardown).
pub const TCP_TRANS_TIMEOUT: Duration = Duration::from_secs(4 * 60);

/// A timeout policy shared by every session of one lifecycle class.
///
/// Sessions hold their expirer by `Arc`; the deadline of a session is
/// `update_time + expirer.timeout()`.
#[derive(Debug)]
pub struct Expirer {
    label: &'static str,
    timeout: Duration,
}

impl Expirer {
    #[must_use]
    pub const fn new(label: &'static str, timeout: Duration) -> Self {
        Self { label, timeout }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// The four expirers a stateful translator runs with.
#[derive(Debug)]
pub struct ExpirerSet {
    udp: Arc<Expirer>,
    icmp: Arc<Expirer>,
    tcp_est: Arc<Expirer>,
    tcp_trans: Arc<Expirer>,
}

impl Default for ExpirerSet {
    fn default() -> Self {
        Self::new(UDP_TIMEOUT, ICMP_TIMEOUT, TCP_EST_TIMEOUT, TCP_TRANS_TIMEOUT)
    }
}

impl ExpirerSet {
    #[must_use]
    pub fn new(udp: Duration, icmp: Duration, tcp_est: Duration, tcp_trans: Duration) -> Self {
        Self {
            udp: Arc::new(Expirer::new("udp", udp)),
            icmp: Arc::new(Expirer::new("icmp", icmp)),
            tcp_est: Arc::new(Expirer::new("tcp-est", tcp_est)),
            tcp_trans: Arc::new(Expirer::new("tcp-trans", tcp_trans)),
        }
    }

    /// The expirer governing a session of the given protocol and state.
    #[must_use]
    pub fn for_session(&self, proto: L4Proto, state: SessionState) -> &Arc<Expirer> {
        match proto {
            L4Proto::Udp => &self.udp,
            L4Proto::Icmp => &self.icmp,
            L4Proto::Tcp => match state {
                SessionState::Established => &self.tcp_est,
                _ => &self.tcp_trans,
            },
        }
    }
}
