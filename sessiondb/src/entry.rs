// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Session records.

use std::sync::Arc;
use std::time::Instant;

use net::{L4Proto, TransportAddrV4, TransportAddrV6};

use crate::expire::Expirer;

#[derive(Debug, thiserror::Error)]
pub enum SessionStateError {
    #[error("no such session state: {0}")]
    NoSuchState(u8),
}

/// Protocol lifecycle tag of a session.
///
/// TCP sessions move through the handshake and teardown states; UDP and ICMP
/// sessions sit in [`SessionState::Established`] for their whole life. The
/// `u8` discriminants are the wire tags exported to userspace.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Established = 0,
    V4Init = 1,
    V6Init = 2,
    V4FinRcv = 3,
    V6FinRcv = 4,
    V4FinV6FinRcv = 5,
    Trans = 6,
}

impl TryFrom<u8> for SessionState {
    type Error = SessionStateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SessionState::Established),
            1 => Ok(SessionState::V4Init),
            2 => Ok(SessionState::V6Init),
            3 => Ok(SessionState::V4FinRcv),
            4 => Ok(SessionState::V6FinRcv),
            5 => Ok(SessionState::V4FinV6FinRcv),
            6 => Ok(SessionState::Trans),
            v => Err(SessionStateError::NoSuchState(v)),
        }
    }
}

impl From<SessionState> for u8 {
    fn from(state: SessionState) -> Self {
        state as u8
    }
}

/// One tracked NAT64 translation: an IPv6 endpoint pair mapped to an IPv4
/// endpoint pair for one transport protocol.
///
/// `src6`/`dst6` are the endpoints as seen on the IPv6 side; `src4`/`dst4`
/// are their translations on the IPv4 side (`src4` is the translator's own
/// pool address, `dst4` the remote IPv4 host).
///
/// A freshly built entry has no expirer; [`crate::SessionDb::insert`]
/// attaches the one matching the entry's lifecycle class. Outside that
/// window, an entry without an expirer is corrupt and must not be exported.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    src6: TransportAddrV6,
    dst6: TransportAddrV6,
    src4: TransportAddrV4,
    dst4: TransportAddrV4,
    proto: L4Proto,
    state: SessionState,
    update_time: Instant,
    expirer: Option<Arc<Expirer>>,
}

impl SessionEntry {
    #[must_use]
    pub fn new(
        src6: TransportAddrV6,
        dst6: TransportAddrV6,
        src4: TransportAddrV4,
        dst4: TransportAddrV4,
        proto: L4Proto,
        state: SessionState,
    ) -> Self {
        Self {
            src6,
            dst6,
            src4,
            dst4,
            proto,
            state,
            update_time: Instant::now(),
            expirer: None,
        }
    }

    #[must_use]
    pub const fn src6(&self) -> TransportAddrV6 {
        self.src6
    }

    #[must_use]
    pub const fn dst6(&self) -> TransportAddrV6 {
        self.dst6
    }

    #[must_use]
    pub const fn src4(&self) -> TransportAddrV4 {
        self.src4
    }

    #[must_use]
    pub const fn dst4(&self) -> TransportAddrV4 {
        self.dst4
    }

    #[must_use]
    pub const fn proto(&self) -> L4Proto {
        self.proto
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn update_time(&self) -> Instant {
        self.update_time
    }

    #[must_use]
    pub fn expirer(&self) -> Option<&Arc<Expirer>> {
        self.expirer.as_ref()
    }

    pub(crate) fn attach_expirer(&mut self, expirer: Arc<Expirer>) {
        self.expirer = Some(expirer);
    }

    /// Refresh the entry's last-update stamp, as the forwarding path does
    /// when it translates a packet of this session.
    pub fn touch(&mut self, now: Instant) {
        self.update_time = now;
    }

    /// The instant this session becomes eligible for removal, or `None` for
    /// a corrupt entry with no expirer.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        let expirer = self.expirer.as_ref()?;
        Some(self.update_time + expirer.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    fn entry() -> SessionEntry {
        SessionEntry::new(
            TransportAddrV6::new(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1), 40000),
            TransportAddrV6::new(Ipv6Addr::new(0x64, 0xff9b, 0, 0, 0, 0, 0, 0x102), 80),
            TransportAddrV4::new(Ipv4Addr::new(192, 0, 2, 1), 61001),
            TransportAddrV4::new(Ipv4Addr::new(203, 0, 113, 6), 80),
            L4Proto::Tcp,
            SessionState::Established,
        )
    }

    #[test]
    fn new_entry_has_no_expirer() {
        let entry = entry();
        assert!(entry.expirer().is_none());
        assert!(entry.deadline().is_none());
    }

    #[test]
    fn deadline_is_update_time_plus_timeout() {
        let mut entry = entry();
        entry.attach_expirer(Arc::new(Expirer::new("test", Duration::from_secs(30))));
        let deadline = entry.deadline().unwrap();
        assert_eq!(deadline, entry.update_time() + Duration::from_secs(30));
    }

    #[test]
    fn state_tag_round_trip() {
        for tag in 0u8..=6 {
            let state = SessionState::try_from(tag).unwrap();
            assert_eq!(u8::from(state), tag);
        }
        assert!(SessionState::try_from(7).is_err());
    }
}
