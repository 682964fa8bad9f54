// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Projection of one session record into its wire representation.

use std::time::Instant;

use bytes::{Buf, BufMut};
use tracing::error;

use net::{TransportAddrV4, TransportAddrV6};
use sessiondb::{SessionEntry, SessionState};

use crate::error::ChannelError;

/// Serialized size of one [`SessionView`] record.
///
/// Two IPv6 transport addresses, two IPv4 transport addresses, the state
/// tag and the dying time, packed back to back. Field order is the
/// compatibility contract with the userspace client.
pub const SESSION_VIEW_WIRE_SIZE: usize = (16 + 2) * 2 + (4 + 2) * 2 + 1 + 8;

/// Wire-safe snapshot of one session, as exported to userspace.
///
/// Derived from a [`SessionEntry`] at a given instant; immutable once
/// produced and owning no resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    src6: TransportAddrV6,
    dst6: TransportAddrV6,
    src4: TransportAddrV4,
    dst4: TransportAddrV4,
    state: SessionState,
    dying_time_ms: u64,
}

impl SessionView {
    /// Project a session record at monotonic time `now`.
    ///
    /// The dying time is the remainder of the record's timeout: zero once
    /// the deadline has passed (the record is "expiring now" but not yet
    /// reaped, and omitting it would make a dump disagree with a concurrent
    /// count), the exact remaining milliseconds otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::MissingExpirer`] for a record with no
    /// expirer attached. That is a storage invariant violation, fatal for
    /// the whole enumeration pass rather than skippable.
    pub fn project(entry: &SessionEntry, now: Instant) -> Result<Self, ChannelError> {
        let Some(expirer) = entry.expirer() else {
            error!(
                "session {}|{} has no expirer attached",
                entry.dst4(),
                entry.src4()
            );
            return Err(ChannelError::MissingExpirer);
        };
        let deadline = entry.update_time() + expirer.timeout();
        let dying_time_ms = if deadline > now {
            u64::try_from((deadline - now).as_millis()).unwrap_or(u64::MAX)
        } else {
            0
        };
        Ok(Self {
            src6: entry.src6(),
            dst6: entry.dst6(),
            src4: entry.src4(),
            dst4: entry.dst4(),
            state: entry.state(),
            dying_time_ms,
        })
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
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn dying_time_ms(&self) -> u64 {
        self.dying_time_ms
    }

    /// Serialize the record into its fixed wire layout.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SESSION_VIEW_WIRE_SIZE] {
        let mut bytes = [0u8; SESSION_VIEW_WIRE_SIZE];
        let mut buf = &mut bytes[..];
        put_v6(&mut buf, self.src6);
        put_v6(&mut buf, self.dst6);
        put_v4(&mut buf, self.src4);
        put_v4(&mut buf, self.dst4);
        buf.put_u8(self.state.into());
        buf.put_u64(self.dying_time_ms);
        bytes
    }

    /// Parse one record off a payload, as the client side does.
    ///
    /// Returns `None` when fewer than [`SESSION_VIEW_WIRE_SIZE`] bytes
    /// remain, or when the state tag is not a known lifecycle state.
    #[must_use]
    pub fn try_decode(buf: &mut impl Buf) -> Option<Self> {
        if buf.remaining() < SESSION_VIEW_WIRE_SIZE {
            return None;
        }
        let src6 = get_v6(buf);
        let dst6 = get_v6(buf);
        let src4 = get_v4(buf);
        let dst4 = get_v4(buf);
        let state = SessionState::try_from(buf.get_u8()).ok()?;
        let dying_time_ms = buf.get_u64();
        Some(Self {
            src6,
            dst6,
            src4,
            dst4,
            state,
            dying_time_ms,
        })
    }
}

fn put_v6(buf: &mut impl BufMut, addr: TransportAddrV6) {
    buf.put_slice(&addr.addr().octets());
    buf.put_u16(addr.port());
}

fn put_v4(buf: &mut impl BufMut, addr: TransportAddrV4) {
    buf.put_slice(&addr.addr().octets());
    buf.put_u16(addr.port());
}

fn get_v6(buf: &mut impl Buf) -> TransportAddrV6 {
    let mut octets = [0u8; 16];
    buf.copy_to_slice(&mut octets);
    TransportAddrV6::new(octets.into(), buf.get_u16())
}

fn get_v4(buf: &mut impl Buf) -> TransportAddrV4 {
    let mut octets = [0u8; 4];
    buf.copy_to_slice(&mut octets);
    TransportAddrV4::new(octets.into(), buf.get_u16())
}
