// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Session request messages: operation header plus fixed-size body.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::debug;

use net::{L4Proto, TransportAddrV4};
use sessiondb::SessionKey;

use crate::error::ChannelError;

/// Size of the operation header preceding the request body.
pub const OPERATION_HEADER_SIZE: usize = 2;

/// Exact size of a [`SessionRequest`] body on the wire.
///
/// Protocol tag, resume flag, then the resume key's two IPv4 transport
/// addresses (present but ignored when the flag is clear).
pub const SESSION_REQUEST_SIZE: usize = 1 + 1 + (4 + 2) * 2;

/// The operations the session subsystem understands.
///
/// A closed set: the control protocol is versioned, and a code outside it
/// means a client/server mismatch, reported as
/// [`ChannelError::UnknownOperation`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Display = 0,
    Count = 1,
}

impl TryFrom<u16> for Operation {
    type Error = ChannelError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Display),
            1 => Ok(Operation::Count),
            v => Err(ChannelError::UnknownOperation(v)),
        }
    }
}

/// A parsed Display/Count request body.
///
/// `resume` marks "start strictly after this `(remote4, local4)` pair"; a
/// request without one enumerates from the beginning of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRequest {
    proto: L4Proto,
    resume: Option<SessionKey>,
}

impl SessionRequest {
    #[must_use]
    pub const fn new(proto: L4Proto, resume: Option<SessionKey>) -> Self {
        Self { proto, resume }
    }

    #[must_use]
    pub const fn proto(&self) -> L4Proto {
        self.proto
    }

    #[must_use]
    pub const fn resume(&self) -> Option<SessionKey> {
        self.resume
    }

    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::MalformedRequest`] when the body size is not
    /// exactly [`SESSION_REQUEST_SIZE`] or a field tag is invalid. The
    /// handler must reject such a request before touching the table.
    pub fn decode(body: &[u8]) -> Result<Self, ChannelError> {
        if body.len() != SESSION_REQUEST_SIZE {
            debug!(
                "bad session request size: expected {SESSION_REQUEST_SIZE} bytes, got {}",
                body.len()
            );
            return Err(ChannelError::MalformedRequest);
        }
        let mut buf = body;
        let proto = L4Proto::try_from(buf.get_u8()).map_err(|e| {
            debug!("bad session request: {e}");
            ChannelError::MalformedRequest
        })?;
        let resume_set = buf.get_u8() != 0;
        let remote4 = get_v4(&mut buf);
        let local4 = get_v4(&mut buf);
        let resume = resume_set.then(|| SessionKey::new(remote4, local4));
        Ok(Self { proto, resume })
    }

    /// Serialize the full message (header plus body), as the client does.
    #[must_use]
    pub fn encode(&self, op: Operation) -> Bytes {
        let mut buf = BytesMut::with_capacity(OPERATION_HEADER_SIZE + SESSION_REQUEST_SIZE);
        buf.put_u16(op as u16);
        buf.put_u8(self.proto.into());
        buf.put_u8(u8::from(self.resume.is_some()));
        let (remote4, local4) = match self.resume {
            Some(key) => (key.remote4(), key.local4()),
            None => {
                let zero = TransportAddrV4::new(std::net::Ipv4Addr::UNSPECIFIED, 0);
                (zero, zero)
            }
        };
        put_v4(&mut buf, remote4);
        put_v4(&mut buf, local4);
        buf.freeze()
    }
}

fn put_v4(buf: &mut impl BufMut, addr: TransportAddrV4) {
    buf.put_slice(&addr.addr().octets());
    buf.put_u16(addr.port());
}

fn get_v4(buf: &mut impl Buf) -> TransportAddrV4 {
    let mut octets = [0u8; 4];
    buf.copy_to_slice(&mut octets);
    TransportAddrV4::new(octets.into(), buf.get_u16())
}
