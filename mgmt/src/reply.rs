// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reply envelope: one per request, success or error.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ChannelError;

/// Envelope size on the wire: signed code plus a flags byte.
pub const REPLY_HEADER_SIZE: usize = 5;

const FLAG_PENDING: u8 = 0x01;

/// The single reply produced for a control message.
///
/// Wire layout: big-endian `i32` code (`0` on success, a negative
/// errno-style value on error), one flags byte (bit 0: more data pending),
/// then the payload. Error replies never carry a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: i32,
    pending: bool,
    payload: Bytes,
}

impl Reply {
    #[must_use]
    pub fn error(error: &ChannelError) -> Self {
        Self {
            code: error.wire_code(),
            pending: false,
            payload: Bytes::new(),
        }
    }

    #[must_use]
    pub(crate) fn success(payload: Bytes, pending: bool) -> Self {
        Self {
            code: 0,
            pending,
            payload,
        }
    }

    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.code != 0
    }

    #[must_use]
    pub const fn pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Serialize the envelope and payload.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(REPLY_HEADER_SIZE + self.payload.len());
        buf.put_i32(self.code);
        buf.put_u8(if self.pending { FLAG_PENDING } else { 0 });
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Parse an envelope off the wire, as the client side does.
    ///
    /// Returns `None` when `raw` is shorter than the envelope header.
    #[must_use]
    pub fn try_decode(raw: &[u8]) -> Option<Self> {
        if raw.len() < REPLY_HEADER_SIZE {
            return None;
        }
        let mut buf = raw;
        let code = buf.get_i32();
        let flags = buf.get_u8();
        Some(Self {
            code,
            pending: flags & FLAG_PENDING != 0,
            payload: Bytes::copy_from_slice(buf),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NEG_EPERM;

    #[test]
    fn error_reply_has_no_payload() {
        let reply = Reply::error(&ChannelError::PermissionDenied);
        assert_eq!(reply.code(), NEG_EPERM);
        assert!(reply.is_error());
        assert!(reply.payload().is_empty());
        assert_eq!(reply.to_bytes().len(), REPLY_HEADER_SIZE);
    }

    #[test]
    fn envelope_round_trip() {
        let reply = Reply::success(Bytes::from_static(&[0xaa, 0xbb]), true);
        let decoded = Reply::try_decode(&reply.to_bytes()).unwrap();
        assert_eq!(decoded, reply);
        assert!(decoded.pending());
        assert_eq!(decoded.payload().as_ref(), &[0xaa, 0xbb]);
    }

    #[test]
    fn truncated_envelope_does_not_decode() {
        assert!(Reply::try_decode(&[0, 0, 0]).is_none());
    }
}
