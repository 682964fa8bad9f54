// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Size-bounded response assembly.

use bytes::Bytes;

use crate::error::ChannelError;
use crate::reply::Reply;

/// Result of one [`ResponseBuffer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Written,
    /// The record did not fit. Nothing was written; the caller should stop
    /// iterating and mark the response as having more data pending.
    WouldOverflow,
}

/// A fixed-capacity outgoing payload buffer.
///
/// The capacity is the channel's negotiated maximum reply size. Records are
/// appended whole or not at all, so a reply payload is always a sequence of
/// complete records. The buffer is owned by one request handler and is
/// released by being dropped or consumed into a [`Reply`], whichever exit
/// path the handler takes.
#[derive(Debug)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    capacity: usize,
    pending: bool,
}

impl ResponseBuffer {
    /// Allocate a buffer of the given capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::BufferAllocationFailed`] if the backing
    /// memory cannot be reserved.
    pub fn new(capacity: usize) -> Result<Self, ChannelError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| ChannelError::BufferAllocationFailed)?;
        Ok(Self {
            data,
            capacity,
            pending: false,
        })
    }

    /// Append one whole record, or refuse without writing anything.
    pub fn push(&mut self, record: &[u8]) -> PushOutcome {
        if self.data.len() + record.len() > self.capacity {
            return PushOutcome::WouldOverflow;
        }
        self.data.extend_from_slice(record);
        PushOutcome::Written
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    #[must_use]
    pub const fn pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Package the (possibly empty) payload as a success reply.
    #[must_use]
    pub fn into_reply(self) -> Reply {
        Reply::success(Bytes::from(self.data), self.pending)
    }
}
