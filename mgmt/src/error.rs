// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Control channel errors and their errno-style wire codes.
//!
//! Error replies carry a single signed code, following the kernel convention
//! of negated `errno.h` values. The typed side is [`ChannelError`]; the wire
//! side is the handful of negative constants below plus whatever opaque code
//! the session table propagates.

/// Operation not permitted, negated.
pub const NEG_EPERM: i32 = -1;
/// Not enough memory, negated.
pub const NEG_ENOMEM: i32 = -12;
/// Invalid argument, negated.
pub const NEG_EINVAL: i32 = -22;

/// Everything that can terminate a session-table request.
///
/// Every variant is terminal for the current request: exactly one error
/// reply is produced and nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("operation not permitted")]
    PermissionDenied,
    #[error("stateless translators keep no session table")]
    NotApplicable,
    #[error("malformed session request")]
    MalformedRequest,
    #[error("unknown session operation: {0}")]
    UnknownOperation(u16),
    #[error("session entry has no expirer attached")]
    MissingExpirer,
    #[error("cannot allocate the response buffer")]
    BufferAllocationFailed,
    #[error("session table fault: {0}")]
    Table(i32),
}

impl ChannelError {
    /// The signed code this error travels as.
    #[must_use]
    pub const fn wire_code(&self) -> i32 {
        match self {
            ChannelError::PermissionDenied => NEG_EPERM,
            ChannelError::BufferAllocationFailed => NEG_ENOMEM,
            ChannelError::NotApplicable
            | ChannelError::MalformedRequest
            | ChannelError::UnknownOperation(_)
            | ChannelError::MissingExpirer => NEG_EINVAL,
            ChannelError::Table(code) => *code,
        }
    }
}
