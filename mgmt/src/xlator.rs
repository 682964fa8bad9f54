// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Translator instance handles and per-request channel context.

use std::sync::Arc;

use sessiondb::SessionDb;

/// Default maximum reply size, in bytes.
///
/// Matches the one-page responses kernel-style control channels negotiate;
/// the real limit comes from [`ChannelConfig`] at runtime.
pub const DEFAULT_MAX_REPLY_SIZE: usize = 4096;

/// A handle on one running translator instance.
///
/// A stateful (NAT64) instance owns a session table; a stateless (SIIT)
/// instance translates addresses by prefix only and has none, so every
/// session operation against it is rejected outright.
#[derive(Debug)]
pub struct Xlator {
    sessions: Option<Arc<SessionDb>>,
}

impl Xlator {
    /// A stateful instance with a fresh session table.
    #[must_use]
    pub fn nat64() -> Self {
        Self::nat64_with(Arc::new(SessionDb::default()))
    }

    /// A stateful instance sharing an existing session table.
    #[must_use]
    pub fn nat64_with(sessions: Arc<SessionDb>) -> Self {
        Self {
            sessions: Some(sessions),
        }
    }

    /// A stateless (address-family-only) instance.
    #[must_use]
    pub fn siit() -> Self {
        Self { sessions: None }
    }

    #[must_use]
    pub fn sessions(&self) -> Option<&Arc<SessionDb>> {
        self.sessions.as_ref()
    }

    #[must_use]
    pub fn is_stateless(&self) -> bool {
        self.sessions.is_none()
    }
}

/// Per-request caller context, as supplied by the messaging layer.
///
/// Privilege verification itself happens in the channel underneath (the
/// kernel capability check on the socket); by the time a request reaches
/// the dispatcher it is a settled boolean.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    privileged: bool,
}

impl RequestContext {
    #[must_use]
    pub const fn new(privileged: bool) -> Self {
        Self { privileged }
    }

    #[must_use]
    pub const fn privileged(&self) -> bool {
        self.privileged
    }
}

/// Negotiated channel parameters.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    max_reply_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_reply_size: DEFAULT_MAX_REPLY_SIZE,
        }
    }
}

impl ChannelConfig {
    #[must_use]
    pub const fn new(max_reply_size: usize) -> Self {
        Self { max_reply_size }
    }

    #[must_use]
    pub const fn max_reply_size(&self) -> usize {
        self.max_reply_size
    }
}
