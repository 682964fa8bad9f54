// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]

//! Control channel for the NAT64 session table
//!
//! Privileged userspace asks a running translator about its live sessions
//! through a message-based control channel: a `Display` request streams the
//! table (filtered by transport protocol, paginated by a resume key) as
//! fixed-layout [`SessionView`] records, and a `Count` request returns the
//! number of live sessions. Every request gets exactly one [`Reply`], either
//! a payload or a negative errno-style code.
//!
//! The table itself lives in [`sessiondb`] and is owned by the forwarding
//! path; this crate only ever reads it, one bounded page per request, so a
//! multi-million-entry table never blocks forwarding for longer than it
//! takes to fill one reply buffer.

pub mod buffer;
pub mod error;
pub mod reply;
pub mod request;
pub mod session;
pub mod view;
pub mod xlator;

pub use buffer::{PushOutcome, ResponseBuffer};
pub use error::ChannelError;
pub use reply::Reply;
pub use request::{Operation, SessionRequest};
pub use session::handle_session_request;
pub use view::SessionView;
pub use xlator::{ChannelConfig, RequestContext, Xlator};
