// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]

//! Shared network types for the NAT64 translator
//!
//! Transport addresses (an IP address paired with a port) and the transport
//! protocol selector used to key and filter the session table. Both sides of
//! the control channel depend on these, so they live in their own crate.

pub mod addr;
pub mod proto;

pub use addr::{TransportAddrV4, TransportAddrV6};
pub use proto::L4Proto;
