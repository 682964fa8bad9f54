// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]

//! NAT64 session table
//!
//! One [`SessionDb`] tracks the live IPv6↔IPv4 translation sessions of a
//! stateful translator, one ordered tree per transport protocol. The
//! forwarding path inserts and refreshes entries at packet rate; the control
//! plane reads them through [`SessionDb::foreach`], a resumable, filtered
//! walk that never holds a tree lock for longer than one bounded page.
//!
//! Every stored entry carries an [`Expirer`], the shared timeout policy for
//! its lifecycle class. An entry without one is corrupt and is rejected by
//! consumers rather than given a default timeout.

pub mod entry;
pub mod expire;
pub mod table;

pub use entry::{SessionEntry, SessionState};
pub use expire::{Expirer, ExpirerSet};
pub use table::{SessionDb, SessionKey, WalkOutcome};
