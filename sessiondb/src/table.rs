// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The session table proper: one ordered tree per transport protocol.

use std::collections::BTreeMap;
use std::ops::{Bound, ControlFlow};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, warn};

use net::{L4Proto, TransportAddrV4};

use crate::entry::SessionEntry;
use crate::expire::ExpirerSet;

/// Pagination key of a session within one protocol's tree.
///
/// `(remote4, local4)` is the `(dst4, src4)` pair of the entry: the remote
/// IPv4 host and the translator's own pool address. It uniquely identifies a
/// session for a given protocol, and its derived ordering is the canonical
/// enumeration order the control channel resumes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    remote4: TransportAddrV4,
    local4: TransportAddrV4,
}

impl SessionKey {
    #[must_use]
    pub const fn new(remote4: TransportAddrV4, local4: TransportAddrV4) -> Self {
        Self { remote4, local4 }
    }

    #[must_use]
    pub const fn remote4(&self) -> TransportAddrV4 {
        self.remote4
    }

    #[must_use]
    pub const fn local4(&self) -> TransportAddrV4 {
        self.local4
    }
}

impl From<&SessionEntry> for SessionKey {
    fn from(entry: &SessionEntry) -> Self {
        Self::new(entry.dst4(), entry.src4())
    }
}

/// How a [`SessionDb::foreach`] walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The whole (remaining) table was visited.
    Done,
    /// The callback broke out early; more entries remain past the last one
    /// it accepted.
    Stopped,
}

type Tree = RwLock<BTreeMap<SessionKey, SessionEntry>>;

/// The session table of one stateful translator instance.
///
/// Writers (the forwarding path) and readers (the control plane) contend
/// only on the tree of one protocol, and readers share the lock. A reader
/// walking the table is expected to stop within a bounded number of entries
/// (see [`SessionDb::foreach`]), so no lock is ever held for a duration
/// proportional to the table size.
#[derive(Debug, Default)]
pub struct SessionDb {
    expirers: ExpirerSet,
    tcp: Tree,
    udp: Tree,
    icmp: Tree,
    /// Number of `foreach` walks started, for instrumentation.
    walks: AtomicU64,
}

impl SessionDb {
    #[must_use]
    pub fn new(expirers: ExpirerSet) -> Self {
        Self {
            expirers,
            ..Self::default()
        }
    }

    fn tree(&self, proto: L4Proto) -> &Tree {
        match proto {
            L4Proto::Tcp => &self.tcp,
            L4Proto::Udp => &self.udp,
            L4Proto::Icmp => &self.icmp,
        }
    }

    /// Store a session, attaching the expirer for its lifecycle class.
    ///
    /// Returns the previous entry stored under the same `(remote4, local4)`
    /// key, if any.
    pub fn insert(&self, mut entry: SessionEntry) -> Option<SessionEntry> {
        let expirer = self.expirers.for_session(entry.proto(), entry.state());
        entry.attach_expirer(expirer.clone());
        let key = SessionKey::from(&entry);
        debug!("insert: {} session {}|{}", entry.proto(), key.remote4(), key.local4());
        self.tree(entry.proto()).write().insert(key, entry)
    }

    /// Store a session exactly as given, preserving its update stamp and
    /// whatever expirer it already carries.
    ///
    /// This is the restore path for sessions synced in from another
    /// translator instance rather than created by the local forwarding
    /// path. It performs no invariant repair: a restored entry without an
    /// expirer stays corrupt and will be rejected at export time.
    pub fn restore(&self, entry: SessionEntry) -> Option<SessionEntry> {
        let key = SessionKey::from(&entry);
        self.tree(entry.proto()).write().insert(key, entry)
    }

    /// Look up one session by its pagination key.
    #[must_use]
    pub fn lookup(&self, proto: L4Proto, key: &SessionKey) -> Option<SessionEntry> {
        self.tree(proto).read().get(key).cloned()
    }

    /// Remove one session. Returns the entry if it was present.
    pub fn remove(&self, proto: L4Proto, key: &SessionKey) -> Option<SessionEntry> {
        self.tree(proto).write().remove(key)
    }

    /// Number of live sessions for one protocol.
    #[must_use]
    pub fn count(&self, proto: L4Proto) -> u64 {
        self.tree(proto).read().len() as u64
    }

    /// Walk the sessions of `proto` in key order, starting strictly after
    /// `resume` when one is given.
    ///
    /// The callback decides per entry whether the walk goes on:
    /// `Ok(Continue)` keeps walking, `Ok(Break)` stops early (reported as
    /// [`WalkOutcome::Stopped`], meaning more entries remain), and `Err`
    /// abandons the walk and propagates. The protocol tree's read lock is
    /// held for the duration of the walk, so callers must break out after a
    /// bounded number of entries.
    ///
    /// # Errors
    ///
    /// Returns the first error the callback returns.
    pub fn foreach<E>(
        &self,
        proto: L4Proto,
        resume: Option<SessionKey>,
        mut cb: impl FnMut(&SessionEntry) -> Result<ControlFlow<()>, E>,
    ) -> Result<WalkOutcome, E> {
        self.walks.fetch_add(1, Ordering::Relaxed);
        let tree = self.tree(proto).read();
        let start = match resume {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        let range = tree.range((start, Bound::Unbounded));
        for entry in range.map(|(_, entry)| entry) {
            if cb(entry)?.is_break() {
                return Ok(WalkOutcome::Stopped);
            }
        }
        Ok(WalkOutcome::Done)
    }

    /// Number of `foreach` walks started since the table was created.
    #[must_use]
    pub fn walks(&self) -> u64 {
        self.walks.load(Ordering::Relaxed)
    }

    /// Sweep out every session whose deadline is at or before `now`.
    ///
    /// Corrupt entries with no expirer are left in place and logged; they
    /// have no deadline to compare against and deleting them would hide the
    /// storage bug they indicate.
    pub fn remove_expired(&self, now: Instant) -> usize {
        let mut removed = 0;
        for proto in [L4Proto::Tcp, L4Proto::Udp, L4Proto::Icmp] {
            let mut tree = self.tree(proto).write();
            tree.retain(|key, entry| match entry.deadline() {
                Some(deadline) if deadline <= now => {
                    removed += 1;
                    false
                }
                Some(_) => true,
                None => {
                    warn!("remove_expired: {proto} session {}|{} has no expirer", key.remote4(), key.local4());
                    true
                }
            });
        }
        if removed > 0 {
            debug!("remove_expired: reaped {removed} sessions");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::SessionState;
    use net::TransportAddrV6;
    use pretty_assertions::assert_eq;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    fn tcp_entry(remote_host: u8, remote_port: u16) -> SessionEntry {
        SessionEntry::new(
            TransportAddrV6::new(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1), 40000),
            TransportAddrV6::new(
                Ipv6Addr::new(0x64, 0xff9b, 0, 0, 0, 0, 0, u16::from(remote_host)),
                remote_port,
            ),
            TransportAddrV4::new(Ipv4Addr::new(192, 0, 2, 1), 61000 + remote_port),
            TransportAddrV4::new(Ipv4Addr::new(203, 0, 113, remote_host), remote_port),
            L4Proto::Tcp,
            SessionState::Established,
        )
    }

    fn keys_of_walk(db: &SessionDb, resume: Option<SessionKey>) -> Vec<SessionKey> {
        let mut keys = Vec::new();
        let outcome = db.foreach::<()>(L4Proto::Tcp, resume, |entry| {
            keys.push(SessionKey::from(entry));
            Ok(ControlFlow::Continue(()))
        });
        assert_eq!(outcome, Ok(WalkOutcome::Done));
        keys
    }

    #[test]
    fn insert_attaches_expirer() {
        let db = SessionDb::default();
        db.insert(tcp_entry(6, 80));
        let key = SessionKey::from(&tcp_entry(6, 80));
        let stored = db.lookup(L4Proto::Tcp, &key).unwrap();
        assert_eq!(stored.expirer().unwrap().label(), "tcp-est");
    }

    #[test]
    fn count_is_per_protocol() {
        let db = SessionDb::default();
        db.insert(tcp_entry(6, 80));
        db.insert(tcp_entry(6, 443));
        assert_eq!(db.count(L4Proto::Tcp), 2);
        assert_eq!(db.count(L4Proto::Udp), 0);
    }

    #[test]
    fn reinsert_returns_old_entry() {
        let db = SessionDb::default();
        assert!(db.insert(tcp_entry(6, 80)).is_none());
        let old = db.insert(tcp_entry(6, 80)).unwrap();
        assert_eq!(old.dst4().port(), 80);
        assert_eq!(db.count(L4Proto::Tcp), 1);
    }

    #[test]
    fn walk_is_in_key_order() {
        let db = SessionDb::default();
        for (host, port) in [(9, 80), (6, 443), (6, 80), (12, 22)] {
            db.insert(tcp_entry(host, port));
        }
        let keys = keys_of_walk(&db, None);
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn resume_is_strictly_after_the_key() {
        let db = SessionDb::default();
        for port in [80, 443, 8080] {
            db.insert(tcp_entry(6, port));
        }
        let all = keys_of_walk(&db, None);
        let rest = keys_of_walk(&db, Some(all[0]));
        assert_eq!(rest, all[1..].to_vec());
        let none = keys_of_walk(&db, Some(all[2]));
        assert!(none.is_empty());
    }

    #[test]
    fn callback_break_stops_the_walk() {
        let db = SessionDb::default();
        for port in [80, 443, 8080] {
            db.insert(tcp_entry(6, port));
        }
        let mut seen = 0;
        let outcome = db.foreach::<()>(L4Proto::Tcp, None, |_| {
            seen += 1;
            Ok(if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        });
        assert_eq!(outcome, Ok(WalkOutcome::Stopped));
        assert_eq!(seen, 2);
    }

    #[test]
    fn callback_error_abandons_the_walk() {
        let db = SessionDb::default();
        for port in [80, 443] {
            db.insert(tcp_entry(6, port));
        }
        let outcome = db.foreach(L4Proto::Tcp, None, |_| Err("boom"));
        assert_eq!(outcome, Err("boom"));
    }

    #[test]
    fn foreach_bumps_the_walk_counter() {
        let db = SessionDb::default();
        assert_eq!(db.walks(), 0);
        let _ = db.foreach::<()>(L4Proto::Udp, None, |_| Ok(ControlFlow::Continue(())));
        assert_eq!(db.walks(), 1);
    }

    #[test]
    fn remove_expired_reaps_past_deadlines() {
        // Zero-length timeouts for everything TCP: entries expire on insert.
        let db = SessionDb::new(ExpirerSet::new(
            Duration::from_secs(300),
            Duration::from_secs(60),
            Duration::ZERO,
            Duration::ZERO,
        ));
        db.insert(tcp_entry(6, 80));
        db.insert(tcp_entry(6, 443));
        let removed = db.remove_expired(Instant::now());
        assert_eq!(removed, 2);
        assert_eq!(db.count(L4Proto::Tcp), 0);
    }

    #[test]
    fn restore_preserves_the_missing_expirer() {
        let db = SessionDb::default();
        db.restore(tcp_entry(6, 80));
        let key = SessionKey::from(&tcp_entry(6, 80));
        let stored = db.lookup(L4Proto::Tcp, &key).unwrap();
        assert!(stored.expirer().is_none());
        // The sweep must not silently eat the corrupt entry either.
        assert_eq!(db.remove_expired(Instant::now()), 0);
        assert_eq!(db.count(L4Proto::Tcp), 1);
    }

    #[test]
    fn remove_expired_keeps_live_sessions() {
        let db = SessionDb::default();
        db.insert(tcp_entry(6, 80));
        assert_eq!(db.remove_expired(Instant::now()), 0);
        assert_eq!(db.count(L4Proto::Tcp), 1);
    }
}
