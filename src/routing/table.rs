//! Live backend set and the lock that guards it.
//!
//! # Responsibilities
//! - Own the current host → backend IPs mapping
//! - Hand out deep copies to readers
//! - Install new tables atomically, skipping the write lock when nothing changed
//! - Run backend selection under the shared lock
//!
//! # Design Decisions
//! - One `RwLock` over the whole set: readers never see a half-installed table
//! - Round-robin cursors live only in `BackendEntry`, never in returned copies
//! - Replacing the table resets every cursor
//! - Hostnames are stored lowercase; lookups are case-insensitive

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::load_balancer::Selector;
use crate::routing::diff::differs;

/// Internal hostname → candidate backend IPs.
///
/// A present key with an empty list means "managed, no live backend";
/// a missing key means "not managed".
pub type RouteTable = HashMap<String, Vec<String>>;

/// Normalize a table for installation.
///
/// Entries with an empty hostname are dropped and hostnames are lowercased.
/// Keys that collide after lowercasing have their IP lists merged.
pub fn sanitize(table: RouteTable) -> RouteTable {
    let mut clean = RouteTable::with_capacity(table.len());
    for (host, ips) in table {
        if host.is_empty() {
            tracing::warn!("Dropping route entry with empty hostname");
            continue;
        }
        clean.entry(host.to_ascii_lowercase()).or_default().extend(ips);
    }
    clean
}

fn lowercase_host(host: &str) -> Cow<'_, str> {
    if host.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(host.to_ascii_lowercase())
    } else {
        Cow::Borrowed(host)
    }
}

fn snapshot_of(set: &BackendSet) -> RouteTable {
    set.entries
        .iter()
        .map(|(host, entry)| (host.clone(), entry.ips.clone()))
        .collect()
}

fn into_entries(table: RouteTable) -> HashMap<String, BackendEntry> {
    table
        .into_iter()
        .map(|(host, ips)| (host, BackendEntry::new(ips)))
        .collect()
}

/// Backends for one internal host, plus its rotation cursor.
#[derive(Debug)]
pub struct BackendEntry {
    ips: Vec<String>,
    cursor: AtomicUsize,
}

impl BackendEntry {
    /// Create an entry with a fresh cursor.
    pub fn new(ips: Vec<String>) -> Self {
        Self {
            ips,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Candidate IPs in their stored order.
    pub fn ips(&self) -> &[String] {
        &self.ips
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    /// Advance the cursor modulo the list length and return the new position.
    ///
    /// Returns `None` for an empty entry. The update is a single atomic
    /// read-modify-write, so concurrent callers under the shared lock each
    /// observe a distinct step.
    pub fn advance_cursor(&self) -> Option<usize> {
        let len = self.ips.len();
        if len == 0 {
            return None;
        }
        let prev = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);
        Some((prev + 1) % len)
    }
}

#[derive(Debug, Default)]
struct BackendSet {
    entries: HashMap<String, BackendEntry>,
    generation: u64,
    changed_at: Option<Instant>,
}

impl BackendSet {
    fn install(&mut self, entries: HashMap<String, BackendEntry>) {
        self.entries = entries;
        self.generation += 1;
        self.changed_at = Some(Instant::now());
    }
}

/// Thread-safe owner of the live route table.
#[derive(Debug, Default)]
pub struct RouteStore {
    inner: RwLock<BackendSet>,
}

impl RouteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with `table`.
    pub fn with_routes(table: RouteTable) -> Self {
        let store = Self::new();
        store.replace(table);
        store
    }

    /// Deep copy of the current table. Mutating the copy never affects the store.
    pub fn snapshot(&self) -> RouteTable {
        snapshot_of(&self.inner.read())
    }

    /// Install `table` as the sole source of truth, unconditionally.
    ///
    /// The table goes through [`sanitize`] first.
    pub fn replace(&self, table: RouteTable) {
        let entries = into_entries(sanitize(table));
        let mut set = self.inner.write();
        set.install(entries);
    }

    /// Install `table` only if it differs from the current one.
    ///
    /// The table is sanitized, then compared against a snapshot taken under
    /// an upgradable read lock. Plain readers keep running during the
    /// comparison; the write lock is taken only for a confirmed change, and
    /// concurrent installs of the same table install it once.
    /// Returns whether an install happened.
    pub fn install_if_changed(&self, table: RouteTable) -> bool {
        let mut table = sanitize(table);
        let set = self.inner.upgradable_read();
        let mut current = snapshot_of(&set);
        if !differs(&mut table, &mut current) {
            return false;
        }
        let mut set = RwLockUpgradableReadGuard::upgrade(set);
        set.install(into_entries(table));
        true
    }

    /// Pick one backend IP for `host` using `selector`.
    ///
    /// Returns `None` when the host is not managed or has no live backend.
    pub fn pick(&self, host: &str, selector: &dyn Selector) -> Option<String> {
        let host = lowercase_host(host);
        let set = self.inner.read();
        let entry = set.entries.get(host.as_ref())?;
        selector.next_ip(entry).map(str::to_owned)
    }

    /// Number of installs so far. Unchanged tables do not bump it.
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// When the table was last replaced.
    pub fn last_changed(&self) -> Option<Instant> {
        self.inner.read().changed_at
    }

    /// Number of managed hosts.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::round_robin::RoundRobin;

    fn table(pairs: &[(&str, &[&str])]) -> RouteTable {
        pairs
            .iter()
            .map(|(h, ips)| (h.to_string(), ips.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_snapshot_is_independent() {
        let store = RouteStore::with_routes(table(&[("a.internal", &["10.0.0.1"])]));

        let mut copy = store.snapshot();
        copy.get_mut("a.internal").unwrap().push("10.0.0.9".into());
        copy.insert("b.internal".into(), vec![]);

        let fresh = store.snapshot();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh["a.internal"], vec!["10.0.0.1".to_string()]);
    }

    #[test]
    fn test_replace_bumps_generation() {
        let store = RouteStore::new();
        assert_eq!(store.generation(), 0);
        assert!(store.last_changed().is_none());

        store.replace(table(&[("a.internal", &["10.0.0.1"])]));
        assert_eq!(store.generation(), 1);
        assert!(store.last_changed().is_some());
    }

    #[test]
    fn test_replace_drops_empty_hostname() {
        let store = RouteStore::with_routes(table(&[("", &["10.0.0.1"]), ("a.internal", &[])]));
        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(snap["a.internal"].is_empty());
    }

    #[test]
    fn test_install_identical_table_is_noop() {
        let store = RouteStore::with_routes(table(&[("a.internal", &["10.0.0.1", "10.0.0.2"])]));
        let before = store.last_changed();

        let changed = store.install_if_changed(table(&[("a.internal", &["10.0.0.2", "10.0.0.1"])]));
        assert!(!changed);
        assert_eq!(store.generation(), 1);
        assert_eq!(store.last_changed(), before);
    }

    #[test]
    fn test_install_changed_table() {
        let store = RouteStore::with_routes(table(&[("a.internal", &["10.0.0.1"])]));

        assert!(store.install_if_changed(table(&[("a.internal", &["10.0.0.3"])])));
        assert_eq!(store.generation(), 2);
        assert_eq!(store.snapshot()["a.internal"], vec!["10.0.0.3".to_string()]);
    }

    #[test]
    fn test_pick_missing_and_empty() {
        let store = RouteStore::with_routes(table(&[("empty.internal", &[])]));
        let rr = RoundRobin::new();

        assert_eq!(store.pick("missing.internal", &rr), None);
        assert_eq!(store.pick("empty.internal", &rr), None);
    }

    #[test]
    fn test_replace_resets_cursor() {
        let routes = table(&[("a.internal", &["1", "2", "3"])]);
        let store = RouteStore::with_routes(routes.clone());
        let rr = RoundRobin::new();

        assert_eq!(store.pick("a.internal", &rr).as_deref(), Some("2"));
        assert_eq!(store.pick("a.internal", &rr).as_deref(), Some("3"));

        store.replace(routes);
        assert_eq!(store.pick("a.internal", &rr).as_deref(), Some("2"));
    }

    #[test]
    fn test_install_with_empty_hostname_is_stable() {
        let store = RouteStore::new();
        let routes = table(&[("", &["10.0.0.1"]), ("a.internal", &["10.0.0.2"])]);

        assert!(store.install_if_changed(routes.clone()));
        assert!(!store.install_if_changed(routes.clone()));
        assert!(!store.install_if_changed(routes));
        assert_eq!(store.generation(), 1);
        assert_eq!(store.snapshot(), table(&[("a.internal", &["10.0.0.2"])]));
    }

    #[test]
    fn test_hostnames_case_insensitive() {
        let store = RouteStore::with_routes(table(&[("Svc.Internal", &["10.0.0.5"])]));
        let rr = RoundRobin::new();

        assert_eq!(store.snapshot(), table(&[("svc.internal", &["10.0.0.5"])]));
        assert_eq!(store.pick("svc.internal", &rr).as_deref(), Some("10.0.0.5"));
        assert_eq!(store.pick("SVC.internal", &rr).as_deref(), Some("10.0.0.5"));
        assert!(!store.install_if_changed(table(&[("svc.INTERNAL", &["10.0.0.5"])])));
    }

    #[test]
    fn test_sanitize_merges_case_collisions() {
        let clean = sanitize(table(&[("A.internal", &["1"]), ("a.internal", &["2"]), ("", &["3"])]));
        assert_eq!(clean.len(), 1);
        let mut ips = clean["a.internal"].clone();
        ips.sort();
        assert_eq!(ips, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_concurrent_identical_installs_count_once() {
        let store = std::sync::Arc::new(RouteStore::new());
        let routes = table(&[("a.internal", &["10.0.0.1", "10.0.0.2"]), ("b.internal", &[])]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let routes = routes.clone();
                std::thread::spawn(move || store.install_if_changed(routes))
            })
            .collect();
        let installs = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&changed| changed)
            .count();

        assert_eq!(installs, 1);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_advance_cursor_wraps() {
        let entry = BackendEntry::new(vec!["a".into(), "b".into()]);
        let steps: Vec<_> = (0..5).filter_map(|_| entry.advance_cursor()).collect();
        assert_eq!(steps, vec![1, 0, 1, 0, 1]);

        assert_eq!(BackendEntry::new(vec![]).advance_cursor(), None);
    }
}
