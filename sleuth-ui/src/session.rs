//! Per-browser report storage with expiry and a size cap.

use sleuth_core::report::Report;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

struct SessionEntry {
    report: Report,
    stored_at: Instant,
}

/// Latest report per session.
///
/// An entry lives for `ttl` after it was stored. Expired entries are pruned
/// on every insert, and when the store is full the oldest entry is evicted
/// to make room.
pub struct SessionStore {
    ttl: Duration,
    max_sessions: usize,
    entries: HashMap<Uuid, SessionEntry>,
}

impl SessionStore {
    /// `max_sessions` below one is treated as one.
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            ttl,
            max_sessions: max_sessions.max(1),
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub fn insert(&mut self, session: Uuid, report: Report) {
        self.insert_at(session, report, Instant::now());
    }

    pub fn get(&self, session: &Uuid) -> Option<&Report> {
        self.get_at(session, Instant::now())
    }

    /// Number of sessions that have not expired.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .values()
            .filter(|e| self.is_live(e, now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_live(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }

    fn insert_at(&mut self, session: Uuid, report: Report, now: Instant) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.stored_at) < ttl);
        let expired = before - self.entries.len();
        if expired > 0 {
            debug!(expired, "Pruned expired sessions");
        }

        self.entries.remove(&session);
        while self.entries.len() >= self.max_sessions {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    self.entries.remove(&id);
                    debug!(session = %id, "Evicted oldest session");
                }
                None => break,
            }
        }

        self.entries.insert(
            session,
            SessionEntry {
                report,
                stored_at: now,
            },
        );
    }

    fn get_at(&self, session: &Uuid, now: Instant) -> Option<&Report> {
        self.entries
            .get(session)
            .filter(|e| self.is_live(e, now))
            .map(|e| &e.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(topic: &str) -> Report {
        Report::new(topic, "explanation", "summary", "repos")
    }

    #[test]
    fn test_insert_replaces_same_session() {
        let mut store = SessionStore::new(Duration::from_secs(60), 10);
        let id = Uuid::new_v4();
        store.insert(id, report("first"));
        store.insert(id, report("second"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).map(|r| r.topic.as_str()), Some("second"));
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut store = SessionStore::new(Duration::from_secs(60), 2);
        let start = Instant::now();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            store.insert_at(*id, report("t"), start + Duration::from_millis(i as u64));
        }
        let now = start + Duration::from_secs(1);
        assert_eq!(store.entries.len(), 2);
        assert!(store.get_at(&ids[0], now).is_none());
        assert!(store.get_at(&ids[1], now).is_some());
        assert!(store.get_at(&ids[2], now).is_some());
    }

    #[test]
    fn test_expired_entries_are_hidden_and_pruned() {
        let mut store = SessionStore::new(Duration::from_secs(60), 100);
        let start = Instant::now();
        let old = Uuid::new_v4();
        store.insert_at(old, report("old"), start);

        let later = start + Duration::from_secs(61);
        assert!(store.get_at(&old, start + Duration::from_secs(59)).is_some());
        assert!(store.get_at(&old, later).is_none());

        let fresh = Uuid::new_v4();
        store.insert_at(fresh, report("fresh"), later);
        assert_eq!(store.entries.len(), 1);
        assert!(store.entries.contains_key(&fresh));
    }

    #[test]
    fn test_zero_cap_keeps_latest() {
        let mut store = SessionStore::new(Duration::from_secs(60), 0);
        assert_eq!(store.max_sessions(), 1);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.insert(a, report("a"));
        store.insert(b, report("b"));
        assert!(store.get(&a).is_none());
        assert!(store.get(&b).is_some());
    }
}
