//! Idle object storage and eviction order

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Which idle object a `get` receives first
///
/// # Examples
///
/// ```
/// use async_objectpool::{EvictionPolicy, PoolConfiguration};
///
/// // Reuse the most recently returned object, letting the rest age out
/// let config = PoolConfiguration::new()
///     .with_eviction_policy(EvictionPolicy::Mru);
///
/// assert_eq!(config.eviction_policy, EvictionPolicy::Mru);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvictionPolicy {
    /// Least recently used: the object returned longest ago goes out first
    #[default]
    Lru,

    /// Most recently used: the object returned last goes out first
    Mru,
}

/// An idle object and the moment it became idle
#[derive(Debug)]
pub(crate) struct IdleEntry<T> {
    pub obj: T,
    pub since: Instant,
}

/// Idle objects ordered oldest (front) to newest (back)
#[derive(Debug)]
pub(crate) struct IdleStore<T> {
    entries: VecDeque<IdleEntry<T>>,
    policy: EvictionPolicy,
}

impl<T> IdleStore<T> {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            entries: VecDeque::new(),
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, obj: T) {
        self.entries.push_back(IdleEntry {
            obj,
            since: Instant::now(),
        });
    }

    pub fn pop(&mut self) -> Option<T> {
        let entry = match self.policy {
            EvictionPolicy::Lru => self.entries.pop_front(),
            EvictionPolicy::Mru => self.entries.pop_back(),
        };
        entry.map(|e| e.obj)
    }

    /// Remove up to `limit` objects idle for longer than `timeout`, oldest first
    pub fn reap_expired(&mut self, timeout: Duration, limit: usize) -> Vec<T> {
        let now = Instant::now();
        let mut expired = Vec::new();
        while expired.len() < limit {
            match self.entries.front() {
                Some(entry) if now.duration_since(entry.since) > timeout => {}
                _ => break,
            }
            if let Some(entry) = self.entries.pop_front() {
                expired.push(entry.obj);
            }
        }
        expired
    }

    pub fn drain(&mut self) -> Vec<T> {
        self.entries.drain(..).map(|e| e.obj).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(policy: EvictionPolicy) -> IdleStore<i32> {
        let mut store = IdleStore::new(policy);
        for i in 1..=3 {
            store.push(i);
        }
        store
    }

    #[test]
    fn test_lru_returns_oldest_first() {
        let mut store = filled(EvictionPolicy::Lru);
        assert_eq!(store.pop(), Some(1));
        assert_eq!(store.pop(), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_mru_returns_newest_first() {
        let mut store = filled(EvictionPolicy::Mru);
        assert_eq!(store.pop(), Some(3));
        assert_eq!(store.pop(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reap_only_expired_and_within_limit() {
        let mut store = IdleStore::new(EvictionPolicy::Mru);
        store.push(1);
        store.push(2);
        tokio::time::advance(Duration::from_secs(10)).await;
        store.push(3);

        assert!(store.reap_expired(Duration::from_secs(30), usize::MAX).is_empty());
        assert_eq!(store.reap_expired(Duration::from_secs(5), 1), vec![1]);
        assert_eq!(store.reap_expired(Duration::from_secs(5), 5), vec![2]);
        assert_eq!(store.len(), 1);
        assert!(store.reap_expired(Duration::from_secs(5), 0).is_empty());
    }

    #[test]
    fn test_drain_empties_store() {
        let mut store = filled(EvictionPolicy::Lru);
        assert_eq!(store.drain(), vec![1, 2, 3]);
        assert_eq!(store.len(), 0);
    }
}
