use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// A fetched collection plus the moment it was fetched.
#[derive(Debug)]
pub struct CachedData<T> {
    pub data: Arc<Vec<T>>,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }

    pub fn age_minutes(&self) -> i64 {
        self.age().num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Proof that a fetch started at a given cache generation.
///
/// `invalidate()` bumps the generation, so results from fetches that were
/// already in flight are not written back over the cleared cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

struct Slot<T> {
    entry: Option<CachedData<T>>,
    generation: u64,
}

/// TTL cache for one resource collection, keyed by record id.
///
/// Reads within the TTL are served from memory. Successful mutations patch
/// the cached collection in place (matched by `key`) without touching its
/// timestamp: a mutation response is at least as fresh as any cached read.
pub struct KeyedCache<T> {
    name: &'static str,
    ttl: Duration,
    key: fn(&T) -> i64,
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> KeyedCache<T> {
    pub fn new(name: &'static str, ttl: Duration, key: fn(&T) -> i64) -> Self {
        Self {
            name,
            ttl,
            key,
            slot: Mutex::new(Slot {
                entry: None,
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key_of(&self, item: &T) -> i64 {
        (self.key)(item)
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached collection if it is younger than the TTL.
    pub fn fresh(&self) -> Option<Arc<Vec<T>>> {
        let slot = self.lock();
        slot.entry
            .as_ref()
            .filter(|e| e.is_fresh(self.ttl))
            .map(|e| Arc::clone(&e.data))
    }

    /// The cached collection regardless of age.
    pub fn snapshot(&self) -> Option<Arc<Vec<T>>> {
        self.lock().entry.as_ref().map(|e| Arc::clone(&e.data))
    }

    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.lock().generation)
    }

    /// Store a fetch result. The result is always returned to the caller but
    /// only cached when no invalidation happened since `ticket` was taken.
    pub fn store(&self, ticket: FetchTicket, data: Vec<T>) -> Arc<Vec<T>> {
        let mut slot = self.lock();
        let cached = CachedData::new(data);
        let shared = Arc::clone(&cached.data);
        if slot.generation == ticket.0 {
            slot.entry = Some(cached);
        } else {
            debug!(cache = self.name, "Discarding stale fetch result");
        }
        shared
    }

    /// Return the fresh collection, or run `fetch` and cache its result.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Arc<Vec<T>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        if let Some(data) = self.fresh() {
            debug!(cache = self.name, count = data.len(), "Cache hit");
            return Ok(data);
        }

        let ticket = self.begin_fetch();
        let data = fetch().await?;
        debug!(cache = self.name, count = data.len(), "Cache filled");
        Ok(self.store(ticket, data))
    }

    /// Drop the cached collection so the next read refetches.
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.entry = None;
        slot.generation += 1;
        debug!(cache = self.name, generation = slot.generation, "Cache invalidated");
    }

    /// Insert `item`, replacing any cached record with the same id.
    /// No-op when nothing is cached.
    pub fn upsert(&self, item: T) {
        let key = self.key;
        let mut slot = self.lock();
        if let Some(entry) = slot.entry.as_mut() {
            upsert_by_key(Arc::make_mut(&mut entry.data), item, key);
        }
    }

    /// Remove the record with `id`. No-op when nothing is cached.
    pub fn remove(&self, id: i64) {
        let key = self.key;
        let mut slot = self.lock();
        if let Some(entry) = slot.entry.as_mut() {
            Arc::make_mut(&mut entry.data).retain(|item| key(item) != id);
        }
    }

    pub fn age_display(&self) -> Option<String> {
        self.lock().entry.as_ref().map(|e| e.age_display())
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, by: Duration) {
        if let Some(entry) = self.lock().entry.as_mut() {
            entry.cached_at = entry.cached_at - by;
        }
    }
}

/// Replace the element with the same key, or append when there is none.
/// Any duplicates of the key are collapsed so the record appears once.
pub fn upsert_by_key<T>(items: &mut Vec<T>, item: T, key: fn(&T) -> i64) {
    let id = key(&item);
    match items.iter().position(|existing| key(existing) == id) {
        Some(index) => {
            items[index] = item;
            let mut seen = false;
            items.retain(|existing| {
                if key(existing) != id {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
        }
        None => items.push(item),
    }
}
