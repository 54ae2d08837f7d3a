use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use serde_json::Value;

/// Rendered page payloads keyed by logical path (`/`, `/admin`, ...).
///
/// Every invalidation bumps the path's generation. A reader captures the
/// generation before loading and stores with `put_if_generation`, so a page
/// loaded before a concurrent invalidation is never cached.
pub trait PageCache: Send + Sync {
    fn get(&self, path: &str) -> Option<Value>;
    fn generation(&self, path: &str) -> u64;
    /// Returns false, storing nothing, when `path` was invalidated after
    /// `generation` was read.
    fn put_if_generation(&self, path: &str, generation: u64, page: Value) -> bool;
    /// Marks every path in `paths` stale.
    fn invalidate(&self, paths: &[&str]);
}

#[derive(Debug)]
struct CachedPage {
    page: Value,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    page: Option<CachedPage>,
}

/// In-process cache. Entries also lapse after `ttl`, so a page is never
/// older than one revalidation window even if no mutation touched it.
#[derive(Clone)]
pub struct InMemoryPageCache {
    slots: Arc<DashMap<String, Slot>>,
    ttl: Duration,
}

impl InMemoryPageCache {
    pub fn new(ttl: Duration) -> Self {
        InMemoryPageCache {
            slots: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Number of live cached pages.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.page.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageCache for InMemoryPageCache {
    fn get(&self, path: &str) -> Option<Value> {
        let mut slot = self.slots.get_mut(path)?;
        let fresh = slot.page.as_ref()?.stored_at.elapsed() < self.ttl;

        if fresh {
            return slot.page.as_ref().map(|cached| cached.page.clone());
        }

        slot.page = None;
        tracing::debug!("Page cache entry for {} expired", path);
        None
    }

    fn generation(&self, path: &str) -> u64 {
        self.slots.get(path).map(|slot| slot.generation).unwrap_or(0)
    }

    fn put_if_generation(&self, path: &str, generation: u64, page: Value) -> bool {
        let mut slot = self.slots.entry(path.to_string()).or_default();
        if slot.generation != generation {
            return false;
        }

        slot.page = Some(CachedPage {
            page,
            stored_at: Instant::now(),
        });
        true
    }

    fn invalidate(&self, paths: &[&str]) {
        for path in paths {
            let mut slot = self.slots.entry(path.to_string()).or_default();
            slot.generation += 1;
            slot.page = None;
        }
        tracing::debug!("Revalidated paths: {:?}", paths);
    }
}
