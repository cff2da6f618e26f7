use crate::embed::EmbedOutcome;
use dashmap::DashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Keyed by post URL. Only successfully rendered widgets are stored, so a
/// previously failed load stays retryable on the next display cycle.
#[derive(Clone)]
pub struct EmbedCache {
    cache: Arc<DashMap<String, EmbedOutcome>>,
}

impl EmbedCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(100).unwrap());
        Self {
            cache: Arc::new(DashMap::with_capacity(capacity.get())),
        }
    }

    pub async fn get(&self, key: &str) -> Option<EmbedOutcome> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    pub async fn set(&self, key: String, value: EmbedOutcome) {
        self.cache.insert(key, value);
    }
}
