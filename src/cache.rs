use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE};
use crate::models::WireMessage;

// Cached reply with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub reply: String,
    pub created_at: Instant,
}

// Chat reply cache, a zero TTL turns it off
pub struct ReplyCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ReplyCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        if let Some(entry) = self.entries.get(key) {
            if entry.created_at.elapsed() < self.ttl {
                CACHE_HITS.inc();
                tracing::debug!("chat cache hit");
                return Some(entry.reply.clone());
            }
        }
        // the read guard above is dropped before removing
        if self
            .entries
            .remove_if(key, |_, entry| entry.created_at.elapsed() >= self.ttl)
            .is_some()
        {
            CACHE_SIZE.set(self.len() as f64);
        }
        CACHE_MISSES.inc();
        None
    }

    pub fn insert(&self, key: String, reply: String) {
        if !self.is_enabled() {
            return;
        }
        self.evict_expired();
        self.entries.insert(key, CacheEntry {
            reply,
            created_at: Instant::now(),
        });
        CACHE_SIZE.set(self.len() as f64);
    }

    // Drop every entry past its TTL
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.created_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Create a cache key (hash of model + full conversation)
pub fn make_cache_key(model: &str, messages: &[WireMessage]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model);
    for message in messages {
        hasher.update([0u8]);
        hasher.update(&message.role);
        hasher.update([0u8]);
        hasher.update(message.content.cache_text());
    }
    format!("{:x}", hasher.finalize())
}
