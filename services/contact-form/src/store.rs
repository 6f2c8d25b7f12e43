// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Expiring counter storage.
//!
//! The rate limiter only needs a tiny key/value surface: read a counter,
//! write one with an expiry, and increment atomically. [`TransientStore`] is
//! that surface; [`MemoryStore`] is the in-process implementation. A
//! shared backend (Redis, memcached) can implement the same trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Source of the current instant.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}

/// Key/value store of counters that expire.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// Current value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Option<u32>;

    /// Time left before `key` expires, or `None` when absent or expired.
    async fn ttl(&self, key: &str) -> Option<Duration>;

    /// Store `value` under `key`, expiring `ttl` from now.
    async fn set(&self, key: &str, value: u32, ttl: Duration);

    /// Add one to the counter and return the new value.
    ///
    /// A live entry keeps its original expiry; an absent or expired one
    /// starts over at 1 with a fresh `ttl`. Reads and increments of the
    /// same key must not interleave.
    async fn increment(&self, key: &str, ttl: Duration) -> u32;

    /// Increment only while the live value is below `max`, as one atomic
    /// step. Returns the new value, or `None` when the counter is full.
    async fn increment_below(&self, key: &str, max: u32, ttl: Duration) -> Option<u32>;

    /// Take one back off a live counter, keeping its expiry. A counter
    /// that reaches zero is removed.
    async fn decrement(&self, key: &str);

    /// Drop expired entries. Returns how many were removed.
    async fn purge_expired(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct Transient {
    value: u32,
    expires_at: Instant,
}

/// In-process transient store.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Transient>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of entries held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn live(&self, entry: Option<&Transient>) -> Option<Transient> {
        let now = self.clock.now();
        entry.copied().filter(|t| now < t.expires_at)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransientStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<u32> {
        let entries = self.entries.read().await;
        self.live(entries.get(key)).map(|t| t.value)
    }

    async fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        let now = self.clock.now();
        self.live(entries.get(key))
            .map(|t| t.expires_at.duration_since(now))
    }

    async fn set(&self, key: &str, value: u32, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Transient { value, expires_at });
    }

    async fn increment(&self, key: &str, ttl: Duration) -> u32 {
        let mut entries = self.entries.write().await;
        let next = match self.live(entries.get(key)) {
            Some(current) => Transient {
                value: current.value.saturating_add(1),
                expires_at: current.expires_at,
            },
            None => Transient {
                value: 1,
                expires_at: self.clock.now() + ttl,
            },
        };
        entries.insert(key.to_string(), next);
        next.value
    }

    async fn increment_below(&self, key: &str, max: u32, ttl: Duration) -> Option<u32> {
        let mut entries = self.entries.write().await;
        let next = match self.live(entries.get(key)) {
            Some(current) if current.value >= max => return None,
            Some(current) => Transient {
                value: current.value + 1,
                expires_at: current.expires_at,
            },
            None if max == 0 => return None,
            None => Transient {
                value: 1,
                expires_at: self.clock.now() + ttl,
            },
        };
        entries.insert(key.to_string(), next);
        Some(next.value)
    }

    async fn decrement(&self, key: &str) {
        let mut entries = self.entries.write().await;
        match self.live(entries.get(key)) {
            Some(current) if current.value > 1 => {
                entries.insert(
                    key.to_string(),
                    Transient {
                        value: current.value - 1,
                        expires_at: current.expires_at,
                    },
                );
            }
            _ => {
                entries.remove(key);
            }
        }
    }

    async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, t| now < t.expires_at);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Purged expired transients");
        }
        removed
    }
}
