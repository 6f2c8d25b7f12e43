// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window submission limiter.
//!
//! Each client gets `max_submissions` successful sends per window. The
//! window opens on the first recorded send and lasts `window_secs`; only
//! successful dispatches are counted, so rejected attempts never use up a
//! client's allowance.

use crate::config::RateLimitConfig;
use crate::store::TransientStore;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const KEY_PREFIX: &str = "contact_form_submit_";

/// Stable, non-reversible rate-limit key for a client address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    /// Derive the key from a client IP.
    pub fn from_ip(ip: IpAddr) -> Self {
        let digest = blake3::hash(ip.to_string().as_bytes());
        Self(format!("{KEY_PREFIX}{}", digest.to_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Submission is allowed
    Allowed {
        /// Successful submissions still available in the current window
        remaining: u32,
    },
    /// Submission is rate limited
    Limited {
        /// Time until the window expires
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Per-client submission limiter backed by a [`TransientStore`].
pub struct SubmissionLimiter {
    config: RateLimitConfig,
    store: Arc<dyn TransientStore>,
}

impl SubmissionLimiter {
    /// Create a new limiter with the given configuration.
    pub fn new(config: RateLimitConfig, store: Arc<dyn TransientStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check whether `key` may submit. Does not change any state.
    pub async fn check(&self, key: &ClientKey) -> RateLimitResult {
        let count = self.store.get(key.as_str()).await.unwrap_or(0);

        if count >= self.config.max_submissions {
            let retry_after = self
                .store
                .ttl(key.as_str())
                .await
                .unwrap_or(Duration::ZERO);
            debug!(key = %key, count, ?retry_after, "Submission limit reached");
            return RateLimitResult::Limited { retry_after };
        }

        RateLimitResult::Allowed {
            remaining: self.config.max_submissions - count,
        }
    }

    /// Count one successful submission for `key`. Returns the new count.
    pub async fn record(&self, key: &ClientKey) -> u32 {
        let count = self
            .store
            .increment(key.as_str(), self.config.window_duration())
            .await;
        debug!(key = %key, count, "Recorded submission");
        count
    }

    /// Check and count in one atomic step.
    ///
    /// On `Allowed` the slot is already taken; give it back with
    /// [`release`](Self::release) if the submission is not sent after all.
    pub async fn reserve(&self, key: &ClientKey) -> RateLimitResult {
        let reserved = self
            .store
            .increment_below(
                key.as_str(),
                self.config.max_submissions,
                self.config.window_duration(),
            )
            .await;

        match reserved {
            Some(count) => {
                debug!(key = %key, count, "Reserved submission slot");
                RateLimitResult::Allowed {
                    remaining: self.config.max_submissions - count,
                }
            }
            None => {
                let retry_after = self
                    .store
                    .ttl(key.as_str())
                    .await
                    .unwrap_or(Duration::ZERO);
                debug!(key = %key, ?retry_after, "Submission limit reached");
                RateLimitResult::Limited { retry_after }
            }
        }
    }

    /// Give back a slot taken by [`reserve`](Self::reserve).
    pub async fn release(&self, key: &ClientKey) {
        self.store.decrement(key.as_str()).await;
        debug!(key = %key, "Released submission slot");
    }
}
