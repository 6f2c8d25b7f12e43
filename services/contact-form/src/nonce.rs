// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Action-scoped security tokens.
//!
//! A token proves the request came from a form this service rendered. Time
//! is cut into ticks of half the configured lifetime; a token is the keyed
//! BLAKE3 MAC of `<tick>|<action>` and verifies for the tick it was issued
//! in and the one after, so it stays valid for between half and one full
//! lifetime.

use rand::RngCore;
use std::time::Duration;
use tracing::debug;

/// Action the contact form tokens are scoped to.
pub const FORM_ACTION: &str = "nc_form";

const KEY_CONTEXT: &str = "contact-form 2026-01-01 security token key";

/// How fresh a verified token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAge {
    /// Issued in the current tick
    Current,
    /// Issued in the previous tick
    Previous,
}

/// Issues and verifies security tokens.
pub struct NonceManager {
    key: [u8; 32],
    lifetime: Duration,
}

impl std::fmt::Debug for NonceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceManager")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl NonceManager {
    /// Derive the MAC key from a configured secret.
    pub fn from_secret(secret: &str, lifetime: Duration) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
            lifetime,
        }
    }

    /// Use a random key. Tokens will not survive a restart.
    pub fn random(lifetime: Duration) -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key, lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `action` at the current time.
    pub fn create(&self, action: &str) -> String {
        self.create_at(action, unix_now())
    }

    /// Issue a token for `action` as of `unix_secs`.
    pub fn create_at(&self, action: &str, unix_secs: u64) -> String {
        self.mac(self.tick(unix_secs), action).to_hex().to_string()
    }

    /// Verify `token` for `action` at the current time.
    pub fn verify(&self, token: &str, action: &str) -> Option<TokenAge> {
        self.verify_at(token, action, unix_now())
    }

    /// Verify `token` for `action` as of `unix_secs`.
    pub fn verify_at(&self, token: &str, action: &str, unix_secs: u64) -> Option<TokenAge> {
        let Ok(presented) = blake3::Hash::from_hex(token.trim()) else {
            debug!(action, "Security token is not a valid digest");
            return None;
        };

        let tick = self.tick(unix_secs);

        // blake3::Hash equality is constant time.
        if presented == self.mac(tick, action) {
            return Some(TokenAge::Current);
        }
        if tick > 0 && presented == self.mac(tick - 1, action) {
            return Some(TokenAge::Previous);
        }

        debug!(action, "Security token did not verify");
        None
    }

    fn tick(&self, unix_secs: u64) -> u64 {
        let half = (self.lifetime.as_secs() / 2).max(1);
        unix_secs.div_ceil(half)
    }

    fn mac(&self, tick: u64, action: &str) -> blake3::Hash {
        blake3::keyed_hash(&self.key, format!("{tick}|{action}").as_bytes())
    }
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
