// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack patterns for security testing.

/// What a simulated request stream looks like.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions
    pub total_requests: usize,
    /// Distinct client addresses, used round-robin
    pub unique_ips: usize,
    /// Share of requests with the honeypot filled (0.0-1.0)
    pub honeypot_ratio: f64,
    /// Share of requests carrying a forged token (0.0-1.0)
    pub forged_token_ratio: f64,
    /// Share of requests with an invalid address (0.0-1.0)
    pub invalid_email_ratio: f64,
    /// Share of requests with a blank required field (0.0-1.0)
    pub missing_field_ratio: f64,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            honeypot_ratio: 0.0,
            forged_token_ratio: 0.0,
            invalid_email_ratio: 0.0,
            missing_field_ratio: 0.0,
        }
    }
}

impl AttackConfig {
    /// One client submitting over and over.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            unique_ips: 1,
            ..Default::default()
        }
    }

    /// Many clients, a handful of submissions each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// Form-filling bots that complete every field, honeypot included.
    pub fn bot_flood() -> Self {
        Self {
            total_requests: 300,
            unique_ips: 50,
            honeypot_ratio: 1.0,
            ..Default::default()
        }
    }

    /// Direct POSTs that never loaded the form.
    pub fn forged_token_flood() -> Self {
        Self {
            total_requests: 200,
            unique_ips: 20,
            forged_token_ratio: 1.0,
            ..Default::default()
        }
    }

    /// Junk submissions that fail validation. Blank fields are drawn
    /// first; everything else carries a bad address.
    pub fn junk_fields() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            invalid_email_ratio: 1.0,
            missing_field_ratio: 0.5,
            ..Default::default()
        }
    }

    /// Upper bound on accepted submissions for a given per-client limit,
    /// assuming nothing else rejects them.
    pub fn max_accepted(&self, per_client_limit: usize) -> usize {
        let per_client = self.total_requests.div_ceil(self.unique_ips.max(1));
        self.unique_ips.max(1) * per_client.min(per_client_limit)
    }
}
