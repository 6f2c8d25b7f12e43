// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for attack simulation.

use std::net::{IpAddr, Ipv4Addr};

/// A pool of distinct client addresses in 10.0.0.0/8.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A submitter identity: first name, last name, email.
#[derive(Debug, Clone)]
pub struct Submitter {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Well-formed submitters.
pub fn generate_submitters(count: usize) -> Vec<Submitter> {
    (0..count)
        .map(|i| Submitter {
            first_name: format!("First{i}"),
            last_name: format!("Last{i}"),
            email: format!("person{i}@mail-{}.example.com", i % 7),
        })
        .collect()
}

/// Tokens that must never verify.
pub fn generate_forged_tokens() -> Vec<String> {
    vec![
        String::new(),
        "0".repeat(64),
        "f".repeat(64),
        "not-a-token".to_string(),
        "<script>alert(1)</script>".to_string(),
        "a".repeat(4096),
        // Right length, wrong key.
        blake3::hash(b"1|nc_form").to_hex().to_string(),
    ]
}

/// Addresses that survive sanitization but fail validation.
pub fn generate_invalid_emails() -> Vec<&'static str> {
    vec![
        "plain",
        "user@",
        "@example.com",
        "user@localhost",
        "user@.example.com",
        "user@example..com",
        "not-an-email",
    ]
}

/// Honeypot values a form-filling bot might send.
pub fn generate_honeypot_values() -> Vec<&'static str> {
    vec!["http://spam.example", "1", " ", "buy now", "https://example.com"]
}

/// Deterministic Bernoulli draw for request `i`.
pub fn pick(ratio: f64, i: usize) -> bool {
    ((i * 7919) % 100) as f64 / 100.0 < ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use contact_form::submission::{is_valid_email, sanitize_email};

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(300);
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 300);
    }

    #[test]
    fn test_submitters_are_valid() {
        for s in generate_submitters(20) {
            assert!(is_valid_email(&s.email), "{}", s.email);
        }
    }

    #[test]
    fn test_invalid_emails_stay_invalid() {
        for email in generate_invalid_emails() {
            let cleaned = sanitize_email(email);
            assert!(!cleaned.is_empty());
            assert!(!is_valid_email(&cleaned), "{email}");
        }
    }

    #[test]
    fn test_pick_bounds() {
        assert!((0..100).all(|i| pick(1.0, i)));
        assert!((0..100).all(|i| !pick(0.0, i)));
    }
}
