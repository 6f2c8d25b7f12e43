// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client address resolution.

use axum::http::HeaderMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Resolve the address a submission is rate limited under.
///
/// With `trust_proxy_headers` the `Client-IP` header wins, then the first
/// hop of `X-Forwarded-For`. Otherwise (or when neither is present) the
/// socket peer is used. The first candidate found decides: if it does not
/// parse as an IP the result is `0.0.0.0`, never a later candidate.
pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy_headers: bool) -> IpAddr {
    let from_headers = trust_proxy_headers
        .then(|| {
            header_value(headers, "client-ip").or_else(|| {
                header_value(headers, "x-forwarded-for")
                    .map(|v| v.split(',').next().unwrap_or_default().trim().to_string())
            })
        })
        .flatten();

    match from_headers {
        Some(candidate) => candidate
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        None => peer
            .map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
