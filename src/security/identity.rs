//! Rate-limit identity derivation.
//!
//! Each request is attributed to one identity string, in order of trust:
//! the first `X-Forwarded-For` entry, the peer socket address, the
//! `device_id` cookie, and finally a shared fallback bucket. The prefix
//! (`ip:`, `cookie:`, `remote:`) keeps the namespaces from colliding.

use std::net::IpAddr;

/// Derives the rate-limit identity for a request.
///
/// `forwarded_for` is the raw `X-Forwarded-For` header value, `peer_ip` the
/// connected socket address, and `device_id` the value of an already-present
/// `device_id` cookie. Callers pass these explicitly; nothing is read from
/// ambient request state.
pub fn derive_identity(
    forwarded_for: Option<&str>,
    peer_ip: Option<IpAddr>,
    device_id: Option<&str>,
) -> String {
    if let Some(header) = forwarded_for {
        // The first entry in the chain is the original client.
        let first = header.split(',').next().unwrap_or(header).trim();
        if !first.is_empty() {
            return format!("ip:{first}");
        }
    }

    if let Some(ip) = peer_ip {
        return format!("ip:{ip}");
    }

    if let Some(id) = device_id
        && !id.is_empty()
    {
        return format!("cookie:{id}");
    }

    "remote:unknown".to_string()
}
