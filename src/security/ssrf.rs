//! SSRF protection for caller-supplied URL hosts.
//!
//! Blocks hostnames and IP ranges that would let a stored link point the
//! service (or anyone probing through it) at loopback, private networks, or
//! cloud metadata endpoints. Domain hosts are resolved through the system
//! resolver with a bounded timeout; a resolver failure admits the host, since
//! a dead hostname cannot be fetched anyway and refusing on resolver trouble
//! would reject legitimate links during DNS outages.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use tracing::{debug, warn};

/// Hostnames that always resolve to the local machine.
///
/// Matched case-insensitively, either exactly or as a dot-separated suffix
/// (so `foo.localhost` is blocked along with `localhost`).
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "ip6-localhost",
    "ip6-loopback",
];

/// Cloud metadata endpoints, matched as case-insensitive substrings.
const METADATA_HOSTS: &[&str] = &[
    "169.254.169.254",
    "metadata.google.internal",
    "metadata.azure.internal",
];

/// Returns true if the hostname itself names a blocked destination.
pub fn is_blocked_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();

    for blocked in BLOCKED_HOSTS {
        if host == *blocked || host.ends_with(&format!(".{blocked}")) {
            return true;
        }
    }

    METADATA_HOSTS.iter().any(|meta| host.contains(meta))
}

/// Returns true if the address falls in a blocked range.
///
/// Covers loopback, RFC 1918 private space, link-local, carrier-grade NAT,
/// the IETF protocol and documentation blocks, and their IPv6 counterparts.
/// IPv4-mapped IPv6 addresses are checked against the IPv4 rules.
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_ipv4(v4),
        IpAddr::V6(v6) => is_blocked_ipv6(v6),
    }
}

fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();

    ip.is_loopback()                                            // 127.0.0.0/8
        || ip.is_private()                                      // 10/8, 172.16/12, 192.168/16
        || ip.is_link_local()                                   // 169.254.0.0/16
        || ip.is_unspecified()                                  // 0.0.0.0
        || ip.is_broadcast()                                    // 255.255.255.255
        || (octets[0] == 100 && (octets[1] & 0xc0) == 64)       // 100.64.0.0/10
        || (octets[0] == 192 && octets[1] == 0 && octets[2] == 0) // 192.0.0.0/24
        || (octets[0] == 192 && octets[1] == 0 && octets[2] == 2) // 192.0.2.0/24
        || (octets[0] == 198 && octets[1] == 51 && octets[2] == 100) // 198.51.100.0/24
        || (octets[0] == 203 && octets[1] == 0 && octets[2] == 113) // 203.0.113.0/24
}

fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(v4);
    }

    let segments = ip.segments();

    ip.is_loopback()                                  // ::1/128
        || ip.is_unspecified()                        // ::
        || (segments[0] & 0xfe00) == 0xfc00           // fc00::/7 unique local
        || (segments[0] & 0xffc0) == 0xfe80           // fe80::/10 link local
}

/// Resolves a domain host and returns the first blocked address it maps to.
///
/// Returns `None` when every resolved address is routable, and also when
/// resolution fails or exceeds `timeout` (fail-open; the failure is logged).
pub async fn blocked_resolved_address(host: &str, timeout: Duration) -> Option<IpAddr> {
    // lookup_host wants an authority; the port is irrelevant to resolution.
    let lookup = tokio::net::lookup_host(format!("{host}:80"));

    let addrs = match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(addrs)) => addrs,
        Ok(Err(e)) => {
            warn!("DNS resolution failed for {}: {} (allowing)", host, e);
            return None;
        }
        Err(_) => {
            warn!("DNS resolution timed out for {} (allowing)", host);
            return None;
        }
    };

    for addr in addrs {
        if is_blocked_ip(addr.ip()) {
            debug!("Host {} resolves to blocked address {}", host, addr.ip());
            return Some(addr.ip());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_blocked_host_exact_match() {
        assert!(is_blocked_host("localhost"));
        assert!(is_blocked_host("LOCALHOST"));
        assert!(is_blocked_host("localhost.localdomain"));
        assert!(is_blocked_host("ip6-localhost"));
        assert!(is_blocked_host("ip6-loopback"));
    }

    #[test]
    fn test_blocked_host_suffix_match() {
        assert!(is_blocked_host("foo.localhost"));
        assert!(is_blocked_host("a.b.localhost"));
    }

    #[test]
    fn test_blocked_host_metadata_substring() {
        assert!(is_blocked_host("169.254.169.254"));
        assert!(is_blocked_host("metadata.google.internal"));
        assert!(is_blocked_host("metadata.azure.internal"));
        assert!(is_blocked_host("evil.metadata.google.internal.example.com"));
    }

    #[test]
    fn test_blocked_host_allows_regular_domains() {
        assert!(!is_blocked_host("example.com"));
        assert!(!is_blocked_host("notlocalhost.com"));
        // Suffix match requires a dot boundary.
        assert!(!is_blocked_host("mylocalhost"));
    }

    #[test]
    fn test_blocked_ipv4_private_ranges() {
        assert!(is_blocked_ip(v4("10.0.0.1")));
        assert!(is_blocked_ip(v4("10.255.255.255")));
        assert!(is_blocked_ip(v4("172.16.0.1")));
        assert!(is_blocked_ip(v4("172.31.255.255")));
        assert!(is_blocked_ip(v4("192.168.1.1")));
    }

    #[test]
    fn test_blocked_ipv4_loopback_and_link_local() {
        assert!(is_blocked_ip(v4("127.0.0.1")));
        assert!(is_blocked_ip(v4("127.255.255.254")));
        assert!(is_blocked_ip(v4("169.254.169.254")));
        assert!(is_blocked_ip(v4("169.254.0.1")));
    }

    #[test]
    fn test_blocked_ipv4_special_ranges() {
        assert!(is_blocked_ip(v4("100.64.0.1")));     // carrier-grade NAT
        assert!(is_blocked_ip(v4("100.127.255.255")));
        assert!(is_blocked_ip(v4("192.0.0.1")));      // IETF protocol assignments
        assert!(is_blocked_ip(v4("192.0.2.5")));      // TEST-NET-1
        assert!(is_blocked_ip(v4("198.51.100.7")));   // TEST-NET-2
        assert!(is_blocked_ip(v4("203.0.113.9")));    // TEST-NET-3
        assert!(is_blocked_ip(v4("0.0.0.0")));
        assert!(is_blocked_ip(v4("255.255.255.255")));
    }

    #[test]
    fn test_allowed_ipv4_public_addresses() {
        assert!(!is_blocked_ip(v4("8.8.8.8")));
        assert!(!is_blocked_ip(v4("1.1.1.1")));
        assert!(!is_blocked_ip(v4("93.184.216.34")));
        // Range boundaries.
        assert!(!is_blocked_ip(v4("172.15.255.255")));
        assert!(!is_blocked_ip(v4("172.32.0.0")));
        assert!(!is_blocked_ip(v4("100.63.255.255")));
        assert!(!is_blocked_ip(v4("100.128.0.0")));
        assert!(!is_blocked_ip(v4("192.0.3.0")));
    }

    #[test]
    fn test_blocked_ipv6_addresses() {
        assert!(is_blocked_ip("::1".parse().unwrap()));
        assert!(is_blocked_ip("::".parse().unwrap()));
        assert!(is_blocked_ip("fc00::1".parse().unwrap()));
        assert!(is_blocked_ip("fdff::1".parse().unwrap()));
        assert!(is_blocked_ip("fe80::1".parse().unwrap()));
        assert!(is_blocked_ip("febf::1".parse().unwrap()));
    }

    #[test]
    fn test_blocked_ipv6_v4_mapped() {
        assert!(is_blocked_ip("::ffff:127.0.0.1".parse().unwrap()));
        assert!(is_blocked_ip("::ffff:10.0.0.1".parse().unwrap()));
        assert!(is_blocked_ip("::ffff:192.168.1.1".parse().unwrap()));
        assert!(!is_blocked_ip("::ffff:8.8.8.8".parse().unwrap()));
    }

    #[test]
    fn test_allowed_ipv6_public_addresses() {
        assert!(!is_blocked_ip("2001:4860:4860::8888".parse().unwrap()));
        assert!(!is_blocked_ip("2606:4700:4700::1111".parse().unwrap()));
        // fec0:: is outside fe80::/10.
        assert!(!is_blocked_ip("fec0::1".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_resolution_failure_is_fail_open() {
        // RFC 2606 reserves .invalid; resolution is guaranteed to fail.
        let result =
            blocked_resolved_address("definitely-not-real.invalid", Duration::from_secs(2)).await;

        assert!(result.is_none());
    }
}
