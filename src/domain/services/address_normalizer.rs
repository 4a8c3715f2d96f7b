//! Address Normalizer Service
//!
//! Pure domain logic for turning host-reported addresses into bare IPs
//! and recognising local/private networks.

use std::net::{IpAddr, SocketAddr};

/// Address helpers used before any provider is contacted.
pub struct AddressNormalizer;

impl AddressNormalizer {
    /// Strip a trailing `:port` from an address.
    ///
    /// Handles `1.2.3.4:28015`, `[2001:db8::1]:28015` and bracketed IPv6
    /// without a port. Bare IPv4/IPv6 addresses and anything that does not
    /// look like `host:digits` are returned unchanged.
    pub fn normalize(raw: &str) -> String {
        let trimmed = raw.trim();

        if trimmed.parse::<IpAddr>().is_ok() {
            return trimmed.to_string();
        }

        if let Ok(sock) = trimmed.parse::<SocketAddr>() {
            return sock.ip().to_string();
        }

        if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return inner.to_string();
        }

        // Hostnames and malformed IPv4 with a port, e.g. "localhost:28015"
        match trimmed.rsplit_once(':') {
            Some((host, port))
                if !host.is_empty()
                    && !host.contains(':')
                    && !port.is_empty()
                    && port.bytes().all(|b| b.is_ascii_digit()) =>
            {
                host.to_string()
            }
            _ => trimmed.to_string(),
        }
    }

    /// Whether `ip` belongs to a loopback or private IPv4 range.
    ///
    /// Local: `10.0.0.0/8`, `127.0.0.0/8`, `192.168.0.0/16`, `172.16.0.0/12`.
    /// IPv6 loopback and IPv4-mapped IPv6 addresses are classified through
    /// the same rules. Anything else, including malformed input, is not local.
    pub fn is_local(ip: &str) -> bool {
        if let Some(octets) = Self::ipv4_octets(ip) {
            return Self::is_local_octets(octets);
        }

        match ip.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => {
                if v6.is_loopback() {
                    return true;
                }
                v6.to_ipv4_mapped()
                    .map(|v4| Self::is_local_octets(v4.octets()))
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Split a dotted quad into four octets.
    ///
    /// Leading zeros are accepted (`010.0.0.1`), matching a plain numeric
    /// split rather than strict IP parsing.
    fn ipv4_octets(ip: &str) -> Option<[u8; 4]> {
        let parts: Vec<&str> = ip.split('.').filter(|p| !p.is_empty()).collect();
        if parts.len() != 4 {
            return None;
        }

        let mut octets = [0u8; 4];
        for (slot, part) in octets.iter_mut().zip(parts) {
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok()?;
        }
        Some(octets)
    }

    fn is_local_octets(o: [u8; 4]) -> bool {
        o[0] == 10
            || o[0] == 127
            || (o[0] == 192 && o[1] == 168)
            || (o[0] == 172 && (16..=31).contains(&o[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== normalize Tests =====

    #[test]
    fn test_normalize_strips_ipv4_port() {
        assert_eq!(AddressNormalizer::normalize("8.8.8.8:28015"), "8.8.8.8");
        assert_eq!(AddressNormalizer::normalize("1.2.3.4:1"), "1.2.3.4");
    }

    #[test]
    fn test_normalize_leaves_bare_ipv4() {
        assert_eq!(AddressNormalizer::normalize("8.8.8.8"), "8.8.8.8");
    }

    #[test]
    fn test_normalize_leaves_bare_ipv6() {
        assert_eq!(AddressNormalizer::normalize("2001:db8::1"), "2001:db8::1");
        assert_eq!(AddressNormalizer::normalize("::1"), "::1");
    }

    #[test]
    fn test_normalize_bracketed_ipv6_with_port() {
        assert_eq!(
            AddressNormalizer::normalize("[2001:db8::1]:28015"),
            "2001:db8::1"
        );
    }

    #[test]
    fn test_normalize_bracketed_ipv6_without_port() {
        assert_eq!(AddressNormalizer::normalize("[2001:db8::1]"), "2001:db8::1");
    }

    #[test]
    fn test_normalize_hostname_with_port() {
        assert_eq!(AddressNormalizer::normalize("localhost:28015"), "localhost");
    }

    #[test]
    fn test_normalize_malformed_passes_through() {
        let inputs = vec!["", "not an address", "1.2.3.4:port", "host:", ":123"];

        for input in inputs {
            assert_eq!(
                AddressNormalizer::normalize(input),
                input.trim(),
                "Failed for input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(AddressNormalizer::normalize(" 8.8.8.8:1 "), "8.8.8.8");
    }

    // ===== is_local Tests =====

    #[test]
    fn test_is_local_private_ranges() {
        let local = vec![
            "10.0.0.1",
            "10.255.255.255",
            "127.0.0.1",
            "127.1.2.3",
            "192.168.0.1",
            "192.168.255.254",
            "172.16.0.1",
            "172.20.10.10",
            "172.31.255.255",
        ];

        for ip in local {
            assert!(AddressNormalizer::is_local(ip), "Expected local: {}", ip);
        }
    }

    #[test]
    fn test_is_local_public_addresses() {
        let public = vec![
            "8.8.8.8",
            "1.1.1.1",
            "172.15.0.1",
            "172.32.0.1",
            "192.169.0.1",
            "11.0.0.1",
            "126.255.255.255",
        ];

        for ip in public {
            assert!(!AddressNormalizer::is_local(ip), "Expected public: {}", ip);
        }
    }

    #[test]
    fn test_is_local_malformed_is_not_local() {
        let malformed = vec!["", "10.0.0", "10.0.0.1.5", "10.a.0.1", "300.0.0.1", "localhost"];

        for ip in malformed {
            assert!(!AddressNormalizer::is_local(ip), "Expected not local: {}", ip);
        }
    }

    #[test]
    fn test_is_local_accepts_leading_zeros() {
        assert!(AddressNormalizer::is_local("010.0.0.1"));
    }

    #[test]
    fn test_is_local_ipv6() {
        assert!(AddressNormalizer::is_local("::1"));
        assert!(AddressNormalizer::is_local("::ffff:192.168.1.10"));
        assert!(!AddressNormalizer::is_local("::ffff:8.8.8.8"));
        assert!(!AddressNormalizer::is_local("2001:4860:4860::8888"));
    }
}
