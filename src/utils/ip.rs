//! Client IP helpers: private-range detection and irreversible hashing.

use sha2::{Digest, Sha256};
use std::net::IpAddr;

/// Returns `true` for loopback and RFC 1918 private addresses
/// (`10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`), plus the literal
/// `localhost`. Unparseable input is treated as public.
pub fn is_private_or_local(ip: &str) -> bool {
    if ip == "localhost" {
        return true;
    }

    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_private(),
        Ok(IpAddr::V6(v6)) => v6.is_loopback(),
        Err(_) => false,
    }
}

/// SHA-256 of the raw client IP, rendered as 64 lower-case hex characters.
/// The raw IP is never persisted.
pub fn hash_ip_address(ip: &str) -> String {
    let digest = Sha256::digest(ip.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_ranges() {
        assert!(is_private_or_local("127.0.0.1"));
        assert!(is_private_or_local("::1"));
        assert!(is_private_or_local("localhost"));
        assert!(is_private_or_local("10.0.0.1"));
        assert!(is_private_or_local("172.16.0.1"));
        assert!(is_private_or_local("172.31.255.255"));
        assert!(is_private_or_local("192.168.1.1"));
    }

    #[test]
    fn test_public_addresses() {
        assert!(!is_private_or_local("8.8.8.8"));
        assert!(!is_private_or_local("172.32.0.1"));
        assert!(!is_private_or_local("203.175.11.126"));
        assert!(!is_private_or_local("not-an-ip"));
    }

    #[test]
    fn test_hash_is_lowercase_hex_sha256() {
        let hash = hash_ip_address("8.8.8.8");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        // Deterministic
        assert_eq!(hash, hash_ip_address("8.8.8.8"));
        assert_ne!(hash, hash_ip_address("8.8.4.4"));
    }
}
