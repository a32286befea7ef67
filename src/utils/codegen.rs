//! Short code generation strategies.
//!
//! The allocator cycles through these strategies across collision retries;
//! each produces a code of the requested length from the URL-safe character
//! set. Strategy selection is `attempt % 4`, so the cheapest and strongest
//! strategy (pure random over the 62-symbol alphabet) gets two slots.

use base64::Engine as _;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generates a candidate short code for the given retry attempt.
pub fn generate(attempt: u32, length: usize) -> String {
    match attempt % 4 {
        1 => hashed_uuid(length),
        2 => timestamped(length),
        _ => random_alphanumeric(length),
    }
}

/// 62-symbol alphabet sampled from cryptographically secure bytes,
/// one byte pair per character.
pub fn random_alphanumeric(length: usize) -> String {
    let mut buf = vec![0u8; length * 2];
    getrandom::fill(&mut buf).expect("system RNG failure");

    buf.chunks_exact(2)
        .map(|pair| {
            let n = u16::from_be_bytes([pair[0], pair[1]]);
            ALPHABET[(n % 62) as usize] as char
        })
        .collect()
}

/// UUIDv4 hashed with SHA-256 and base64url-truncated to `length`.
fn hashed_uuid(length: usize) -> String {
    let digest = Sha256::digest(Uuid::new_v4().as_bytes());
    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    encoded.chars().take(length).collect()
}

/// Current time in base 36 concatenated with a random 62-symbol suffix;
/// the last `length` characters are taken.
fn timestamped(length: usize) -> String {
    let ts = to_base36(Utc::now().timestamp_millis() as u64);
    let combined = format!("{}{}", ts, random_alphanumeric(length));
    let chars: Vec<char> = combined.chars().collect();
    chars[chars.len() - length..].iter().collect()
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_alphanumeric_charset_and_length() {
        for len in [6, 8, 20] {
            let code = random_alphanumeric(len);
            assert_eq!(code.len(), len);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_hashed_uuid_is_urlsafe() {
        let code = hashed_uuid(10);
        assert_eq!(code.len(), 10);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_timestamped_length() {
        for len in [6, 9, 20] {
            assert_eq!(timestamped(len).len(), len);
        }
    }

    #[test]
    fn test_generate_cycles_strategies() {
        for attempt in 0..8 {
            let code = generate(attempt, 7);
            assert_eq!(code.len(), 7, "attempt {attempt}");
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            );
        }
    }

    #[test]
    fn test_generated_codes_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(random_alphanumeric(8)));
        }
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
