//! Reference number generation for service requests
//!
//! A reference number is the tracking code a citizen reads back to an office
//! clerk, so it has to be short, unambiguous, and safe to say out loud:
//! `REQ-20250314-K7KQ2N`. The suffix alphabet drops 0/O and 1/I.
//!
//! Uniqueness is not guaranteed at generation time. The creation path relies
//! on the store's unique index and retries with a fresh number on conflict.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Prefix for all service request reference numbers
pub const REFERENCE_PREFIX: &str = "REQ";

/// Unambiguous uppercase alphanumerics (no 0/O, no 1/I)
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the random suffix
pub const SUFFIX_LEN: usize = 6;

/// Generate a reference number for the given timestamp
pub fn generate(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", REFERENCE_PREFIX, now.format("%Y%m%d"), suffix)
}

/// Source of reference numbers for the request creation path.
/// A trait so tests can force collisions with a scripted sequence.
pub trait ReferenceGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Production generator: UTC date plus random suffix
pub struct RequestReferenceGenerator;

impl ReferenceGenerator for RequestReferenceGenerator {
    fn generate(&self) -> String {
        generate(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let reference = generate(now);
        assert_eq!(reference.len(), "REQ-20250314-".len() + SUFFIX_LEN);
        assert!(reference.starts_with("REQ-20250314-"));
    }

    #[test]
    fn test_suffix_alphabet() {
        let reference = generate(Utc::now());
        let suffix = reference.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        for c in suffix.chars() {
            assert!(
                SUFFIX_ALPHABET.contains(&(c as u8)),
                "unexpected character {c} in suffix"
            );
        }
        // The ambiguous characters must never appear
        for c in ['0', 'O', '1', 'I'] {
            assert!(!suffix.contains(c));
        }
    }

    #[test]
    fn test_distinct_across_generations() {
        let now = Utc::now();
        let numbers: HashSet<String> = (0..200).map(|_| generate(now)).collect();
        // 32^6 suffixes per day; 200 draws colliding would indicate a broken RNG
        assert_eq!(numbers.len(), 200);
    }
}
