//! Content fingerprints for feed payloads.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::StoreError;

/// Length of a rendered fingerprint (hex of a 256-bit digest).
pub const FINGERPRINT_LEN: usize = 64;

/// SHA-256 digest of a payload, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(payload: &[u8]) -> Self {
        let digest = Sha256::digest(payload);
        Fingerprint(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

/// Fingerprint a payload. Never fails, including for empty input.
pub fn fingerprint(payload: &[u8]) -> Fingerprint {
    Fingerprint::of(payload)
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FINGERPRINT_LEN {
            return Err(StoreError::Corrupt(format!(
                "expected {FINGERPRINT_LEN} hex characters, found {}",
                s.len()
            )));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(StoreError::Corrupt(format!(
                "'{s}' is not lowercase hexadecimal"
            )));
        }
        Ok(Fingerprint(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let payload = b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n";
        assert_eq!(fingerprint(payload), fingerprint(payload));
    }

    #[test]
    fn test_fingerprint_known_vectors() {
        assert_eq!(
            fingerprint(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            fingerprint(b"abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fingerprint_shape() {
        let fp = fingerprint(b"anything");
        assert_eq!(fp.as_str().len(), FINGERPRINT_LEN);
        assert!(fp.as_str().bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        assert_eq!(fp.short().len(), 12);
    }

    #[test]
    fn test_single_byte_flips_change_fingerprint() {
        let base = b"SUMMARY:Board Meeting\r\n".to_vec();
        let original = fingerprint(&base);

        for i in 0..base.len() {
            let mut flipped = base.clone();
            flipped[i] ^= 0x01;
            assert_ne!(
                fingerprint(&flipped),
                original,
                "flipping byte {} should change the fingerprint",
                i
            );
        }
    }

    #[test]
    fn test_trailing_byte_changes_fingerprint() {
        assert_ne!(fingerprint(b"END:VCALENDAR"), fingerprint(b"END:VCALENDAR\n"));
    }

    #[test]
    fn test_parse_roundtrip_and_rejects_bad_input() {
        let fp = fingerprint(b"payload");
        let parsed: Fingerprint = fp.to_string().parse().unwrap();
        assert_eq!(parsed, fp);

        assert!("abc".parse::<Fingerprint>().is_err());
        assert!(fp.as_str().to_uppercase().parse::<Fingerprint>().is_err());
        let not_hex = "g".repeat(FINGERPRINT_LEN);
        assert!(not_hex.parse::<Fingerprint>().is_err());
    }
}
