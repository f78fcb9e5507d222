//! At-rest obfuscation for the stored session bundle.
//!
//! The bundle is XORed with a repeating key and base64 encoded before it is
//! written to the key-value store. This keeps tokens from showing up as
//! plain text in storage dumps. It is **not** encryption: anyone holding the
//! key (which ships with the client) can reverse it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Reversible XOR + base64 encoder for strings.
///
/// # Examples
///
/// ```
/// use core_auth::Obfuscator;
///
/// let obfuscator = Obfuscator::new("k3y");
/// let opaque = obfuscator.encode(r#"{"accessToken":"A1"}"#);
///
/// assert_ne!(opaque, r#"{"accessToken":"A1"}"#);
/// assert_eq!(
///     obfuscator.decode(&opaque).as_deref(),
///     Some(r#"{"accessToken":"A1"}"#)
/// );
///
/// // Values that were never encoded come back unchanged.
/// assert_eq!(obfuscator.decode("not base64!").as_deref(), Some("not base64!"));
/// ```
#[derive(Clone)]
pub struct Obfuscator {
    key: Vec<u8>,
}

impl Obfuscator {
    /// An empty key disables the XOR step (plain base64).
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }

    pub fn encode(&self, plain: &str) -> String {
        STANDARD.encode(self.apply(plain.as_bytes()))
    }

    /// Reverse [`encode`](Self::encode).
    ///
    /// Returns `None` for empty input. Input that is not valid base64, or
    /// whose decoded bytes are not UTF-8 after un-XORing, is treated as
    /// plain text and returned as-is.
    pub fn decode(&self, opaque: &str) -> Option<String> {
        if opaque.is_empty() {
            return None;
        }

        let decoded = match STANDARD.decode(opaque) {
            Ok(bytes) => bytes,
            Err(_) => return Some(opaque.to_string()),
        };

        match String::from_utf8(self.apply(&decoded)) {
            Ok(plain) => Some(plain),
            Err(_) => Some(opaque.to_string()),
        }
    }

    fn apply(&self, bytes: &[u8]) -> Vec<u8> {
        if self.key.is_empty() {
            return bytes.to_vec();
        }
        bytes
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }
}

impl fmt::Debug for Obfuscator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obfuscator")
            .field("key", &"[REDACTED]")
            .field("key_len", &self.key.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{"accessToken":"A1","refreshToken":"R1","user":null,"expiresAt":1700000000000}"#;

    #[test]
    fn test_round_trip_with_key() {
        let obfuscator = Obfuscator::new("intransparency-obfuscation");
        let opaque = obfuscator.encode(BUNDLE);

        assert!(!opaque.contains("accessToken"));
        assert_eq!(obfuscator.decode(&opaque).as_deref(), Some(BUNDLE));
    }

    #[test]
    fn test_empty_key_is_plain_base64() {
        let obfuscator = Obfuscator::new("");
        let opaque = obfuscator.encode("hello");

        assert_eq!(opaque, "aGVsbG8=");
        assert_eq!(obfuscator.decode(&opaque).as_deref(), Some("hello"));
    }

    #[test]
    fn test_round_trip_non_ascii() {
        let obfuscator = Obfuscator::new("k");
        let plain = "Università di Bologna ✓";
        assert_eq!(
            obfuscator.decode(&obfuscator.encode(plain)).as_deref(),
            Some(plain)
        );
    }

    /// Printable ASCII string drawn from a small linear congruential generator.
    fn ascii_string(state: &mut u64, max_len: u64) -> String {
        let mut next = || {
            *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            *state >> 33
        };
        let len = next() % (max_len + 1);
        (0..len).map(|_| (b' ' + (next() % 95) as u8) as char).collect()
    }

    #[test]
    fn test_round_trip_generated_json() {
        let mut state = 0x5eed_u64;

        for key in ["k", "intransparency-obfuscation", "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~"] {
            let obfuscator = Obfuscator::new(key);

            for _ in 0..300 {
                let bundle = serde_json::json!({
                    "accessToken": ascii_string(&mut state, 64),
                    "refreshToken": ascii_string(&mut state, 64),
                    "user": { "id": ascii_string(&mut state, 16), "email": ascii_string(&mut state, 32) },
                    "expiresAt": state % 4_000_000_000_000,
                })
                .to_string();

                let opaque = obfuscator.encode(&bundle);
                assert_eq!(obfuscator.decode(&opaque).as_deref(), Some(bundle.as_str()));
            }
        }
    }

    #[test]
    fn test_decode_empty_is_none() {
        assert_eq!(Obfuscator::new("k").decode(""), None);
    }

    #[test]
    fn test_decode_invalid_base64_returns_input() {
        let obfuscator = Obfuscator::new("k");
        assert_eq!(
            obfuscator.decode("{\"legacy\":true}").as_deref(),
            Some("{\"legacy\":true}")
        );
    }

    #[test]
    fn test_wrong_key_does_not_recover_plain_text() {
        let opaque = Obfuscator::new("first").encode(BUNDLE);
        let decoded = Obfuscator::new("second").decode(&opaque);
        assert_ne!(decoded.as_deref(), Some(BUNDLE));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", Obfuscator::new("super-secret"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("key_len"));
    }
}
