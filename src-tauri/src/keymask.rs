//! Reversible masking for the API key embedded at build time
//!
//! `build.rs` includes this file directly, so it must stay std-only.

/// Repeating XOR mask applied to the key bytes
const KEY_MASK: [u8; 16] = *b"PastelArtisanKey";

/// XORs `bytes` with the repeating mask; applying it twice restores the input
pub fn mask(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(KEY_MASK.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

/// Masks a secret and renders it as lowercase hex. Used by `build.rs`.
#[allow(dead_code)]
pub fn encode(secret: &str) -> String {
    mask(secret.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Reverses [`encode`]; `None` for empty, malformed or non-UTF-8 input
pub fn decode(hex: &str) -> Option<String> {
    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }

    let masked = hex
        .as_bytes()
        .chunks(2)
        .map(|pair| Some(nibble(pair[0])? << 4 | nibble(pair[1])?))
        .collect::<Option<Vec<u8>>>()?;

    String::from_utf8(mask(&masked)).ok()
}

fn nibble(digit: u8) -> Option<u8> {
    char::from(digit).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reverses_encode() {
        let key = "AIzaSy-test-key-0123456789";
        let encoded = encode(key);
        assert_ne!(encoded, key);
        assert_eq!(decode(&encoded).as_deref(), Some(key));
    }

    #[test]
    fn mask_is_its_own_inverse_past_the_mask_length() {
        let bytes: Vec<u8> = (0..=40).collect();
        assert_eq!(mask(&mask(&bytes)), bytes);
    }

    #[test]
    fn decode_rejects_empty_odd_or_non_hex_input() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("abc"), None);
        assert_eq!(decode("zz11"), None);
        assert_eq!(decode("+f"), None);
        assert_eq!(decode("é1"), None);
    }

    #[test]
    fn mask_matches_the_published_key_bytes() {
        assert_eq!(
            KEY_MASK,
            [
                0x50, 0x61, 0x73, 0x74, 0x65, 0x6c, 0x41, 0x72, 0x74, 0x69, 0x73, 0x61, 0x6e,
                0x4b, 0x65, 0x79
            ]
        );
    }
}
