//! Base62 编码
//!
//! 字母表顺序为 `0-9a-z A-Z`，高位在前，不做前导零填充。

pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = 62;

/// Encode `value` with the minimal number of base62 digits (`0` → `"0"`).
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    // u64::MAX 在 62 进制下是 11 位
    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(ALPHABET[(value % BASE) as usize]);
        value /= BASE;
    }
    digits.reverse();

    // 字母表全是 ASCII
    digits.into_iter().map(char::from).collect()
}

/// Decode a base62 string back to its value.
///
/// Returns `None` for empty input, characters outside the alphabet, or
/// overflow. Leading zero digits are rejected so that every value has exactly
/// one encoding.
pub fn decode(code: &str) -> Option<u64> {
    let bytes = code.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == ALPHABET[0]) {
        return None;
    }

    bytes.iter().try_fold(0u64, |acc, &b| {
        let digit = digit_value(b)?;
        acc.checked_mul(BASE)?.checked_add(digit)
    })
}

fn digit_value(b: u8) -> Option<u64> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u64),
        b'a'..=b'z' => Some((b - b'a') as u64 + 10),
        b'A'..=b'Z' => Some((b - b'A') as u64 + 36),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_small_values() {
        assert_eq!(encode(0), "0");
        assert_eq!(encode(9), "9");
        assert_eq!(encode(10), "a");
        assert_eq!(encode(35), "z");
        assert_eq!(encode(36), "A");
        assert_eq!(encode(61), "Z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(62 * 62), "100");
    }

    #[test]
    fn test_encode_max() {
        let code = encode(u64::MAX);
        assert_eq!(code.len(), 11);
        assert_eq!(decode(&code), Some(u64::MAX));
    }

    #[test]
    fn test_decode_rejects_invalid() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("ab-c"), None);
        assert_eq!(decode("00"), None);
        assert_eq!(decode("ZZZZZZZZZZZZ"), None);
    }

    #[test]
    fn test_decode_known_values() {
        assert_eq!(decode("0"), Some(0));
        assert_eq!(decode("Z"), Some(61));
        assert_eq!(decode("10"), Some(62));
    }
}
