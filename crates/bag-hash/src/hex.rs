//! Hex rendering for manifest digests.
//!
//! Manifests are written in lowercase; digests read back may be in either
//! case.

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Render `bytes` as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(DIGITS[usize::from(b >> 4)]));
        out.push(char::from(DIGITS[usize::from(b & 0x0f)]));
    }
    out
}

/// True when `s` is exactly `len` hex digits of either case.
pub fn is_hex_digest(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}
