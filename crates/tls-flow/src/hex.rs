//! Lowercase hex encoding for the opaque byte fields the structured report
//! serializes (serial numbers, signature bytes, random nonces, extension
//! payloads, session ids). There is no decoding counterpart — nothing in
//! this crate ever reads hex back in; it only ever flows outward into a
//! report.

use std::fmt::Write;

#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
