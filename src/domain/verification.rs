//! Verification code calculation.
//!
//! The 4-digit code shown to the end user so they can cross-check the hash
//! their device is about to confirm against what the relying party submitted.
//! It is a visual confirmation aid with a deliberately narrow collision space,
//! not a security boundary.

use sha2::{Digest, Sha256};

/// Derive the 4-digit verification code for a hash.
///
/// Always digests with SHA-256 regardless of the algorithm that produced
/// `hash`: the last two bytes of `SHA-256(hash)` are read as a big-endian
/// 16-bit integer, rendered in decimal, left-padded with zeros to four
/// digits, and truncated to the last four digits.
#[must_use]
pub fn calculate(hash: &[u8]) -> String {
    let digest = Sha256::digest(hash);
    let tail = u16::from_be_bytes([digest[30], digest[31]]);
    let padded = format!("{tail:04}");
    padded[padded.len() - 4..].to_string()
}
