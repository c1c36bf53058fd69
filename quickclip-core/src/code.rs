//! Short public codes for clips.
//!
//! Codes are drawn from a 32-symbol alphabet with the look-alike characters
//! `0`, `O`, `1` and `I` removed, so they can be read aloud or typed from a
//! screenshot without ambiguity.

use rand::Rng;

/// Symbols a code may contain
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Number of symbols in a code
pub const CODE_LENGTH: usize = 6;

/// Draws a code uniformly at random from [`ALPHABET`].
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Canonical form used as the store key: surrounding whitespace removed,
/// letters uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Returns `true` if `code` is exactly [`CODE_LENGTH`] symbols of [`ALPHABET`].
///
/// The check is on the canonical form; callers normalize first.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}

/// Log-safe form of a code: the first two symbols, the rest masked.
///
/// A full code grants read access to its clip, so logs only carry this.
pub fn redact_code(code: &str) -> String {
    let shown: String = code.chars().take(2).collect();
    format!("{shown}****")
}
