//! Short code generation and custom code validation.
//!
//! Generated codes use the 62-symbol alphabet `[0-9A-Za-z]`; custom codes may
//! also contain `-` and `_`. Both rules are part of the public contract for
//! clients that build or check codes themselves.

use rand::RngExt;
use sha2::{Digest, Sha256};

/// Symbols used for generated codes
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const DEFAULT_CODE_LENGTH: usize = 6;
pub const CUSTOM_CODE_MIN_LEN: usize = 3;
pub const CUSTOM_CODE_MAX_LEN: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Derive a candidate code for `url`.
    ///
    /// The URL is hashed together with fresh randomness; the leading 64 bits of
    /// the digest are written out in base 62, least significant symbol last.
    /// If the value runs out before `length` symbols, the remaining high-order
    /// positions are filled with random symbols. Two calls for the same URL are
    /// unlikely, not guaranteed, to differ.
    pub fn generate(&self, url: &str) -> String {
        let mut rng = rand::rng();
        let salt: u128 = rng.random();

        let digest = Sha256::new()
            .chain_update(url.as_bytes())
            .chain_update(salt.to_le_bytes())
            .finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let mut num = u64::from_be_bytes(prefix);

        let base = ALPHABET.len() as u64;
        let mut symbols = Vec::with_capacity(self.length);
        while num > 0 && symbols.len() < self.length {
            symbols.push(ALPHABET[(num % base) as usize]);
            num /= base;
        }
        while symbols.len() < self.length {
            symbols.push(ALPHABET[rng.random_range(0..ALPHABET.len())]);
        }

        symbols.reverse();
        symbols.into_iter().map(char::from).collect()
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

/// A custom code is 3-20 characters from `[A-Za-z0-9_-]`. Case is preserved
/// and no words are reserved.
pub fn is_valid_custom_code(code: &str) -> bool {
    (CUSTOM_CODE_MIN_LEN..=CUSTOM_CODE_MAX_LEN).contains(&code.len())
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
