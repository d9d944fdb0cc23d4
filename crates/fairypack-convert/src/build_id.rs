//! Build identifiers.
//!
//! A build id is an opaque string. Its first 8 characters are the package id;
//! the rest is prepended to every item id assigned during the run. Passing the
//! same build id to repeated conversions of one document keeps ids stable.

use fairypack_core::{ConvertError, Result};
use rand::Rng;
use std::fmt;

/// Number of leading characters that form the package id.
pub const PACKAGE_ID_LEN: usize = 8;

/// A build identifier split into package id and item-id namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildId {
    value: String,
    split: usize,
}

impl BuildId {
    /// Use a caller-supplied build id.
    ///
    /// The id is split exactly as given. Ids shorter than [`PACKAGE_ID_LEN`]
    /// become the package id with an empty namespace. Blank ids are rejected.
    pub fn parse(value: &str) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(ConvertError::InvalidBuildId(value.to_string()));
        }
        let split = value
            .char_indices()
            .nth(PACKAGE_ID_LEN)
            .map(|(i, _)| i)
            .unwrap_or(value.len());
        Ok(Self {
            value: value.to_string(),
            split,
        })
    }

    /// Generate a fresh build id from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a fresh build id from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let magic = to_base36(rng.gen_range(0..36));
        let s1 = format!("{:0>4}", to_base36(rng.gen_range(0..36u64.pow(4))));
        let s2 = format!("{:0>3}", to_base36(rng.gen_range(0..36u64.pow(3))));

        let mut count: u64 = 0;
        for i in 0..4 {
            let c: u64 = rng.gen_range(0..26);
            count += 26u64.pow(i) * (c + 10);
        }
        count += rng.gen_range(0..1_000_000) + rng.gen_range(0..222_640);

        let value = format!("{magic}{s1}{s2}{}", to_base36(count));
        Self {
            split: PACKAGE_ID_LEN,
            value,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The package id (first 8 characters).
    pub fn package_id(&self) -> &str {
        &self.value[..self.split]
    }

    /// The item-id namespace (everything after the package id).
    pub fn item_namespace(&self) -> &str {
        &self.value[self.split..]
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Encode a number in lowercase base 36.
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
