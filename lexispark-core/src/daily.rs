//! Deterministic daily selection
//!
//! A `(date, label)` pair hashes to the same number on every client and every
//! server instance, so "today's puzzle" needs no shared state. The caller
//! supplies the date; pinning it to one reference timezone is the caller's job.

use crate::validation::parsing::validate_label;
use crate::{LexisError, Result};

/// Seed for one day's selection under one label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySeed<'a> {
    /// Calendar year
    pub year: i32,
    /// Month, 1 through 12
    pub month: u32,
    /// Day of month, 1 through 31
    pub day: u32,
    /// Selection label, e.g. `daily` or `hidden`
    pub label: &'a str,
}

impl<'a> DailySeed<'a> {
    /// Create a seed, rejecting empty or control-character labels
    pub fn new(year: i32, month: u32, day: u32, label: &'a str) -> Result<Self> {
        validate_label(label)?;
        Ok(Self {
            year,
            month,
            day,
            label,
        })
    }

    /// The hashed string, `{year}-{month}-{day}-{label}` without zero padding
    pub fn seed_string(&self) -> String {
        format!("{}-{}-{}-{}", self.year, self.month, self.day, self.label)
    }

    /// Non-negative selection number for this seed
    pub fn number(&self) -> u32 {
        seed_hash(&self.seed_string()).unsigned_abs()
    }

    /// Index into a catalog of `size` entries
    pub fn index(&self, size: usize) -> Result<usize> {
        if size == 0 {
            return Err(LexisError::NoCandidates);
        }
        Ok(self.number() as usize % size)
    }
}

/// `hash * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
pub fn seed_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_string_is_unpadded() {
        let seed = DailySeed::new(2024, 3, 5, "daily").unwrap();
        assert_eq!(seed.seed_string(), "2024-3-5-daily");
    }

    #[test]
    fn test_known_hashes() {
        assert_eq!(seed_hash(""), 0);
        assert_eq!(seed_hash("a"), 97);
        assert_eq!(seed_hash("2024-3-5-daily"), -1739829670);
        assert_eq!(seed_hash("2024-3-5-hidden"), 2021602697);
        assert_eq!(seed_hash("2024-1-1-fête"), 1331634714);
    }

    #[test]
    fn test_index_is_pure() {
        let seed = DailySeed::new(2024, 3, 5, "daily").unwrap();
        assert_eq!(seed.number(), 1739829670);
        assert_eq!(seed.index(7), Ok(5));
        assert_eq!(seed.index(7), seed.index(7));
        assert_eq!(DailySeed::new(2025, 12, 31, "daily").unwrap().index(10), Ok(8));
    }

    #[test]
    fn test_labels_select_independently() {
        let daily = DailySeed::new(2024, 3, 5, "daily").unwrap();
        let hidden = DailySeed::new(2024, 3, 5, "hidden").unwrap();
        let differing = (2..200)
            .filter(|&n| daily.index(n).unwrap() != hidden.index(n).unwrap())
            .count();
        assert!(differing > 150);
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let seed = DailySeed::new(2024, 3, 5, "daily").unwrap();
        assert_eq!(seed.index(0), Err(LexisError::NoCandidates));
    }

    #[test]
    fn test_rejects_bad_labels() {
        assert_eq!(DailySeed::new(2024, 3, 5, ""), Err(LexisError::InvalidLabel));
    }

    #[test]
    fn test_min_hash_stays_in_range() {
        // |i32::MIN| does not fit an i32; the number must still be usable
        assert_eq!(i32::MIN.unsigned_abs() as usize % 3, 2);
    }
}
