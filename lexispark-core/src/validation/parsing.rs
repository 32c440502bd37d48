//! Parsing utilities for puzzle identifiers and selection labels
//!
//! Pure string functions with no I/O dependencies.

use crate::{LexisError, Result};

/// Which puzzle a request refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PuzzleRef {
    /// Today's public puzzle
    Daily,
    /// Today's second puzzle, selected independently and shown without its name
    HiddenDaily,
    /// Any valid category, chosen uniformly
    Random,
    /// A specific category id
    Id(u32),
}

impl PuzzleRef {
    /// Parse a path segment: `daily`, `hidden-daily`, `random`, or a decimal id
    pub fn parse(segment: &str) -> Result<Self> {
        match segment {
            "daily" => Ok(PuzzleRef::Daily),
            "hidden-daily" => Ok(PuzzleRef::HiddenDaily),
            "random" => Ok(PuzzleRef::Random),
            other => parse_category_id(other).map(PuzzleRef::Id),
        }
    }

    /// Daily selection label, for the refs that are picked by date
    pub const fn daily_label(&self) -> Option<&'static str> {
        match self {
            PuzzleRef::Daily => Some("daily"),
            PuzzleRef::HiddenDaily => Some("hidden"),
            _ => None,
        }
    }
}

impl core::str::FromStr for PuzzleRef {
    type Err = LexisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl core::fmt::Display for PuzzleRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PuzzleRef::Daily => write!(f, "daily"),
            PuzzleRef::HiddenDaily => write!(f, "hidden-daily"),
            PuzzleRef::Random => write!(f, "random"),
            PuzzleRef::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Parse a decimal category id
///
/// Only ASCII digits are accepted; signs, whitespace and trailing garbage are
/// rejected rather than silently truncated.
pub fn parse_category_id(s: &str) -> Result<u32> {
    if s.is_empty() {
        return Err(LexisError::InvalidCategoryId);
    }

    let mut result: u32 = 0;
    for byte in s.bytes() {
        if !byte.is_ascii_digit() {
            return Err(LexisError::InvalidCategoryId);
        }

        let digit = (byte - b'0') as u32;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(LexisError::InvalidCategoryId)?;
    }

    Ok(result)
}

/// Validate a daily selection label
///
/// Labels are short free-form tags; they must be non-empty and free of
/// control characters so the seed string stays printable.
pub fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() || label.len() > 256 {
        return Err(LexisError::InvalidLabel);
    }

    if label.chars().any(char::is_control) {
        return Err(LexisError::InvalidLabel);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_puzzle_ref() {
        assert_eq!(PuzzleRef::parse("daily"), Ok(PuzzleRef::Daily));
        assert_eq!(PuzzleRef::parse("hidden-daily"), Ok(PuzzleRef::HiddenDaily));
        assert_eq!(PuzzleRef::parse("random"), Ok(PuzzleRef::Random));
        assert_eq!(PuzzleRef::parse("42"), Ok(PuzzleRef::Id(42)));
        assert_eq!("7".parse::<PuzzleRef>(), Ok(PuzzleRef::Id(7)));

        assert_eq!(PuzzleRef::parse("Daily"), Err(LexisError::InvalidCategoryId));
        assert_eq!(PuzzleRef::parse(""), Err(LexisError::InvalidCategoryId));
    }

    #[test]
    fn test_display_round_trips() {
        for r in [
            PuzzleRef::Daily,
            PuzzleRef::HiddenDaily,
            PuzzleRef::Random,
            PuzzleRef::Id(314),
        ] {
            assert_eq!(PuzzleRef::parse(&r.to_string()), Ok(r));
        }
    }

    #[test]
    fn test_parse_category_id() {
        assert_eq!(parse_category_id("0"), Ok(0));
        assert_eq!(parse_category_id("123"), Ok(123));
        assert_eq!(parse_category_id("4294967295"), Ok(u32::MAX));

        // Invalid cases
        assert_eq!(parse_category_id("4294967296"), Err(LexisError::InvalidCategoryId));
        assert_eq!(parse_category_id("12a"), Err(LexisError::InvalidCategoryId));
        assert_eq!(parse_category_id("-3"), Err(LexisError::InvalidCategoryId));
        assert_eq!(parse_category_id(" 3"), Err(LexisError::InvalidCategoryId));
    }

    #[test]
    fn test_daily_labels() {
        assert_eq!(PuzzleRef::Daily.daily_label(), Some("daily"));
        assert_eq!(PuzzleRef::HiddenDaily.daily_label(), Some("hidden"));
        assert_eq!(PuzzleRef::Id(1).daily_label(), None);
    }

    #[test]
    fn test_validate_label() {
        assert_eq!(validate_label("daily"), Ok(()));
        assert_eq!(validate_label("hidden"), Ok(()));
        assert_eq!(validate_label("fête"), Ok(()));

        assert_eq!(validate_label(""), Err(LexisError::InvalidLabel));
        assert_eq!(validate_label("a\0b"), Err(LexisError::InvalidLabel));
        assert_eq!(validate_label("line\nbreak"), Err(LexisError::InvalidLabel));
        assert_eq!(validate_label(&"x".repeat(300)), Err(LexisError::InvalidLabel));
    }
}
