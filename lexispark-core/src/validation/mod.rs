//! Validation and parsing utilities
//!
//! Pure functions over lengths and strings with no I/O dependencies.

pub mod bounds;
pub mod parsing;

pub use bounds::{validate_word_payload, word_count_for_bits};
pub use parsing::{parse_category_id, validate_label, PuzzleRef};
