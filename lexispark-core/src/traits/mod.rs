//! Collaborator interfaces consumed by the verification core
//!
//! The storage layer owns the word catalogs; the core only sees them through
//! these traits, which keeps it free of global state and testable against an
//! in-memory catalog.

pub mod backend;

pub use backend::{CategoryEntry, CategorySource, SlotMatch, WordLookup};
