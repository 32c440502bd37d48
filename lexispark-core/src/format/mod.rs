//! Binary format definitions for the Bloom filter blob
//!
//! This module contains the wire layout shared by the offline builder and every
//! client that verifies guesses. No I/O, only encoding and decoding.

pub mod blob;
pub mod constants;

pub use blob::{BlobHash, BlobHeader};
