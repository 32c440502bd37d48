//! LexiSpark - word-list puzzles verified without shipping the word list
//!
//! A player guesses the words of a hidden category. The client only ever
//! holds the word lengths and a Bloom filter of the category; each guess the
//! filter lets through is confirmed by the server, which answers with the
//! slot the word belongs in.
//!
//! ## Architecture
//!
//! LexiSpark follows a clean definition/implementation separation:
//!
//! - **lexispark-core**: normalizer, Bloom codec, daily selector and the
//!   collaborator traits (no I/O)
//! - **lexispark**: catalogs, the category library and its builder, the
//!   puzzle service, the client-side session and verifier, HTTP client and
//!   saved progress
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lexispark::{GuessSession, Library, PuzzleRef, PuzzleService};
//!
//! fn example() -> lexispark::Result<()> {
//!     let library = Library::load("library.json".as_ref())?;
//!     let service = PuzzleService::new(library);
//!
//!     // Server side: open today's puzzle
//!     let start = service.start(PuzzleRef::Daily, "en")?;
//!
//!     // Client side: only the lengths and the filter are known
//!     let session = GuessSession::from_start(&start)?;
//!     println!("{} words to find", session.word_lengths().len());
//!     Ok(())
//! }
//! ```

pub use lexispark_core::{
    // Text and codec
    normalize, BlobHash, BloomFilter,
    // Daily selection
    DailySeed, PuzzleRef,
    // Collaborator traits
    CategoryEntry, CategorySource, SlotMatch, WordLookup,
    // Core errors
    LexisError,
};

pub mod builder;
pub mod catalog;
pub mod category;
pub mod config;
pub mod error;
pub mod http_backend;
pub mod library;
pub mod logging;
pub mod persistence;
pub mod puzzle;
pub mod session;
pub mod verifier;
pub mod wire;

pub use builder::{read_dictionary, LibraryBuilder};
pub use catalog::{CatalogEntry, WordCatalog};
pub use category::{CategoryDefinition, CategoryListing, CategoryNode, Rule};
pub use config::{DailyClock, FilterConfig};
pub use error::{Error, Result};
pub use library::Library;
pub use persistence::{Progress, SessionSnapshot, SessionStore};
pub use puzzle::{PuzzleService, ResolvedPuzzle};
pub use session::{GuessOutcome, GuessSession, PendingGuess, Prefilter, Rejection};
pub use verifier::{GuessConfirmer, GuessVerifier, LocalConfirmer};
pub use wire::{GuessRequest, GuessResponse, PuzzleStart, HIDDEN_DAILY_NAME};

// HTTP client features
pub use http_backend::HttpPuzzleClient;
#[cfg(feature = "http")]
pub use http_backend::RemoteConfirmer;
