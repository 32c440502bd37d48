//! Server side of the puzzle protocol
//!
//! [`PuzzleService`] answers the two requests a client makes: opening a
//! puzzle (word lengths plus filter blob) and confirming a guess against the
//! authoritative catalog. It keeps no per-client state.

use lexispark_core::{normalize, CategorySource, LexisError, PuzzleRef, WordLookup};
use rand::Rng;

use crate::config::DailyClock;
use crate::wire::{encode_blob, GuessRequest, GuessResponse, PuzzleStart, HIDDEN_DAILY_NAME};
use crate::{Error, Result};

/// A [`PuzzleRef`] resolved to a concrete category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPuzzle {
    pub id: u32,
    /// Whether the category must be shown anonymously
    pub hidden: bool,
}

/// Stateless puzzle endpoint logic over a category source
#[derive(Debug, Clone)]
pub struct PuzzleService<S> {
    source: S,
    clock: DailyClock,
}

impl<S: CategorySource> PuzzleService<S> {
    /// Service using the UTC clock
    pub fn new(source: S) -> Self {
        Self::with_clock(source, DailyClock::utc())
    }

    pub fn with_clock(source: S, clock: DailyClock) -> Self {
        Self { source, clock }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn clock(&self) -> &DailyClock {
        &self.clock
    }

    /// Resolve a reference to a category id for `language`
    ///
    /// Daily references select among the valid categories by today's seed;
    /// `random` picks one uniformly.
    pub fn resolve(&self, puzzle: PuzzleRef, language: &str) -> Result<ResolvedPuzzle> {
        if let PuzzleRef::Id(id) = puzzle {
            return Ok(ResolvedPuzzle { id, hidden: false });
        }

        let candidates = self.source.valid_categories(language);
        if candidates.is_empty() {
            log::warn!("puzzle: no valid categories for language {}", language);
            return Err(LexisError::NoCandidates.into());
        }

        let index = match puzzle.daily_label() {
            Some(label) => self.clock.seed(label)?.index(candidates.len())?,
            None => rand::thread_rng().gen_range(0..candidates.len()),
        };
        let id = candidates[index];
        log::debug!("puzzle: {} resolved to category {} ({})", puzzle, id, language);

        Ok(ResolvedPuzzle {
            id,
            hidden: puzzle == PuzzleRef::HiddenDaily,
        })
    }

    /// Open a puzzle
    pub fn start(&self, puzzle: PuzzleRef, language: &str) -> Result<PuzzleStart> {
        let resolved = self.resolve(puzzle, language)?;
        let entry = self
            .source
            .category(resolved.id)
            .ok_or(Error::CategoryNotFound(resolved.id))?;

        let (category_name, category_id) = if resolved.hidden {
            (HIDDEN_DAILY_NAME.to_string(), None)
        } else {
            (entry.name.to_string(), Some(entry.id))
        };

        Ok(PuzzleStart {
            word_lengths: entry.catalog.word_lengths(),
            bloom_filter: encode_blob(entry.blob),
            category_name,
            category_id,
        })
    }

    /// Confirm a guess against the authoritative catalog
    ///
    /// The raw word is normalized here; clients are not trusted to have done
    /// it. Guessing against `random` is rejected since it names no fixed
    /// category.
    pub fn guess(
        &self,
        puzzle: PuzzleRef,
        language: &str,
        request: &GuessRequest,
    ) -> Result<GuessResponse> {
        if puzzle == PuzzleRef::Random {
            return Err(LexisError::InvalidCategoryId.into());
        }
        let resolved = self.resolve(puzzle, language)?;
        let entry = self
            .source
            .category(resolved.id)
            .ok_or(Error::CategoryNotFound(resolved.id))?;

        let normalized = normalize(&request.word);
        if normalized.is_empty() {
            return Ok(GuessResponse::not_found());
        }

        Ok(match entry.catalog.find(&normalized) {
            Some(slot) => GuessResponse::found(slot.index, slot.display),
            None => GuessResponse::not_found(),
        })
    }
}
