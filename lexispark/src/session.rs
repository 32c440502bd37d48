//! Client-side guess verification
//!
//! A [`GuessSession`] holds what a client knows about one open puzzle: the
//! word lengths, the filled slots and the shipped Bloom filter. Guessing is
//! split in two so the network round trip happens outside any borrow:
//!
//! 1. [`GuessSession::begin`] normalizes the guess and settles everything
//!    decidable locally (empty input, duplicates, filter negatives). A
//!    surviving guess comes back as a [`PendingGuess`] carrying a ticket.
//! 2. The caller asks the server, then hands the answer to
//!    [`GuessSession::confirm`], which re-checks the slot against the state
//!    at that moment.
//!
//! Only one ticket is live at a time. [`GuessSession::cancel`] voids it, so a
//! late answer to a cancelled guess is never applied.

use chrono::{DateTime, Duration, Utc};
use hashbrown::HashSet;
use lexispark_core::{normalize, BlobHash, BloomFilter};

use crate::persistence::SessionSnapshot;
use crate::wire::{GuessResponse, PuzzleStart};
use crate::Result;

/// Why a guess did not fill a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Input normalized to nothing
    Empty,
    /// Already found in this session
    Duplicate,
    /// Definitely not in the category
    NotInFilter,
    /// Another guess is awaiting confirmation
    Busy,
    /// Every slot is already filled
    Complete,
    /// The server does not know the word
    NotFound,
    /// The server named a slot past the end
    OutOfRange,
    /// The named slot has a different length
    LengthMismatch,
    /// The named slot is already filled
    SlotTaken,
    /// The guess was cancelled or superseded before its answer arrived
    Stale,
}

/// Result of the local half of a guess
#[derive(Debug, PartialEq, Eq)]
pub enum Prefilter {
    /// Settled without asking the server
    Rejected(Rejection),
    /// Needs one authoritative round trip
    Confirm(PendingGuess),
}

/// A guess that passed the filter and awaits the server's answer
#[derive(Debug, PartialEq, Eq)]
pub struct PendingGuess {
    ticket: u64,
    normalized: String,
}

impl PendingGuess {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Lookup key to send to the server
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Final result of a guess
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    Accepted {
        index: usize,
        display: String,
        /// Whether this guess filled the last empty slot
        complete: bool,
    },
    Rejected(Rejection),
}

impl GuessOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GuessOutcome::Accepted { .. })
    }
}

/// State of one open puzzle on the client
#[derive(Debug, Clone)]
pub struct GuessSession {
    word_lengths: Vec<usize>,
    slots: Vec<Option<String>>,
    filter: BloomFilter,
    blob_hash: BlobHash,
    accepted: HashSet<String>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    next_ticket: u64,
    in_flight: Option<u64>,
}

impl GuessSession {
    pub fn new(
        word_lengths: Vec<usize>,
        filter: BloomFilter,
        blob_hash: BlobHash,
        started_at: DateTime<Utc>,
    ) -> Self {
        let slots = vec![None; word_lengths.len()];
        Self {
            word_lengths,
            slots,
            filter,
            blob_hash,
            accepted: HashSet::new(),
            started_at,
            finished_at: None,
            next_ticket: 0,
            in_flight: None,
        }
    }

    /// Open a session from the server's puzzle start, timed from now
    pub fn from_start(start: &PuzzleStart) -> Result<Self> {
        let bytes = start.blob_bytes()?;
        let filter = BloomFilter::from_bytes(&bytes)?;
        Ok(Self::new(
            start.word_lengths.clone(),
            filter,
            BlobHash::of(&bytes),
            Utc::now(),
        ))
    }

    /// Local half of a guess
    pub fn begin(&mut self, raw: &str) -> Prefilter {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Prefilter::Rejected(Rejection::Empty);
        }
        if self.is_complete() {
            return Prefilter::Rejected(Rejection::Complete);
        }
        if self.accepted.contains(&normalized) {
            return Prefilter::Rejected(Rejection::Duplicate);
        }
        if !self.filter.contains(&normalized) {
            return Prefilter::Rejected(Rejection::NotInFilter);
        }
        if self.in_flight.is_some() {
            return Prefilter::Rejected(Rejection::Busy);
        }

        self.next_ticket += 1;
        self.in_flight = Some(self.next_ticket);
        Prefilter::Confirm(PendingGuess {
            ticket: self.next_ticket,
            normalized,
        })
    }

    /// Apply the server's answer, timestamping completion with the current time
    pub fn confirm(&mut self, pending: PendingGuess, response: &GuessResponse) -> GuessOutcome {
        self.confirm_at(pending, response, Utc::now())
    }

    /// Apply the server's answer
    ///
    /// The index, length and empty-slot checks run against the session as it
    /// is now, not as it was when the guess began.
    pub fn confirm_at(
        &mut self,
        pending: PendingGuess,
        response: &GuessResponse,
        now: DateTime<Utc>,
    ) -> GuessOutcome {
        if self.in_flight != Some(pending.ticket) {
            return GuessOutcome::Rejected(Rejection::Stale);
        }
        self.in_flight = None;

        let index = match self.check(&pending.normalized, response) {
            Ok(index) => index,
            Err(reason) => {
                log::debug!("session: {} rejected ({:?})", pending.normalized, reason);
                return GuessOutcome::Rejected(reason);
            }
        };
        let display = response
            .display_word
            .clone()
            .unwrap_or_else(|| pending.normalized.clone());
        self.slots[index] = Some(display.clone());
        self.accepted.insert(pending.normalized);

        let complete = self.slots.iter().all(Option::is_some);
        if complete {
            self.finished_at = Some(now);
            log::info!("session: all {} words found", self.slots.len());
        }
        GuessOutcome::Accepted {
            index,
            display,
            complete,
        }
    }

    fn check(&self, normalized: &str, response: &GuessResponse) -> std::result::Result<usize, Rejection> {
        let index = match (response.found, response.index) {
            (true, Some(index)) => index,
            _ => return Err(Rejection::NotFound),
        };
        if self.is_complete() {
            return Err(Rejection::Complete);
        }
        if self.accepted.contains(normalized) {
            return Err(Rejection::Duplicate);
        }
        let expected = *self.word_lengths.get(index).ok_or(Rejection::OutOfRange)?;
        if expected != normalized.len() {
            return Err(Rejection::LengthMismatch);
        }
        if self.slots[index].is_some() {
            return Err(Rejection::SlotTaken);
        }
        Ok(index)
    }

    /// Release the live ticket after a failed round trip
    ///
    /// Does nothing when `pending` is no longer the live ticket.
    pub fn release(&mut self, pending: &PendingGuess) {
        if self.in_flight == Some(pending.ticket) {
            self.in_flight = None;
        }
    }

    /// Void the live ticket, if any
    pub fn cancel(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            log::debug!("session: cancelled ticket {}", ticket);
        }
    }

    /// Time spent so far, or the final time once complete
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.finished_at.unwrap_or(now) - self.started_at
    }

    /// Record the session for later restoration
    pub fn snapshot(
        &self,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> SessionSnapshot {
        SessionSnapshot {
            guessed_words: self.slots.clone(),
            start_time: self.started_at,
            end_time: self.finished_at,
            bloom_filter_hash: self.blob_hash.to_string(),
            last_updated: now,
            expires_at,
        }
    }

    /// Resume from a snapshot of the same puzzle
    ///
    /// Returns `false` and leaves the session untouched when the snapshot was
    /// taken against a different blob or a different number of slots.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) -> bool {
        if snapshot.bloom_filter_hash != self.blob_hash.to_string()
            || snapshot.guessed_words.len() != self.slots.len()
        {
            log::warn!("session: snapshot does not match the current puzzle");
            return false;
        }

        self.slots = snapshot.guessed_words.clone();
        self.accepted = self.slots.iter().flatten().map(|w| normalize(w)).collect();
        self.started_at = snapshot.start_time;
        self.finished_at = snapshot.end_time;
        self.in_flight = None;
        true
    }

    pub fn word_lengths(&self) -> &[usize] {
        &self.word_lengths
    }

    /// Slot contents in catalog order
    pub fn slots(&self) -> &[Option<String>] {
        &self.slots
    }

    pub fn found_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_complete(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }

    pub fn blob_hash(&self) -> &BlobHash {
        &self.blob_hash
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Ticket of the guess awaiting confirmation
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    fn session(word_lengths: Vec<usize>, words: &[&str]) -> GuessSession {
        let filter = BloomFilter::from_words(words.iter().copied(), 0.01).unwrap();
        let hash = filter.content_hash();
        GuessSession::new(word_lengths, filter, hash, t0())
    }

    fn pets() -> GuessSession {
        // catalog order: bird, cat, dog
        session(vec![4, 3, 3], &["bird", "cat", "dog"])
    }

    fn pending(prefilter: Prefilter) -> PendingGuess {
        match prefilter {
            Prefilter::Confirm(pending) => pending,
            other => panic!("expected a pending guess, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_and_completes() {
        let mut s = pets();
        let p = pending(s.begin("Cat"));
        assert_eq!(p.normalized(), "cat");
        let outcome = s.confirm_at(p, &GuessResponse::found(1, "cat".into()), t0());
        assert_eq!(
            outcome,
            GuessOutcome::Accepted {
                index: 1,
                display: "cat".into(),
                complete: false
            }
        );

        let p = pending(s.begin("dog"));
        s.confirm_at(p, &GuessResponse::found(2, "dog".into()), t0());
        assert!(!s.is_complete());

        let end = t0() + Duration::seconds(90);
        let p = pending(s.begin("BIRD"));
        let outcome = s.confirm_at(p, &GuessResponse::found(0, "bird".into()), end);
        assert!(matches!(outcome, GuessOutcome::Accepted { complete: true, .. }));
        assert_eq!(s.finished_at(), Some(end));
        assert_eq!(s.found_count(), 3);

        assert_eq!(s.begin("cow"), Prefilter::Rejected(Rejection::Complete));
        assert_eq!(s.elapsed(end + Duration::hours(1)), Duration::seconds(90));
    }

    #[test]
    fn test_duplicate_is_a_no_op() {
        let mut s = pets();
        let p = pending(s.begin("cat"));
        s.confirm_at(p, &GuessResponse::found(1, "cat".into()), t0());
        let slots = s.slots().to_vec();

        assert_eq!(s.begin("CAT"), Prefilter::Rejected(Rejection::Duplicate));
        assert_eq!(s.slots(), slots.as_slice());
        assert_eq!(s.in_flight(), None);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        // a 4-letter word claimed at a 3-letter slot
        let mut s = session(vec![3, 3, 4], &["bird", "cat", "dog"]);
        let p = pending(s.begin("bird"));
        let outcome = s.confirm_at(p, &GuessResponse::found(0, "bird".into()), t0());
        assert_eq!(outcome, GuessOutcome::Rejected(Rejection::LengthMismatch));
        assert_eq!(s.slots(), &[None, None, None]);
        assert_eq!(s.found_count(), 0);
    }

    #[test]
    fn test_bad_server_answers_are_rejected() {
        let mut s = pets();

        let p = pending(s.begin("cat"));
        let outcome = s.confirm_at(p, &GuessResponse::found(7, "cat".into()), t0());
        assert_eq!(outcome, GuessOutcome::Rejected(Rejection::OutOfRange));

        let p = pending(s.begin("cat"));
        let outcome = s.confirm_at(p, &GuessResponse::not_found(), t0());
        assert_eq!(outcome, GuessOutcome::Rejected(Rejection::NotFound));

        let p = pending(s.begin("cat"));
        let found_without_index = GuessResponse {
            found: true,
            index: None,
            display_word: None,
        };
        let outcome = s.confirm_at(p, &found_without_index, t0());
        assert_eq!(outcome, GuessOutcome::Rejected(Rejection::NotFound));

        let p = pending(s.begin("dog"));
        s.confirm_at(p, &GuessResponse::found(2, "dog".into()), t0());
        let p = pending(s.begin("cat"));
        let outcome = s.confirm_at(p, &GuessResponse::found(2, "cat".into()), t0());
        assert_eq!(outcome, GuessOutcome::Rejected(Rejection::SlotTaken));
        assert_eq!(s.slots()[2].as_deref(), Some("dog"));
    }

    #[test]
    fn test_display_falls_back_to_normalized() {
        let mut s = session(vec![4], &["elan"]);
        let p = pending(s.begin("Élan"));
        let response = GuessResponse {
            found: true,
            index: Some(0),
            display_word: None,
        };
        let outcome = s.confirm_at(p, &response, t0());
        assert!(matches!(outcome, GuessOutcome::Accepted { ref display, .. } if display == "elan"));
    }

    #[test]
    fn test_local_rejections() {
        let mut s = pets();
        assert_eq!(s.begin(""), Prefilter::Rejected(Rejection::Empty));
        assert_eq!(s.begin("123 !"), Prefilter::Rejected(Rejection::Empty));
        assert_eq!(s.in_flight(), None);

        // nothing is ever set in a filter built from no words
        let mut empty = session(vec![3], &[]);
        assert_eq!(empty.begin("zebra"), Prefilter::Rejected(Rejection::NotInFilter));
    }

    #[test]
    fn test_busy_while_in_flight() {
        let mut s = pets();
        let p = pending(s.begin("cat"));
        assert_eq!(s.in_flight(), Some(p.ticket()));
        assert_eq!(s.begin("dog"), Prefilter::Rejected(Rejection::Busy));

        s.confirm_at(p, &GuessResponse::found(1, "cat".into()), t0());
        assert!(matches!(s.begin("dog"), Prefilter::Confirm(_)));
    }

    #[test]
    fn test_cancelled_ticket_is_never_applied() {
        let mut s = pets();
        let stale = pending(s.begin("cat"));
        s.cancel();
        assert_eq!(s.in_flight(), None);

        let fresh = pending(s.begin("dog"));
        let outcome = s.confirm_at(stale, &GuessResponse::found(1, "cat".into()), t0());
        assert_eq!(outcome, GuessOutcome::Rejected(Rejection::Stale));
        assert_eq!(s.slots()[1], None);
        // the live ticket survives a stale answer
        assert_eq!(s.in_flight(), Some(fresh.ticket()));

        let outcome = s.confirm_at(fresh, &GuessResponse::found(2, "dog".into()), t0());
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_release_frees_the_ticket() {
        let mut s = pets();
        let p = pending(s.begin("cat"));
        s.release(&p);
        assert_eq!(s.in_flight(), None);
        assert!(matches!(s.begin("cat"), Prefilter::Confirm(_)));
    }

    #[test]
    fn test_elapsed_is_read_only() {
        let s = pets();
        let later = t0() + Duration::minutes(5);
        assert_eq!(s.elapsed(later), Duration::minutes(5));
        assert_eq!(s.elapsed(later), Duration::minutes(5));
        assert_eq!(s.finished_at(), None);
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut s = pets();
        let p = pending(s.begin("cat"));
        s.confirm_at(p, &GuessResponse::found(1, "Cat".into()), t0());
        let snapshot = s.snapshot(t0(), None);

        let mut resumed = pets();
        assert!(resumed.restore(&snapshot));
        assert_eq!(resumed.slots(), s.slots());
        assert_eq!(resumed.begin("cat"), Prefilter::Rejected(Rejection::Duplicate));

        let mut other = session(vec![4, 3, 3], &["bird", "cat", "cow"]);
        assert!(!other.restore(&snapshot));
        assert_eq!(other.found_count(), 0);
    }

    #[test]
    fn test_from_start() {
        let filter = BloomFilter::from_words(["cat", "dog", "bird"], 0.01).unwrap();
        let start = PuzzleStart {
            word_lengths: vec![4, 3, 3],
            bloom_filter: crate::wire::encode_blob(&filter.to_bytes()),
            category_name: "Pets".into(),
            category_id: Some(1),
        };
        let s = GuessSession::from_start(&start).unwrap();
        assert_eq!(s.word_lengths(), &[4, 3, 3]);
        assert_eq!(s.blob_hash(), &filter.content_hash());
        assert_eq!(s.filter(), &filter);
    }
}
