//! Async driver for [`GuessSession`]
//!
//! Round trips for one session are serialized through a queueing gate, and
//! each one races a cancellation signal so `cancel`/`abandon` take effect
//! without waiting for the server.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use lexispark_core::{CategorySource, PuzzleRef};
use tokio::sync::watch;

use crate::puzzle::PuzzleService;
use crate::session::{GuessOutcome, GuessSession, Prefilter, Rejection};
use crate::wire::{GuessRequest, GuessResponse};
use crate::{Error, Result};

/// Authoritative answer source for guesses
pub trait GuessConfirmer {
    /// Look up a normalized guess
    fn confirm(&self, normalized: &str) -> impl Future<Output = Result<GuessResponse>> + Send;
}

impl<T: GuessConfirmer + ?Sized> GuessConfirmer for std::sync::Arc<T> {
    fn confirm(&self, normalized: &str) -> impl Future<Output = Result<GuessResponse>> + Send {
        (**self).confirm(normalized)
    }
}

/// Confirms guesses against an in-process [`PuzzleService`]
#[derive(Debug)]
pub struct LocalConfirmer<'a, S> {
    service: &'a PuzzleService<S>,
    puzzle: PuzzleRef,
    language: String,
}

impl<'a, S: CategorySource> LocalConfirmer<'a, S> {
    pub fn new(service: &'a PuzzleService<S>, puzzle: PuzzleRef, language: &str) -> Self {
        Self {
            service,
            puzzle,
            language: language.to_string(),
        }
    }
}

impl<S: CategorySource> GuessConfirmer for LocalConfirmer<'_, S> {
    fn confirm(&self, normalized: &str) -> impl Future<Output = Result<GuessResponse>> + Send {
        let request = GuessRequest {
            word: normalized.to_string(),
        };
        let response = self.service.guess(self.puzzle, &self.language, &request);
        std::future::ready(response)
    }
}

/// A session plus the confirmer that answers its guesses
pub struct GuessVerifier<C> {
    session: Mutex<GuessSession>,
    confirmer: C,
    gate: tokio::sync::Mutex<()>,
    cancel: watch::Sender<u64>,
    abandoned: AtomicBool,
    deadline: Option<DateTime<Utc>>,
}

impl<C: GuessConfirmer> GuessVerifier<C> {
    pub fn new(session: GuessSession, confirmer: C) -> Self {
        let (cancel, _) = watch::channel(0);
        Self {
            session: Mutex::new(session),
            confirmer,
            gate: tokio::sync::Mutex::new(()),
            cancel,
            abandoned: AtomicBool::new(false),
            deadline: None,
        }
    }

    /// Abandon the session once `deadline` passes
    ///
    /// Used for puzzles that are only reachable through a date-dependent
    /// reference, such as the hidden daily.
    pub fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Lock the session state
    pub fn session(&self) -> MutexGuard<'_, GuessSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Verify one raw guess
    ///
    /// Guesses submitted while another is in flight wait their turn. Transport
    /// failures are returned as errors and never retried; a guess cancelled
    /// while waiting on the server yields [`Error::Cancelled`].
    pub async fn guess(&self, raw: &str) -> Result<GuessOutcome> {
        let _turn = self.gate.lock().await;
        if self.abandoned.load(Ordering::Acquire) {
            return Err(Error::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Utc::now() >= deadline) {
            log::info!("verifier: puzzle expired, abandoning session");
            self.abandon();
            return Err(Error::Expired);
        }
        let mut cancelled = self.cancel.subscribe();

        let prefilter = self.session().begin(raw);
        let pending = match prefilter {
            Prefilter::Confirm(pending) => pending,
            Prefilter::Rejected(reason) => return Ok(GuessOutcome::Rejected(reason)),
        };

        let response = tokio::select! {
            response = self.confirmer.confirm(pending.normalized()) => response,
            _ = cancelled.changed() => {
                self.session().release(&pending);
                log::debug!("verifier: {} cancelled in flight", pending.normalized());
                return Err(Error::Cancelled);
            }
        };

        match response {
            Ok(response) => {
                let outcome = self.session().confirm(pending, &response);
                if outcome == GuessOutcome::Rejected(Rejection::Stale) {
                    return Err(Error::Cancelled);
                }
                Ok(outcome)
            }
            Err(e) => {
                self.session().release(&pending);
                log::warn!("verifier: could not confirm {}: {}", pending.normalized(), e);
                Err(e)
            }
        }
    }

    /// Drop the guess currently waiting on the server, if any
    pub fn cancel(&self) {
        self.session().cancel();
        self.cancel.send_modify(|generation| *generation += 1);
    }

    /// Stop verifying; pending and later guesses end with [`Error::Cancelled`]
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::Release);
        self.cancel();
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Acquire)
    }

    pub fn confirmer(&self) -> &C {
        &self.confirmer
    }

    /// Take the session back out
    pub fn into_session(self) -> GuessSession {
        self.session
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
