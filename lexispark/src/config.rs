//! Configuration for filter building and daily selection

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};
use lexispark_core::{DailySeed, DEFAULT_FALSE_POSITIVE_RATE};

/// Configuration for building category filters
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Target false-positive rate for every leaf filter
    pub false_positive_rate: f64,
}

impl FilterConfig {
    /// Set the target false-positive rate
    pub fn with_false_positive_rate(mut self, rate: f64) -> Self {
        self.false_positive_rate = rate;
        self
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
        }
    }
}

/// Source of "today" for daily selection
///
/// Every server instance must agree on the date, so it is read in one fixed
/// reference offset rather than the host's local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyClock {
    offset: FixedOffset,
    pinned: Option<NaiveDate>,
}

impl DailyClock {
    /// Clock reading dates in UTC
    pub fn utc() -> Self {
        Self::with_offset(Utc.fix())
    }

    /// Clock reading dates at a fixed UTC offset
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset,
            pinned: None,
        }
    }

    /// Clock at a whole-hour offset, `None` when the offset is out of range
    pub fn with_offset_hours(hours: i32) -> Option<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(Self::with_offset)
    }

    /// Clock that always reports `date`
    pub fn pinned(date: NaiveDate) -> Self {
        Self {
            pinned: Some(date),
            ..Self::utc()
        }
    }

    /// Reference offset
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar date at `now` in the reference offset
    pub fn date_at(&self, now: DateTime<Utc>) -> NaiveDate {
        match self.pinned {
            Some(date) => date,
            None => now.with_timezone(&self.offset).date_naive(),
        }
    }

    /// Today's calendar date in the reference offset
    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }

    /// Start of the next reference day after `now`, when today's puzzles expire
    pub fn next_rollover(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.date_at(now)
            .succ_opt()?
            .and_hms_opt(0, 0, 0)?
            .and_local_timezone(self.offset)
            .single()
            .map(|at| at.with_timezone(&Utc))
    }

    /// Today's seed for `label`
    pub fn seed<'a>(&self, label: &'a str) -> lexispark_core::Result<DailySeed<'a>> {
        let date = self.today();
        DailySeed::new(date.year(), date.month(), date.day(), label)
    }
}

impl Default for DailyClock {
    fn default() -> Self {
        Self::utc()
    }
}
