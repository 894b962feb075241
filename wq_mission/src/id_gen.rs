//! Mission identifier generation.
//!
//! Mission ids take one of two shapes:
//!
//!   `MISSION_<epoch millis>_<counter, 6 digits>`   from `generate`
//!   `MISSION_<YYYYMMDD>_<counter, 4 digits>`       from `generate_daily`
//!
//! Both shapes draw from the same counter, which starts at zero when the
//! generator is constructed and only ever goes up. The daily shape does not
//! reset the counter when the UTC date changes; "daily" describes the label.
//! Padding widths are minimums: counters wider than the width are printed
//! in full.
//!
//! # Clock injection
//! `generate_at` and `generate_daily_at` take `now: DateTime<Utc>` rather
//! than reading the clock, so tests are deterministic. `generate` and
//! `generate_daily` pass `Utc::now()`.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::logging::{self, Component};

/// Prefix carried by every mission id.
pub const MISSION_PREFIX: &str = "MISSION";

/// Minimum width of the counter segment in timestamped ids.
pub const TIMESTAMPED_COUNTER_WIDTH: usize = 6;

/// Minimum width of the counter segment in daily ids.
pub const DAILY_COUNTER_WIDTH: usize = 4;

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Counter-based mission id generator. Not shared between threads; wrap in
/// `SharedMissionIdGenerator` for that.
#[derive(Debug, Default)]
pub struct MissionIdGenerator {
    counter: u64,
}

impl MissionIdGenerator {
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// Number of ids issued so far (the counter value of the last id).
    pub fn counter(&self) -> u64 {
        self.counter
    }

    fn next_counter(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    /// Issues a timestamped id using `now` as the clock reading.
    pub fn generate_at(&mut self, now: DateTime<Utc>) -> String {
        let counter = self.next_counter();
        let id = format!(
            "{}_{}_{:0width$}",
            MISSION_PREFIX,
            now.timestamp_millis(),
            counter,
            width = TIMESTAMPED_COUNTER_WIDTH
        );
        logging::debug(Component::IdGen, Some(&id), "issued timestamped mission id");
        id
    }

    /// Issues a daily-labelled id using `now` as the clock reading.
    pub fn generate_daily_at(&mut self, now: DateTime<Utc>) -> String {
        let counter = self.next_counter();
        let id = format!(
            "{}_{}_{:0width$}",
            MISSION_PREFIX,
            now.format("%Y%m%d"),
            counter,
            width = DAILY_COUNTER_WIDTH
        );
        logging::debug(Component::IdGen, Some(&id), "issued daily mission id");
        id
    }

    /// Issues `MISSION_<epoch millis>_<counter:06>` using the real clock.
    pub fn generate(&mut self) -> String {
        self.generate_at(Utc::now())
    }

    /// Issues `MISSION_<YYYYMMDD>_<counter:04>` using the real clock.
    pub fn generate_daily(&mut self) -> String {
        self.generate_daily_at(Utc::now())
    }
}

// ---------------------------------------------------------------------------
// Thread-safe wrapper
// ---------------------------------------------------------------------------

/// A `MissionIdGenerator` behind a mutex. Cloning shares the same counter.
///
/// The lock is held across the increment and the formatting, so two threads
/// can never observe the same counter value.
#[derive(Debug, Clone, Default)]
pub struct SharedMissionIdGenerator {
    inner: Arc<Mutex<MissionIdGenerator>>,
}

impl SharedMissionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_generator<T>(&self, f: impl FnOnce(&mut MissionIdGenerator) -> T) -> T {
        // The counter is always left consistent, so a poisoned lock is safe to reuse.
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *guard)
    }

    pub fn counter(&self) -> u64 {
        self.with_generator(|g| g.counter())
    }

    pub fn generate_at(&self, now: DateTime<Utc>) -> String {
        self.with_generator(|g| g.generate_at(now))
    }

    pub fn generate_daily_at(&self, now: DateTime<Utc>) -> String {
        self.with_generator(|g| g.generate_daily_at(now))
    }

    pub fn generate(&self) -> String {
        self.with_generator(|g| g.generate())
    }

    pub fn generate_daily(&self) -> String {
        self.with_generator(|g| g.generate_daily())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Which generator operation produced an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionIdKind {
    Timestamped,
    Daily,
}

/// A mission id split into its segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionId {
    pub kind: MissionIdKind,
    /// Epoch millis for timestamped ids, `YYYYMMDD` for daily ids.
    pub stamp: String,
    pub counter: u64,
}

/// Errors that can arise when parsing a mission id string.
#[derive(Debug, PartialEq)]
pub enum MissionIdError {
    /// The string has fewer than three `_`-separated segments.
    MissingSegments,
    /// The first segment is not `MISSION`.
    WrongPrefix(String),
    /// A stamp or counter segment is empty or not all digits.
    BadSegment(String),
    /// The string has more than three segments.
    TooManySegments,
}

impl std::fmt::Display for MissionIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissionIdError::MissingSegments => write!(f, "Mission id needs prefix, stamp and counter"),
            MissionIdError::WrongPrefix(p) => write!(f, "Unexpected mission id prefix: {}", p),
            MissionIdError::BadSegment(s) => write!(f, "Non-numeric mission id segment: {}", s),
            MissionIdError::TooManySegments => write!(f, "Mission id has too many segments"),
        }
    }
}

impl std::error::Error for MissionIdError {}

fn numeric_segment(segment: &str) -> Result<&str, MissionIdError> {
    if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
        return Err(MissionIdError::BadSegment(segment.to_string()));
    }
    Ok(segment)
}

/// Splits a mission id back into its parts. An 8-digit stamp is read as a
/// daily date label; any other length as epoch millis.
pub fn parse_mission_id(id: &str) -> Result<MissionId, MissionIdError> {
    let mut parts = id.split('_');

    let prefix = parts.next().unwrap_or_default();
    let (stamp, counter) = match (parts.next(), parts.next()) {
        (Some(stamp), Some(counter)) => (stamp, counter),
        _ => return Err(MissionIdError::MissingSegments),
    };
    if parts.next().is_some() {
        return Err(MissionIdError::TooManySegments);
    }
    if prefix != MISSION_PREFIX {
        return Err(MissionIdError::WrongPrefix(prefix.to_string()));
    }

    let stamp = numeric_segment(stamp)?;
    let counter = numeric_segment(counter)?
        .parse::<u64>()
        .map_err(|_| MissionIdError::BadSegment(counter.to_string()))?;

    let kind = if stamp.len() == 8 {
        MissionIdKind::Daily
    } else {
        MissionIdKind::Timestamped
    };

    Ok(MissionId {
        kind,
        stamp: stamp.to_string(),
        counter,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
