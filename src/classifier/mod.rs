//! Annotation Classifier
//!
//! Pure, stateless parsing of an object's annotation map into an expiration
//! verdict. No I/O, no shared state: safe to call from any number of
//! concurrent workers without synchronization. All time handling is explicit
//! (`now` is an argument) so every call site is deterministic under test.


use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use chrono::NaiveDateTime;

use crate::constants::ANNOTATION_EXPIRES_AT;
use crate::constants::ANNOTATION_WARN_BEFORE;
use crate::constants::DEFAULT_WARN_DAYS;
use crate::constants::EXPIRES_AT_FORMAT;

const SECS_PER_DAY: u64 = 86_400;

/// Three-way expiration state derived from a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationStatus {
    Expired,
    ExpiringSoon,
    Valid,
}

/// Ephemeral result of classifying one object at one instant.
///
/// Recomputed from the current snapshot on every reconciliation pass, never
/// persisted, so it is always consistent with "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationVerdict {
    /// Midnight (process-local naive frame) of the annotated date
    pub expires_at: NaiveDateTime,
    /// Warning lead time before expiration
    pub lead_time: Duration,
    /// Signed day count until expiration; negative once expired
    pub days_until: i64,
    /// True when a warn-before annotation was present but unparsable and
    /// the 7-day default was substituted
    pub lead_time_defaulted: bool,
}

impl ExpirationVerdict {
    /// Whole days of lead time, truncated
    pub fn warn_days(&self) -> i64 {
        (self.lead_time.as_secs() / SECS_PER_DAY) as i64
    }

    pub fn status(&self) -> ExpirationStatus {
        if self.days_until < 0 {
            ExpirationStatus::Expired
        } else if self.days_until <= self.warn_days() {
            ExpirationStatus::ExpiringSoon
        } else {
            ExpirationStatus::Valid
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyOutcome {
    /// No expiration annotation: the object is not this engine's concern
    Untracked,
    /// Expiration annotation present but malformed. A data error: the
    /// object is excluded from tracking for this pass and never retried.
    Invalid { reason: String },
    Tracked(ExpirationVerdict),
}

impl ClassifyOutcome {
    pub fn is_tracked(&self) -> bool {
        matches!(self, ClassifyOutcome::Tracked(_))
    }
}

/// Classify an annotation map at instant `now`.
///
/// Tracked iff the expires-at key is present. The day count is the floored
/// signed division of the remaining time by 24h, so an object one hour past
/// its midnight deadline already counts as day `-1`.
pub fn classify(
    annotations: &HashMap<String, String>,
    now: NaiveDateTime,
) -> ClassifyOutcome {
    let raw_date = match annotations.get(ANNOTATION_EXPIRES_AT) {
        Some(v) => v,
        None => return ClassifyOutcome::Untracked,
    };

    let expires_at = match NaiveDate::parse_from_str(raw_date, EXPIRES_AT_FORMAT) {
        Ok(date) => date.and_hms_opt(0, 0, 0).expect("midnight is always valid"),
        Err(e) => {
            return ClassifyOutcome::Invalid {
                reason: format!("invalid {} value {:?}: {}", ANNOTATION_EXPIRES_AT, raw_date, e),
            };
        }
    };

    let (lead_time, lead_time_defaulted) = match annotations.get(ANNOTATION_WARN_BEFORE) {
        None => (Duration::from_secs(DEFAULT_WARN_DAYS as u64 * SECS_PER_DAY), false),
        Some(raw) => match parse_lead_time(raw) {
            Ok(d) => (d, false),
            // Unparsable lead time is reported, not fatal
            Err(_) => (Duration::from_secs(DEFAULT_WARN_DAYS as u64 * SECS_PER_DAY), true),
        },
    };

    let days_until = (expires_at - now).num_seconds().div_euclid(SECS_PER_DAY as i64);

    ClassifyOutcome::Tracked(ExpirationVerdict {
        expires_at,
        lead_time,
        days_until,
        lead_time_defaulted,
    })
}

/// Parse a lead-time annotation value.
///
/// Accepts `<integer>d` (whole days) ahead of the general humantime grammar
/// so that plain day counts never depend on the external parser's notion of
/// a day.
pub(crate) fn parse_lead_time(s: &str) -> std::result::Result<Duration, String> {
    if let Some(days_str) = s.strip_suffix('d') {
        if !days_str.is_empty() && days_str.bytes().all(|b| b.is_ascii_digit()) {
            let days: u64 = days_str
                .parse()
                .map_err(|e| format!("invalid days value {:?}: {}", s, e))?;
            return Ok(Duration::from_secs(days * SECS_PER_DAY));
        }
    }

    humantime::parse_duration(s).map_err(|e| format!("invalid duration {:?}: {}", s, e))
}
