//! Time-slot reconciliation.
//!
//! Turns the raw feed into job records. The feed writes a row when a job
//! starts (real start, placeholder end) and another when it ends (placeholder
//! start, real end); some rows carry both timestamps at once. Rows are paired
//! on `(voyage, vessel)`, oldest open job first.
//!
//! # Pending set
//!
//! ```text
//!   slots:  [ #1 A ][ #2 B ][ #3 A ][  -   ]      insertion order
//!   by_key:  A -> [0, 2]   B -> [1]              FIFO per key
//! ```
//!
//! A closer pops the front of its key's queue and empties the slot, so
//! matching is O(1) on average and leftovers are still reported in the order
//! they were opened.
//!
//! A pass never fails. Anything odd in the input is dropped or degraded and
//! reported as a [`ReconcileWarning`], which is also logged.

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::models::{JobDuration, JobRecord, RawRecord, RecordKind};

/// What to do with openers that are still pending when the input runs out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Discard them.
    #[default]
    Drop,
    /// Emit them with status `incomplete` and no end time or duration.
    Incomplete,
}

impl UnmatchedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Incomplete => "incomplete",
        }
    }
}

impl FromStr for UnmatchedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" | "discard" => Ok(Self::Drop),
            "incomplete" | "emit" => Ok(Self::Incomplete),
            _ => Err(format!(
                "Unknown unmatched policy '{}'. Use drop or incomplete.",
                s
            )),
        }
    }
}

/// Recoverable condition met during a pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileWarning {
    #[error("record {sequence}: unparsable timestamp '{value}', duration unavailable")]
    MalformedTimestamp { sequence: i64, value: String },

    #[error("record {sequence}: closing record without an open job (voyage={voyage:?}, vessel={vessel:?})")]
    OrphanedCloser {
        sequence: i64,
        voyage: Option<String>,
        vessel: Option<String>,
    },

    #[error("record {sequence}: start and end are both placeholders")]
    AnomalousRecord { sequence: i64 },

    #[error("record {sequence}: job never closed (voyage={voyage:?}, vessel={vessel:?})")]
    UnmatchedOpener {
        sequence: i64,
        voyage: Option<String>,
        vessel: Option<String>,
    },
}

impl ReconcileWarning {
    /// Sequence number of the row the warning is about.
    pub fn sequence(&self) -> i64 {
        match self {
            Self::MalformedTimestamp { sequence, .. }
            | Self::OrphanedCloser { sequence, .. }
            | Self::AnomalousRecord { sequence }
            | Self::UnmatchedOpener { sequence, .. } => *sequence,
        }
    }

    /// Short machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedTimestamp { .. } => "malformed_timestamp",
            Self::OrphanedCloser { .. } => "orphaned_closer",
            Self::AnomalousRecord { .. } => "anomalous_record",
            Self::UnmatchedOpener { .. } => "unmatched_opener",
        }
    }

    fn orphaned(record: &RawRecord) -> Self {
        Self::OrphanedCloser {
            sequence: record.sequence,
            voyage: record.voyage.clone(),
            vessel: record.vessel.clone(),
        }
    }

    fn unmatched(record: &RawRecord) -> Self {
        Self::UnmatchedOpener {
            sequence: record.sequence,
            voyage: record.voyage.clone(),
            vessel: record.vessel.clone(),
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Jobs in the order they were resolved.
    pub jobs: Vec<JobRecord>,
    pub warnings: Vec<ReconcileWarning>,
    /// Raw rows read.
    pub consumed: usize,
}

impl ReconcileOutcome {
    /// Number of emitted jobs.
    pub fn count(&self) -> usize {
        self.jobs.len()
    }

    /// Openers still pending when the pass ended, whatever the policy.
    pub fn pending_left(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ReconcileWarning::UnmatchedOpener { .. }))
            .count()
    }

    fn note(&mut self, warning: ReconcileWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct JobKey<'a> {
    voyage: Option<&'a str>,
    vessel: Option<&'a str>,
}

impl<'a> JobKey<'a> {
    fn of(record: &'a RawRecord) -> Self {
        Self {
            voyage: record.voyage.as_deref(),
            vessel: record.vessel.as_deref(),
        }
    }
}

#[derive(Default)]
struct PendingStarts<'a> {
    slots: Vec<Option<&'a RawRecord>>,
    by_key: HashMap<JobKey<'a>, VecDeque<usize>>,
}

impl<'a> PendingStarts<'a> {
    fn push(&mut self, record: &'a RawRecord) {
        let slot = self.slots.len();
        self.slots.push(Some(record));
        self.by_key
            .entry(JobKey::of(record))
            .or_default()
            .push_back(slot);
    }

    /// Remove and return the oldest opener for `key`.
    fn take(&mut self, key: &JobKey<'a>) -> Option<&'a RawRecord> {
        let queue = self.by_key.get_mut(key)?;
        let slot = queue.pop_front()?;
        if queue.is_empty() {
            self.by_key.remove(key);
        }
        self.slots[slot].take()
    }

    fn into_remaining(self) -> impl Iterator<Item = &'a RawRecord> {
        self.slots.into_iter().flatten()
    }
}

/// Pairs opener and closer rows into job records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: UnmatchedPolicy,
}

impl Reconciler {
    pub fn new(policy: UnmatchedPolicy) -> Self {
        Self { policy }
    }

    /// Run one pass over `records`, which must be in ascending sequence order.
    pub fn reconcile(&self, records: &[RawRecord]) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome {
            consumed: records.len(),
            ..Default::default()
        };
        let mut pending = PendingStarts::default();

        for record in records {
            match record.kind() {
                RecordKind::Opener => pending.push(record),
                RecordKind::Closer => match pending.take(&JobKey::of(record)) {
                    Some(opener) => {
                        let duration = resolve_duration(
                            opener.sequence,
                            opener.start_time.as_deref(),
                            record.end_time.as_deref(),
                            &mut outcome,
                        );
                        outcome
                            .jobs
                            .push(JobRecord::paired(opener, record, duration));
                    }
                    None => outcome.note(ReconcileWarning::orphaned(record)),
                },
                RecordKind::SelfContained => {
                    let duration = resolve_duration(
                        record.sequence,
                        record.start_time.as_deref(),
                        record.end_time.as_deref(),
                        &mut outcome,
                    );
                    outcome
                        .jobs
                        .push(JobRecord::self_contained(record, duration));
                }
                RecordKind::Anomalous => outcome.note(ReconcileWarning::AnomalousRecord {
                    sequence: record.sequence,
                }),
            }
        }

        for opener in pending.into_remaining() {
            outcome.note(ReconcileWarning::unmatched(opener));
            if self.policy == UnmatchedPolicy::Incomplete {
                outcome.jobs.push(JobRecord::incomplete(opener));
            }
        }

        outcome
    }
}

/// Convenience wrapper around [`Reconciler::reconcile`].
pub fn reconcile(records: &[RawRecord], policy: UnmatchedPolicy) -> ReconcileOutcome {
    Reconciler::new(policy).reconcile(records)
}

fn resolve_duration(
    sequence: i64,
    start: Option<&str>,
    end: Option<&str>,
    outcome: &mut ReconcileOutcome,
) -> JobDuration {
    // Both sides were classified as real before we got here.
    let (start, end) = (start.unwrap_or_default(), end.unwrap_or_default());
    match JobDuration::between(start, end) {
        Ok(duration) => duration,
        Err(e) => {
            outcome.note(ReconcileWarning::MalformedTimestamp {
                sequence,
                value: e.value().to_string(),
            });
            JobDuration::Unavailable
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
