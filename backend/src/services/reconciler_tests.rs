use super::*;
use crate::models::{JobStatus, PLACEHOLDER};

fn opener(seq: i64, start: &str, voyage: &str, vessel: &str) -> RawRecord {
    RawRecord::new(seq)
        .with_times(start, PLACEHOLDER)
        .with_vessel(voyage, vessel)
}

fn closer(seq: i64, end: &str, voyage: &str, vessel: &str) -> RawRecord {
    RawRecord::new(seq)
        .with_times(PLACEHOLDER, end)
        .with_vessel(voyage, vessel)
}

fn duration_str(job: &JobRecord) -> String {
    job.duration
        .map(|d| d.to_string())
        .unwrap_or_else(|| "null".to_string())
}

#[test]
fn test_empty_input() {
    let outcome = reconcile(&[], UnmatchedPolicy::Drop);
    assert!(outcome.jobs.is_empty());
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.consumed, 0);
}

#[test]
fn test_opener_then_closer_pairs() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "Dong Hai"),
        closer(2, "2024-05-01 09:45:30", "V01", "Dong Hai"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);

    assert_eq!(outcome.count(), 1);
    assert_eq!(outcome.consumed, 2);
    assert!(outcome.warnings.is_empty());

    let job = &outcome.jobs[0];
    assert_eq!(job.sequence, 1);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.start_time.as_deref(), Some("2024-05-01 08:00:00"));
    assert_eq!(job.end_time.as_deref(), Some("2024-05-01 09:45:30"));
    assert_eq!(duration_str(job), "01:45:30");
}

#[test]
fn test_measurements_come_from_closer() {
    let mut open = opener(1, "2024-05-01 08:00:00", "V01", "Dong Hai");
    open.product = Some("Diesel".to_string());
    open.cumulative_mass = Some(1.0);
    let mut close = closer(2, "2024-05-01 09:00:00", "V01", "Dong Hai");
    close.product = Some("Diesel 0#".to_string());
    close.cumulative_mass = Some(5400.25);
    close.save_time = Some("2024-05-01 09:00:03".to_string());

    let outcome = reconcile(&[open, close], UnmatchedPolicy::Drop);
    let job = &outcome.jobs[0];

    assert_eq!(job.product.as_deref(), Some("Diesel 0#"));
    assert_eq!(job.cumulative_mass, Some(5400.25));
    assert_eq!(job.save_time.as_deref(), Some("2024-05-01 09:00:03"));
}

#[test]
fn test_self_contained_record() {
    let record = RawRecord::new(5)
        .with_times("2024-05-01 08:00:00", "2024-05-01 08:20:00")
        .with_vessel("V02", "Nan Hai");

    let outcome = reconcile(&[record], UnmatchedPolicy::Drop);

    assert_eq!(outcome.count(), 1);
    let job = &outcome.jobs[0];
    assert_eq!(job.sequence, 5);
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(duration_str(job), "00:20:00");
}

#[test]
fn test_self_contained_does_not_consume_pending() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "Dong Hai"),
        RawRecord::new(2)
            .with_times("2024-05-01 08:10:00", "2024-05-01 08:20:00")
            .with_vessel("V01", "Dong Hai"),
        closer(3, "2024-05-01 09:00:00", "V01", "Dong Hai"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);

    assert_eq!(outcome.count(), 2);
    assert_eq!(outcome.jobs[0].status, JobStatus::Complete);
    assert_eq!(outcome.jobs[0].sequence, 2);
    assert_eq!(outcome.jobs[1].status, JobStatus::Completed);
    assert_eq!(outcome.jobs[1].sequence, 1);
}

#[test]
fn test_orphaned_closer_is_dropped() {
    let records = vec![closer(1, "2024-05-01 09:00:00", "V01", "Dong Hai")];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);

    assert!(outcome.jobs.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].kind(), "orphaned_closer");
    assert_eq!(outcome.warnings[0].sequence(), 1);
}

#[test]
fn test_closer_for_other_vessel_is_orphaned() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "Dong Hai"),
        closer(2, "2024-05-01 09:00:00", "V01", "Xi Hai"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);

    assert!(outcome.jobs.is_empty());
    let kinds: Vec<&str> = outcome.warnings.iter().map(|w| w.kind()).collect();
    assert_eq!(kinds, vec!["orphaned_closer", "unmatched_opener"]);
}

#[test]
fn test_voyage_is_part_of_the_key() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "Dong Hai"),
        closer(2, "2024-05-01 09:00:00", "V02", "Dong Hai"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);
    assert!(outcome.jobs.is_empty());
}

#[test]
fn test_missing_key_fields_match_each_other() {
    let records = vec![
        RawRecord::new(1).with_times("2024-05-01 08:00:00", PLACEHOLDER),
        RawRecord::new(2).with_times(PLACEHOLDER, "2024-05-01 08:30:00"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);
    assert_eq!(outcome.count(), 1);
    assert_eq!(duration_str(&outcome.jobs[0]), "00:30:00");
}

#[test]
fn test_anomalous_record_is_dropped() {
    let records = vec![
        RawRecord::new(1).with_times(PLACEHOLDER, PLACEHOLDER),
        RawRecord::new(2),
        RawRecord::new(3).with_times("", "  "),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Incomplete);

    assert!(outcome.jobs.is_empty());
    assert_eq!(outcome.warnings.len(), 3);
    assert!(outcome
        .warnings
        .iter()
        .all(|w| matches!(w, ReconcileWarning::AnomalousRecord { .. })));
}

#[test]
fn test_fifo_pairing_per_key() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "Dong Hai"),
        opener(2, "2024-05-01 08:30:00", "V01", "Dong Hai"),
        closer(3, "2024-05-01 09:00:00", "V01", "Dong Hai"),
        closer(4, "2024-05-01 10:00:00", "V01", "Dong Hai"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);

    assert_eq!(outcome.count(), 2);
    assert_eq!(outcome.jobs[0].sequence, 1);
    assert_eq!(outcome.jobs[0].end_time.as_deref(), Some("2024-05-01 09:00:00"));
    assert_eq!(duration_str(&outcome.jobs[0]), "01:00:00");
    assert_eq!(outcome.jobs[1].sequence, 2);
    assert_eq!(outcome.jobs[1].end_time.as_deref(), Some("2024-05-01 10:00:00"));
    assert_eq!(duration_str(&outcome.jobs[1]), "01:30:00");
}

#[test]
fn test_output_follows_closer_order() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "A"),
        opener(2, "2024-05-01 08:05:00", "V02", "B"),
        closer(3, "2024-05-01 09:00:00", "V02", "B"),
        closer(4, "2024-05-01 09:30:00", "V01", "A"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);
    let sequences: Vec<i64> = outcome.jobs.iter().map(|j| j.sequence).collect();
    assert_eq!(sequences, vec![2, 1]);
}

#[test]
fn test_interleaved_vessels() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "A"),
        opener(2, "2024-05-01 08:00:00", "V02", "B"),
        opener(3, "2024-05-01 08:10:00", "V01", "A"),
        closer(4, "2024-05-01 09:00:00", "V01", "A"),
        closer(5, "2024-05-01 09:00:00", "V01", "A"),
        closer(6, "2024-05-01 09:00:00", "V02", "B"),
        closer(7, "2024-05-01 09:00:00", "V02", "B"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);

    let sequences: Vec<i64> = outcome.jobs.iter().map(|j| j.sequence).collect();
    assert_eq!(sequences, vec![1, 3, 2]);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].sequence(), 7);
}

#[test]
fn test_closed_opener_cannot_match_twice() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "A"),
        closer(2, "2024-05-01 09:00:00", "V01", "A"),
        closer(3, "2024-05-01 10:00:00", "V01", "A"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);
    assert_eq!(outcome.count(), 1);
    assert_eq!(outcome.warnings[0].kind(), "orphaned_closer");
    assert_eq!(outcome.warnings[0].sequence(), 3);
}

#[test]
fn test_negative_span_clamps_to_zero() {
    let records = vec![
        opener(1, "2024-05-01 10:00:00", "V01", "A"),
        closer(2, "2024-05-01 09:00:00", "V01", "A"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);
    assert_eq!(duration_str(&outcome.jobs[0]), "00:00:00");
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_offset_opener_with_naive_closer() {
    let records = vec![
        opener(1, "2024-03-01T08:00:00+08:00", "V1", "Alpha"),
        closer(2, "2024-03-01 08:30:00", "V1", "Alpha"),
    ];
    let outcome = reconcile(&records, UnmatchedPolicy::Drop);
    assert_eq!(duration_str(&outcome.jobs[0]), "00:30:00");
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_multi_day_span_keeps_hours() {
    let record = RawRecord::new(1).with_times("2024-05-01 00:00:00", "2024-05-04 12:00:00");
    let outcome = reconcile(&[record], UnmatchedPolicy::Drop);
    assert_eq!(duration_str(&outcome.jobs[0]), "84:00:00");
}

#[test]
fn test_malformed_timestamp_yields_unavailable() {
    let records = vec![
        opener(1, "not a time", "V01", "A"),
        closer(2, "2024-05-01 09:00:00", "V01", "A"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Drop);

    assert_eq!(outcome.count(), 1);
    assert_eq!(outcome.jobs[0].duration, Some(JobDuration::Unavailable));
    assert_eq!(
        outcome.warnings,
        vec![ReconcileWarning::MalformedTimestamp {
            sequence: 1,
            value: "not a time".to_string(),
        }]
    );
}

#[test]
fn test_unmatched_openers_dropped_by_default() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "A"),
        opener(2, "2024-05-01 08:00:00", "V02", "B"),
    ];

    let outcome = Reconciler::default().reconcile(&records);

    assert!(outcome.jobs.is_empty());
    assert_eq!(outcome.pending_left(), 2);
}

#[test]
fn test_unmatched_openers_emitted_as_incomplete() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "A"),
        opener(2, "2024-05-01 08:05:00", "V02", "B"),
        opener(3, "2024-05-01 08:10:00", "V01", "A"),
        closer(4, "2024-05-01 09:00:00", "V01", "A"),
    ];

    let outcome = reconcile(&records, UnmatchedPolicy::Incomplete);

    let summary: Vec<(i64, JobStatus)> =
        outcome.jobs.iter().map(|j| (j.sequence, j.status)).collect();
    assert_eq!(
        summary,
        vec![
            (1, JobStatus::Completed),
            (2, JobStatus::Incomplete),
            (3, JobStatus::Incomplete),
        ]
    );

    let incomplete = &outcome.jobs[1];
    assert!(incomplete.end_time.is_none());
    assert!(incomplete.duration.is_none());
    assert_eq!(outcome.pending_left(), 2);
}

#[test]
fn test_reconcile_is_deterministic() {
    let records = vec![
        opener(1, "2024-05-01 08:00:00", "V01", "A"),
        opener(2, "2024-05-01 08:00:00", "V02", "B"),
        opener(3, "2024-05-01 08:00:00", "V03", "C"),
        closer(4, "2024-05-01 09:00:00", "V03", "C"),
        RawRecord::new(5),
        closer(6, "2024-05-01 09:00:00", "V09", "Z"),
    ];

    let first = serde_json::to_string(&reconcile(&records, UnmatchedPolicy::Incomplete).jobs).unwrap();
    let second = serde_json::to_string(&reconcile(&records, UnmatchedPolicy::Incomplete).jobs).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_policy_parsing() {
    assert_eq!("drop".parse::<UnmatchedPolicy>().unwrap(), UnmatchedPolicy::Drop);
    assert_eq!(
        "Incomplete".parse::<UnmatchedPolicy>().unwrap(),
        UnmatchedPolicy::Incomplete
    );
    assert!("keep".parse::<UnmatchedPolicy>().is_err());
    assert_eq!(UnmatchedPolicy::default(), UnmatchedPolicy::Drop);
}

#[test]
fn test_warning_messages() {
    let warning = ReconcileWarning::AnomalousRecord { sequence: 42 };
    assert_eq!(
        warning.to_string(),
        "record 42: start and end are both placeholders"
    );
}
