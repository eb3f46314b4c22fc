#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use realflow_api::models::{RawRecord, PLACEHOLDER};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // A panicking test must not take every later env test down with it.
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Every variable the configuration layer reads, cleared.
pub const CLEAR_DB_ENV: &[(&str, Option<&str>)] = &[
    ("REPOSITORY_TYPE", None),
    ("DB_SERVER", None),
    ("DB_DATABASE", None),
    ("DB_USER", None),
    ("DB_USERNAME", None),
    ("DB_PASSWORD", None),
    ("DB_PORT", None),
    ("DB_ENCRYPT", None),
    ("DB_TRUST_CERT", None),
    ("DB_POOL_MAX", None),
    ("DB_POOL_MIN", None),
    ("DB_IDLE_TIMEOUT", None),
    ("DB_CONNECT_TIMEOUT", None),
    ("REALFLOW_COMID", None),
    ("RECONCILE_UNMATCHED", None),
    ("LOCAL_SEED_FILE", None),
];

/// [`CLEAR_DB_ENV`] followed by `overrides`; later entries win.
pub fn db_env<'a>(overrides: &[(&'a str, Option<&'a str>)]) -> Vec<(&'a str, Option<&'a str>)> {
    let mut changes: Vec<(&'a str, Option<&'a str>)> = CLEAR_DB_ENV.to_vec();
    changes.extend_from_slice(overrides);
    changes
}

pub fn opener(seq: i64, start: &str, voyage: &str, vessel: &str) -> RawRecord {
    RawRecord::new(seq)
        .with_times(start, PLACEHOLDER)
        .with_vessel(voyage, vessel)
}

pub fn closer(seq: i64, end: &str, voyage: &str, vessel: &str) -> RawRecord {
    RawRecord::new(seq)
        .with_times(PLACEHOLDER, end)
        .with_vessel(voyage, vessel)
}

/// A short berth day: two paired jobs, one single-row job, one orphan
/// closer and one opener that never closes.
pub fn sample_feed() -> Vec<RawRecord> {
    let mut closing = closer(3, "2024-06-01 10:15:00", "2406A", "Hua Shun");
    closing.product = Some("Fuel Oil 180".to_string());
    closing.cumulative_mass = Some(1520.5);

    vec![
        opener(1, "2024-06-01 08:00:00", "2406A", "Hua Shun"),
        opener(2, "2024-06-01 08:30:00", "2406B", "Jin Hai"),
        closing,
        RawRecord::new(4)
            .with_times("2024-06-01 11:00:00", "2024-06-01 11:20:05")
            .with_vessel("2406C", "Yong Tai"),
        closer(5, "2024-06-01 12:00:00", "2406Z", "Ghost"),
        closer(6, "2024-06-01 12:30:00", "2406B", "Jin Hai"),
        opener(7, "2024-06-01 13:00:00", "2406A", "Hua Shun"),
    ]
}
