//! Feed rows and the job records reconciled from them.
//!
//! Serialized field names mirror the columns of `dbo.realflow5m` so that
//! clients see the same keys whether they ask for raw rows or reconciled jobs.

use serde::{Deserialize, Serialize};

use super::duration::JobDuration;

/// Filler the feed writes into a time column that has no value yet.
pub const PLACEHOLDER: &str = "----------";

/// Whether a time column holds no real value (NULL, blank or the dash filler).
pub fn is_placeholder(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None => true,
        Some(v) => v.is_empty() || v == PLACEHOLDER,
    }
}

/// How a raw row participates in reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Real start, placeholder end.
    Opener,
    /// Placeholder start, real end.
    Closer,
    /// Both timestamps real.
    SelfContained,
    /// Neither timestamp real.
    Anomalous,
}

/// One row of the source feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "序号")]
    pub sequence: i64,
    #[serde(rename = "开始时间", default)]
    pub start_time: Option<String>,
    #[serde(rename = "结束时间", default)]
    pub end_time: Option<String>,
    #[serde(rename = "存盘时间", default)]
    pub save_time: Option<String>,
    #[serde(rename = "航次", default)]
    pub voyage: Option<String>,
    #[serde(rename = "船名", default)]
    pub vessel: Option<String>,
    #[serde(rename = "呼号", default)]
    pub call_sign: Option<String>,
    #[serde(rename = "油品名", default)]
    pub product: Option<String>,
    #[serde(rename = "温度", default)]
    pub temperature: Option<f64>,
    #[serde(rename = "密度", default)]
    pub density: Option<f64>,
    #[serde(rename = "瞬时流量", default)]
    pub instant_flow: Option<f64>,
    #[serde(rename = "瞬时质量", default)]
    pub instant_mass: Option<f64>,
    #[serde(rename = "累计流量", default)]
    pub cumulative_flow: Option<f64>,
    #[serde(rename = "累计质量", default)]
    pub cumulative_mass: Option<f64>,
}

impl RawRecord {
    /// Create an empty record with the given sequence number.
    pub fn new(sequence: i64) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }

    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    pub fn with_vessel(mut self, voyage: impl Into<String>, vessel: impl Into<String>) -> Self {
        self.voyage = Some(voyage.into());
        self.vessel = Some(vessel.into());
        self
    }

    pub fn with_save_time(mut self, save_time: impl Into<String>) -> Self {
        self.save_time = Some(save_time.into());
        self
    }

    /// Start time when it carries a real value.
    pub fn real_start(&self) -> Option<&str> {
        self.start_time
            .as_deref()
            .filter(|v| !is_placeholder(Some(*v)))
    }

    /// End time when it carries a real value.
    pub fn real_end(&self) -> Option<&str> {
        self.end_time.as_deref().filter(|v| !is_placeholder(Some(*v)))
    }

    /// Classify the row by which of its time columns are real.
    pub fn kind(&self) -> RecordKind {
        match (self.real_start(), self.real_end()) {
            (Some(_), None) => RecordKind::Opener,
            (None, Some(_)) => RecordKind::Closer,
            (Some(_), Some(_)) => RecordKind::SelfContained,
            (None, None) => RecordKind::Anomalous,
        }
    }
}

/// Lifecycle tag of a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Opener still waiting for its closer.
    Started,
    /// Opener paired with a later closer.
    Completed,
    /// Single row carrying both timestamps.
    Complete,
    /// Opener that never closed.
    Incomplete,
}

/// One resolved work interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "序号")]
    pub sequence: i64,
    #[serde(rename = "开始时间")]
    pub start_time: Option<String>,
    #[serde(rename = "结束时间")]
    pub end_time: Option<String>,
    #[serde(rename = "存盘时间")]
    pub save_time: Option<String>,
    #[serde(rename = "航次")]
    pub voyage: Option<String>,
    #[serde(rename = "船名")]
    pub vessel: Option<String>,
    #[serde(rename = "呼号")]
    pub call_sign: Option<String>,
    #[serde(rename = "油品名")]
    pub product: Option<String>,
    #[serde(rename = "温度")]
    pub temperature: Option<f64>,
    #[serde(rename = "密度")]
    pub density: Option<f64>,
    #[serde(rename = "瞬时流量")]
    pub instant_flow: Option<f64>,
    #[serde(rename = "瞬时质量")]
    pub instant_mass: Option<f64>,
    #[serde(rename = "累计流量")]
    pub cumulative_flow: Option<f64>,
    #[serde(rename = "累计质量")]
    pub cumulative_mass: Option<f64>,
    pub status: JobStatus,
    pub duration: Option<JobDuration>,
}

impl JobRecord {
    /// Pair an opener with its closer. Identity comes from the opener, the
    /// end time, save time and every measurement from the closer.
    pub fn paired(opener: &RawRecord, closer: &RawRecord, duration: JobDuration) -> Self {
        Self {
            sequence: opener.sequence,
            start_time: opener.start_time.clone(),
            end_time: closer.end_time.clone(),
            save_time: closer.save_time.clone(),
            voyage: closer.voyage.clone(),
            vessel: closer.vessel.clone(),
            call_sign: closer.call_sign.clone(),
            product: closer.product.clone(),
            temperature: closer.temperature,
            density: closer.density,
            instant_flow: closer.instant_flow,
            instant_mass: closer.instant_mass,
            cumulative_flow: closer.cumulative_flow,
            cumulative_mass: closer.cumulative_mass,
            status: JobStatus::Completed,
            duration: Some(duration),
        }
    }

    /// A row that already carries both timestamps.
    pub fn self_contained(record: &RawRecord, duration: JobDuration) -> Self {
        Self {
            status: JobStatus::Complete,
            duration: Some(duration),
            ..Self::from_record(record)
        }
    }

    /// An opener left over at the end of a pass.
    pub fn incomplete(opener: &RawRecord) -> Self {
        Self {
            end_time: None,
            status: JobStatus::Incomplete,
            duration: None,
            ..Self::from_record(opener)
        }
    }

    fn from_record(record: &RawRecord) -> Self {
        Self {
            sequence: record.sequence,
            start_time: record.start_time.clone(),
            end_time: record.end_time.clone(),
            save_time: record.save_time.clone(),
            voyage: record.voyage.clone(),
            vessel: record.vessel.clone(),
            call_sign: record.call_sign.clone(),
            product: record.product.clone(),
            temperature: record.temperature,
            density: record.density,
            instant_flow: record.instant_flow,
            instant_mass: record.instant_mass,
            cumulative_flow: record.cumulative_flow,
            cumulative_mass: record.cumulative_mass,
            status: JobStatus::Started,
            duration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_rules() {
        assert!(is_placeholder(None));
        assert!(is_placeholder(Some("")));
        assert!(is_placeholder(Some("   ")));
        assert!(is_placeholder(Some("----------")));
        assert!(is_placeholder(Some(" ---------- ")));
        assert!(!is_placeholder(Some("2024-01-01 00:00:00")));
        assert!(!is_placeholder(Some("---")));
    }

    #[test]
    fn test_record_kind() {
        let opener = RawRecord::new(1).with_times("2024-01-01 00:00:00", PLACEHOLDER);
        let closer = RawRecord::new(2).with_times(PLACEHOLDER, "2024-01-01 01:00:00");
        let both = RawRecord::new(3).with_times("2024-01-01 00:00:00", "2024-01-01 01:00:00");
        let neither = RawRecord::new(4);

        assert_eq!(opener.kind(), RecordKind::Opener);
        assert_eq!(closer.kind(), RecordKind::Closer);
        assert_eq!(both.kind(), RecordKind::SelfContained);
        assert_eq!(neither.kind(), RecordKind::Anomalous);
    }

    #[test]
    fn test_raw_record_uses_column_names() {
        let json = r#"{"序号": 7, "开始时间": "----------", "船名": "Haiyang", "温度": 21.5}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sequence, 7);
        assert_eq!(record.vessel.as_deref(), Some("Haiyang"));
        assert_eq!(record.temperature, Some(21.5));
        assert!(record.end_time.is_none());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["序号"], 7);
        assert!(value["结束时间"].is_null());
    }

    #[test]
    fn test_paired_takes_measurements_from_closer() {
        let mut opener = RawRecord::new(10)
            .with_times("2024-01-01 00:00:00", PLACEHOLDER)
            .with_vessel("V1", "Ship")
            .with_save_time("2024-01-01 00:00:05");
        opener.temperature = Some(10.0);
        let mut closer = RawRecord::new(11)
            .with_times(PLACEHOLDER, "2024-01-01 02:00:00")
            .with_vessel("V1", "Ship")
            .with_save_time("2024-01-01 02:00:05");
        closer.temperature = Some(12.0);
        closer.call_sign = Some("BXYZ".to_string());

        let duration = JobDuration::between("2024-01-01 00:00:00", "2024-01-01 02:00:00").unwrap();
        let job = JobRecord::paired(&opener, &closer, duration);

        assert_eq!(job.sequence, 10);
        assert_eq!(job.start_time.as_deref(), Some("2024-01-01 00:00:00"));
        assert_eq!(job.end_time.as_deref(), Some("2024-01-01 02:00:00"));
        assert_eq!(job.save_time.as_deref(), Some("2024-01-01 02:00:05"));
        assert_eq!(job.temperature, Some(12.0));
        assert_eq!(job.call_sign.as_deref(), Some("BXYZ"));
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[test]
    fn test_job_record_serializes_status_and_duration() {
        let opener = RawRecord::new(3).with_times("2024-01-01 00:00:00", PLACEHOLDER);
        let job = JobRecord::incomplete(&opener);
        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(value["status"], "incomplete");
        assert!(value["duration"].is_null());
        assert!(value["结束时间"].is_null());
        assert_eq!(value["开始时间"], "2024-01-01 00:00:00");
    }
}
