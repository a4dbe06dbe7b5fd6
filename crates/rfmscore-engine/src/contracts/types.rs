use serde::Serialize;

use crate::segments::SegmentConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordIssue {
    pub row: u64,
    pub field: String,
    pub code: String,
    pub description: String,
    pub received: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreData {
    pub policy_version: String,
    pub policy: ScorePolicySettings,
    pub as_of: String,
    pub source_used: Option<String>,
    pub source_path: Option<String>,
    pub summary: ScoreSummary,
    pub rows: Vec<ScoreRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<SegmentCount>>,
    pub issues: Vec<RecordIssue>,
}

/// The configurable choices that produced a run's scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorePolicySettings {
    pub allow_negative_amounts: bool,
    pub invalid_records: String,
    pub single_group: String,
    pub ties: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub records_read: usize,
    pub records_used: usize,
    pub missing_customer: usize,
    pub invalid_skipped: usize,
    pub customers: usize,
    pub rows_returned: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRow {
    pub customer_id: String,
    pub last_purchase_date: String,
    pub recency_days: i64,
    pub purchase_count: u64,
    pub total_spend: f64,
    pub recency_score: u8,
    pub frequency_score: u8,
    pub monetary_score: u8,
    pub composite: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentCount {
    pub label: String,
    pub customers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentCheckData {
    pub path: String,
    pub rules: usize,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentExampleData {
    pub config: SegmentConfig,
}
