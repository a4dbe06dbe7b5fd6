use std::path::Path;

use crate::EngineResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    ScoreData, ScorePolicySettings, ScoreRow, ScoreSummary, SegmentCount,
};
use crate::date::{format_iso_date, parse_reference_date};
use crate::ingest::load_records;
use crate::rfm::policy::{
    InvalidRecordMode, SCORING_POLICY_V1, SCORING_POLICY_VERSION, ScoringPolicy,
    SingleGroupPolicy, TiePolicy,
};
use crate::rfm::scorer::score_customers;
use crate::rfm::segment::{SegmentClassifier, UNCLASSIFIED_LABEL};
use crate::rfm::types::ScoredCustomer;
use crate::segments::SegmentConfig;

#[derive(Debug, Default)]
pub struct ScoreRunOptions {
    pub path: Option<String>,
    pub as_of: String,
    pub segments_path: Option<String>,
    pub allow_negative_amounts: bool,
    pub skip_invalid: bool,
    pub single_group: Option<SingleGroupPolicy>,
    pub ties: Option<TiePolicy>,
    pub limit: Option<usize>,
    pub stdin_override: Option<String>,
}

pub fn run_with_options(options: ScoreRunOptions) -> EngineResult<SuccessEnvelope> {
    let as_of = parse_reference_date(&options.as_of, "score")?;
    let classifier = match options.segments_path.as_deref() {
        Some(path) => Some(SegmentConfig::load(Path::new(path))?.build_classifier()?),
        None => None,
    };
    let policy = build_policy(&options);

    let ingested = load_records(options.path, options.stdin_override, policy.invalid_records)?;
    let mut run = score_customers(&ingested.records, as_of, &policy, classifier.as_ref())?;
    run.report.include_skipped(ingested.skipped);

    let segments = classifier
        .as_ref()
        .map(|rules| segment_counts(rules, &run.customers));
    let rows = run
        .customers
        .iter()
        .take(options.limit.unwrap_or(usize::MAX))
        .map(score_row)
        .collect::<Vec<ScoreRow>>();

    tracing::debug!(
        customers = run.customers.len(),
        rows = rows.len(),
        "score command finished"
    );

    let summary = ScoreSummary {
        records_read: run.report.records_read,
        records_used: run.report.records_used,
        missing_customer: run.report.missing_customer,
        invalid_skipped: run.report.invalid_skipped,
        customers: run.customers.len(),
        rows_returned: rows.len(),
    };

    success(
        "score",
        ScoreData {
            policy_version: SCORING_POLICY_VERSION.to_string(),
            policy: policy_settings(&policy),
            as_of: format_iso_date(&as_of),
            source_used: ingested.source.map(|source| source.as_str().to_string()),
            source_path: ingested.source_ref,
            summary,
            rows,
            segments,
            issues: run.report.issues,
        },
    )
}

fn build_policy(options: &ScoreRunOptions) -> ScoringPolicy {
    ScoringPolicy {
        allow_negative_amounts: options.allow_negative_amounts,
        invalid_records: if options.skip_invalid {
            InvalidRecordMode::Skip
        } else {
            InvalidRecordMode::FailFast
        },
        single_group: options.single_group.unwrap_or(SCORING_POLICY_V1.single_group),
        ties: options.ties.unwrap_or(SCORING_POLICY_V1.ties),
        ..SCORING_POLICY_V1
    }
}

fn policy_settings(policy: &ScoringPolicy) -> ScorePolicySettings {
    ScorePolicySettings {
        allow_negative_amounts: policy.allow_negative_amounts,
        invalid_records: policy.invalid_records.as_str().to_string(),
        single_group: policy.single_group.as_str().to_string(),
        ties: policy.ties.as_str().to_string(),
    }
}

fn score_row(customer: &ScoredCustomer) -> ScoreRow {
    let aggregate = &customer.aggregate;
    ScoreRow {
        customer_id: aggregate.customer_id.clone(),
        last_purchase_date: format_iso_date(&aggregate.last_purchase_date),
        recency_days: aggregate.recency_days,
        purchase_count: aggregate.purchase_count,
        total_spend: aggregate.total_spend,
        recency_score: customer.score.recency.get(),
        frequency_score: customer.score.frequency.get(),
        monetary_score: customer.score.monetary.get(),
        composite: customer.score.composite().to_string(),
        segment: customer.segment.clone(),
    }
}

/// Counts per label in rule order, with `Unclassified` last. Every label is
/// listed even when no customer landed in it.
fn segment_counts(
    classifier: &SegmentClassifier,
    customers: &[ScoredCustomer],
) -> Vec<SegmentCount> {
    let mut counts = classifier
        .labels()
        .into_iter()
        .chain(std::iter::once(UNCLASSIFIED_LABEL))
        .map(|label| SegmentCount {
            label: label.to_string(),
            customers: 0,
        })
        .collect::<Vec<SegmentCount>>();

    for customer in customers {
        let Some(label) = customer.segment.as_deref() else {
            continue;
        };
        if let Some(count) = counts.iter_mut().find(|count| count.label == label) {
            count.customers += 1;
        }
    }
    counts
}
