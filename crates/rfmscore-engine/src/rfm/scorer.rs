use std::thread;

use chrono::NaiveDate;

use crate::EngineResult;
use crate::rfm::aggregate::{AggregationReport, aggregate};
use crate::rfm::composite::Score;
use crate::rfm::policy::ScoringPolicy;
use crate::rfm::quantile::{Dimension, score_dimension};
use crate::rfm::segment::SegmentClassifier;
use crate::rfm::types::{CustomerAggregate, RfmScore, ScoredCustomer, TransactionRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRun {
    /// Ascending by customer id.
    pub customers: Vec<ScoredCustomer>,
    pub report: AggregationReport,
}

/// Aggregates `records`, scores every customer against `as_of`, and labels
/// each customer when a classifier is supplied.
///
/// Zero customers after filtering is not an error; the run is simply empty.
pub fn score_customers(
    records: &[TransactionRecord],
    as_of: NaiveDate,
    policy: &ScoringPolicy,
    classifier: Option<&SegmentClassifier>,
) -> EngineResult<ScoringRun> {
    let aggregation = aggregate(records, as_of, policy)?;
    if aggregation.customers.is_empty() {
        tracing::warn!(
            records = aggregation.report.records_read,
            "no customers left to score"
        );
    }

    let scores = score_aggregates(&aggregation.customers, policy)?;
    let customers = aggregation
        .customers
        .into_iter()
        .zip(scores)
        .map(|(aggregate, score)| {
            let segment =
                classifier.map(|rules| rules.classify(score.composite()).to_string());
            ScoredCustomer {
                aggregate,
                score,
                segment,
            }
        })
        .collect::<Vec<ScoredCustomer>>();

    Ok(ScoringRun {
        customers,
        report: aggregation.report,
    })
}

/// Scores the three dimensions independently and zips them per customer.
pub fn score_aggregates(
    customers: &[CustomerAggregate],
    policy: &ScoringPolicy,
) -> EngineResult<Vec<RfmScore>> {
    let (recency, frequency, monetary) = if policy.should_parallelize(customers.len()) {
        tracing::debug!(customers = customers.len(), "scoring dimensions in parallel");
        thread::scope(|scope| {
            let recency = scope.spawn(|| score_dimension(customers, Dimension::Recency, policy));
            let frequency =
                scope.spawn(|| score_dimension(customers, Dimension::Frequency, policy));
            let monetary = score_dimension(customers, Dimension::Monetary, policy);
            (join_pass(recency), join_pass(frequency), monetary)
        })
    } else {
        (
            score_dimension(customers, Dimension::Recency, policy),
            score_dimension(customers, Dimension::Frequency, policy),
            score_dimension(customers, Dimension::Monetary, policy),
        )
    };

    let scores = recency?
        .into_iter()
        .zip(frequency?)
        .zip(monetary?)
        .map(|((recency, frequency), monetary)| RfmScore::new(recency, frequency, monetary))
        .collect::<Vec<RfmScore>>();
    Ok(scores)
}

fn join_pass(
    handle: thread::ScopedJoinHandle<'_, EngineResult<Vec<Score>>>,
) -> EngineResult<Vec<Score>> {
    match handle.join() {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{score_aggregates, score_customers};
    use crate::rfm::policy::{SCORING_POLICY_V1, ScoringPolicy};
    use crate::rfm::segment::{SegmentClassifier, SegmentRule};
    use crate::rfm::types::{CustomerAggregate, TransactionRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn population() -> Vec<CustomerAggregate> {
        (0..23)
            .map(|index| CustomerAggregate {
                customer_id: format!("cust-{index:03}"),
                last_purchase_date: date(2026, 1, 1),
                purchase_count: (index % 7) as u64 + 1,
                total_spend: ((index * 37) % 101) as f64 * 1.25,
                recency_days: (index * 13) % 40,
            })
            .collect()
    }

    #[test]
    fn parallel_and_sequential_passes_agree() {
        let customers = population();
        let sequential = score_aggregates(&customers, &SCORING_POLICY_V1);
        let parallel = score_aggregates(
            &customers,
            &ScoringPolicy {
                parallel_threshold: 1,
                ..SCORING_POLICY_V1
            },
        );
        assert!(sequential.is_ok());
        assert_eq!(sequential.ok(), parallel.ok());
    }

    #[test]
    fn single_customer_scores_555() {
        let records = vec![
            TransactionRecord::new("solo", "o1", date(2026, 2, 1), 12.0),
            TransactionRecord::new("solo", "o2", date(2026, 2, 20), 8.0),
        ];
        let run = score_customers(&records, date(2026, 3, 1), &SCORING_POLICY_V1, None);
        assert!(run.is_ok());
        if let Ok(run) = run {
            assert_eq!(run.customers.len(), 1);
            assert_eq!(run.customers[0].score.composite().to_string(), "555");
            assert_eq!(run.customers[0].segment, None);
        }
    }

    #[test]
    fn classifier_labels_each_customer() {
        let rules = vec![
            SegmentRule::new("Recent", &["5**"]),
            SegmentRule::new("Lapsed", &["1**", "2**"]),
        ]
        .into_iter()
        .collect::<Result<Vec<_>, _>>();
        assert!(rules.is_ok());
        let classifier = SegmentClassifier::new(rules.unwrap_or_default());
        let records = vec![
            TransactionRecord::new("a", "o1", date(2026, 2, 28), 10.0),
            TransactionRecord::new("b", "o2", date(2026, 2, 1), 10.0),
            TransactionRecord::new("c", "o3", date(2025, 12, 1), 15.0),
        ];
        let run = score_customers(&records, date(2026, 3, 1), &SCORING_POLICY_V1, Some(&classifier));
        assert!(run.is_ok());
        if let Ok(run) = run {
            let labels = run
                .customers
                .iter()
                .map(|customer| customer.segment.clone().unwrap_or_default())
                .collect::<Vec<String>>();
            assert_eq!(labels, vec!["Recent", "Unclassified", "Lapsed"]);
        }
    }

    #[test]
    fn empty_input_yields_empty_run() {
        let run = score_customers(&[], date(2026, 3, 1), &SCORING_POLICY_V1, None);
        assert!(run.is_ok());
        if let Ok(run) = run {
            assert!(run.customers.is_empty());
        }
    }
}
