use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::contracts::types::RecordIssue;
use crate::rfm::policy::{InvalidRecordMode, ScoringPolicy};
use crate::rfm::types::{CustomerAggregate, TransactionRecord};
use crate::{EngineError, EngineResult};

/// Counters describing how the input snapshot was consumed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationReport {
    pub records_read: usize,
    pub records_used: usize,
    pub missing_customer: usize,
    pub invalid_skipped: usize,
    pub issues: Vec<RecordIssue>,
}

impl AggregationReport {
    /// Folds in records an input provider already dropped before aggregation.
    pub fn include_skipped(&mut self, skipped: Vec<RecordIssue>) {
        self.records_read += skipped.len();
        self.invalid_skipped += skipped.len();
        self.issues.extend(skipped);
        self.issues.sort_by_key(|issue| issue.row);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// One entry per distinct customer, ascending by customer id.
    pub customers: Vec<CustomerAggregate>,
    pub report: AggregationReport,
}

#[derive(Debug)]
struct Accumulator<'a> {
    last_purchase_date: NaiveDate,
    order_ids: HashSet<&'a str>,
    unkeyed_orders: u64,
    total_spend: f64,
}

pub fn aggregate(
    records: &[TransactionRecord],
    as_of: NaiveDate,
    policy: &ScoringPolicy,
) -> EngineResult<Aggregation> {
    let mut report = AggregationReport {
        records_read: records.len(),
        ..AggregationReport::default()
    };
    let mut by_customer: BTreeMap<&str, Accumulator<'_>> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let row = record.source_row.unwrap_or(index as u64 + 1);

        let Some(customer_id) = record
            .customer_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        else {
            report.missing_customer += 1;
            continue;
        };

        let order_date = match check_record(row, record, policy) {
            Ok(date) => date,
            Err(issue) => match policy.invalid_records {
                InvalidRecordMode::FailFast => return Err(EngineError::invalid_record(&issue)),
                InvalidRecordMode::Skip => {
                    report.invalid_skipped += 1;
                    report.issues.push(issue);
                    continue;
                }
            },
        };

        let entry = by_customer
            .entry(customer_id)
            .or_insert_with(|| Accumulator {
                last_purchase_date: order_date,
                order_ids: HashSet::new(),
                unkeyed_orders: 0,
                total_spend: 0.0,
            });
        entry.last_purchase_date = entry.last_purchase_date.max(order_date);
        entry.total_spend += record.amount;
        match record
            .order_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            Some(order_id) => {
                entry.order_ids.insert(order_id);
            }
            None => entry.unkeyed_orders += 1,
        }
        report.records_used += 1;
    }

    if report.missing_customer > 0 {
        tracing::warn!(
            excluded = report.missing_customer,
            "excluded records without a customer id"
        );
    }
    if report.invalid_skipped > 0 {
        tracing::warn!(skipped = report.invalid_skipped, "skipped invalid records");
    }

    let customers = by_customer
        .into_iter()
        .map(|(customer_id, accumulator)| CustomerAggregate {
            customer_id: customer_id.to_string(),
            last_purchase_date: accumulator.last_purchase_date,
            purchase_count: accumulator.order_ids.len() as u64 + accumulator.unkeyed_orders,
            total_spend: accumulator.total_spend,
            recency_days: (as_of - accumulator.last_purchase_date).num_days(),
        })
        .collect::<Vec<CustomerAggregate>>();

    tracing::debug!(
        records = report.records_read,
        used = report.records_used,
        customers = customers.len(),
        "aggregated transactions"
    );

    Ok(Aggregation { customers, report })
}

fn check_record(
    row: u64,
    record: &TransactionRecord,
    policy: &ScoringPolicy,
) -> Result<NaiveDate, RecordIssue> {
    let Some(order_date) = record.order_date else {
        return Err(RecordIssue {
            row,
            field: "order_date".to_string(),
            code: "missing_order_date".to_string(),
            description: "order_date must be present.".to_string(),
            received: None,
        });
    };

    if !record.amount.is_finite() {
        return Err(RecordIssue {
            row,
            field: "amount".to_string(),
            code: "invalid_number".to_string(),
            description: format!("amount must be a finite number; got {}", record.amount),
            received: Some(record.amount.to_string()),
        });
    }

    if record.amount < 0.0 && !policy.allow_negative_amounts {
        return Err(RecordIssue {
            row,
            field: "amount".to_string(),
            code: "negative_amount".to_string(),
            description: format!(
                "amount must not be negative unless negative amounts are allowed; got {}",
                record.amount
            ),
            received: Some(record.amount.to_string()),
        });
    }

    Ok(order_date)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::aggregate;
    use crate::rfm::policy::{InvalidRecordMode, SCORING_POLICY_V1, ScoringPolicy};
    use crate::rfm::types::TransactionRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn line(customer: &str, order: &str, day: u32, amount: f64) -> TransactionRecord {
        TransactionRecord::new(customer, order, date(2026, 3, day), amount)
    }

    #[test]
    fn line_items_of_one_order_count_as_one_purchase() {
        let records = vec![
            line("c1", "o1", 1, 10.0),
            line("c1", "o1", 1, 5.5),
            line("c1", "o2", 9, 4.5),
            line("c2", "o3", 3, 100.0),
        ];
        let result = aggregate(&records, date(2026, 3, 10), &SCORING_POLICY_V1);
        assert!(result.is_ok());
        if let Ok(aggregation) = result {
            assert_eq!(aggregation.customers.len(), 2);
            let first = &aggregation.customers[0];
            assert_eq!(first.customer_id, "c1");
            assert_eq!(first.purchase_count, 2);
            assert!((first.total_spend - 20.0).abs() < 1e-9);
            assert_eq!(first.last_purchase_date, date(2026, 3, 9));
            assert_eq!(first.recency_days, 1);
            assert_eq!(aggregation.customers[1].recency_days, 7);
            assert_eq!(aggregation.report.records_used, 4);
        }
    }

    #[test]
    fn records_without_order_id_each_count_as_an_order() {
        let mut a = line("c1", "", 1, 1.0);
        a.order_id = None;
        let mut b = line("c1", "", 2, 1.0);
        b.order_id = Some("  ".to_string());
        let result = aggregate(&[a, b], date(2026, 3, 10), &SCORING_POLICY_V1);
        assert!(result.is_ok());
        if let Ok(aggregation) = result {
            assert_eq!(aggregation.customers[0].purchase_count, 2);
        }
    }

    #[test]
    fn missing_customer_ids_are_excluded_and_counted() {
        let mut orphan = line("", "o9", 2, 3.0);
        orphan.customer_id = None;
        let blank = line("   ", "o8", 2, 3.0);
        let records = vec![orphan, blank, line("c1", "o1", 1, 2.0)];
        let result = aggregate(&records, date(2026, 3, 10), &SCORING_POLICY_V1);
        assert!(result.is_ok());
        if let Ok(aggregation) = result {
            assert_eq!(aggregation.customers.len(), 1);
            assert_eq!(aggregation.report.missing_customer, 2);
            assert_eq!(aggregation.report.records_read, 3);
            assert_eq!(aggregation.report.records_used, 1);
        }
    }

    #[test]
    fn negative_amounts_fail_fast_by_default() {
        let records = vec![line("c1", "o1", 1, 2.0), line("c1", "r1", 2, -2.0)];
        let result = aggregate(&records, date(2026, 3, 10), &SCORING_POLICY_V1);
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_record");
            assert!(error.message.starts_with("Row 2:"));
        }
    }

    #[test]
    fn negative_amounts_are_netted_when_allowed() {
        let policy = ScoringPolicy {
            allow_negative_amounts: true,
            ..SCORING_POLICY_V1
        };
        let records = vec![line("c1", "o1", 1, 10.0), line("c1", "r1", 2, -4.0)];
        let result = aggregate(&records, date(2026, 3, 10), &policy);
        assert!(result.is_ok());
        if let Ok(aggregation) = result {
            assert!((aggregation.customers[0].total_spend - 6.0).abs() < 1e-9);
            assert_eq!(aggregation.customers[0].purchase_count, 2);
        }
    }

    #[test]
    fn skip_mode_drops_invalid_records_with_issues() {
        let policy = ScoringPolicy {
            invalid_records: InvalidRecordMode::Skip,
            ..SCORING_POLICY_V1
        };
        let mut undated = line("c2", "o5", 1, 1.0);
        undated.order_date = None;
        let records = vec![
            line("c1", "o1", 1, 10.0),
            undated.with_source_row(12),
            line("c1", "o2", 2, f64::NAN),
        ];
        let result = aggregate(&records, date(2026, 3, 10), &policy);
        assert!(result.is_ok());
        if let Ok(aggregation) = result {
            assert_eq!(aggregation.customers.len(), 1);
            assert_eq!(aggregation.report.invalid_skipped, 2);
            assert_eq!(aggregation.report.issues[0].row, 12);
            assert_eq!(aggregation.report.issues[0].code, "missing_order_date");
            assert_eq!(aggregation.report.issues[1].row, 3);
            assert_eq!(aggregation.report.issues[1].code, "invalid_number");
        }
    }

    #[test]
    fn empty_input_is_an_empty_aggregation() {
        let result = aggregate(&[], date(2026, 3, 10), &SCORING_POLICY_V1);
        assert!(result.is_ok());
        if let Ok(aggregation) = result {
            assert!(aggregation.customers.is_empty());
            assert_eq!(aggregation.report.records_read, 0);
        }
    }
}
