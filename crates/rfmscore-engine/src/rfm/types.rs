use chrono::NaiveDate;

use crate::rfm::composite::{CompositeScore, Score};

/// One purchase event, or one line item of a multi-line order.
///
/// Fields are optional where upstream data is known to have gaps; the
/// aggregator decides whether a gap excludes the record or fails the run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub customer_id: Option<String>,
    /// Line items sharing an order id count as one purchase. `None` makes the
    /// record its own order.
    pub order_id: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub amount: f64,
    /// 1-based position in the originating source, when known.
    pub source_row: Option<u64>,
}

impl TransactionRecord {
    pub fn new(customer_id: &str, order_id: &str, order_date: NaiveDate, amount: f64) -> Self {
        Self {
            customer_id: Some(customer_id.to_string()),
            order_id: Some(order_id.to_string()),
            order_date: Some(order_date),
            amount,
            source_row: None,
        }
    }

    pub fn with_source_row(mut self, row: u64) -> Self {
        self.source_row = Some(row);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerAggregate {
    pub customer_id: String,
    pub last_purchase_date: NaiveDate,
    pub purchase_count: u64,
    pub total_spend: f64,
    /// Days from `last_purchase_date` to the reference date. Negative when the
    /// customer purchased after the reference date.
    pub recency_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfmScore {
    pub recency: Score,
    pub frequency: Score,
    pub monetary: Score,
}

impl RfmScore {
    pub const fn new(recency: Score, frequency: Score, monetary: Score) -> Self {
        Self {
            recency,
            frequency,
            monetary,
        }
    }

    pub const fn composite(self) -> CompositeScore {
        CompositeScore::new(self.recency, self.frequency, self.monetary)
    }
}

impl From<CompositeScore> for RfmScore {
    fn from(composite: CompositeScore) -> Self {
        Self::new(composite.recency, composite.frequency, composite.monetary)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCustomer {
    pub aggregate: CustomerAggregate,
    pub score: RfmScore,
    pub segment: Option<String>,
}
