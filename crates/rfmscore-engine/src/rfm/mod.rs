//! Pure RFM scoring: aggregation, quintile scoring, composite codes and
//! segment classification. Nothing here performs I/O or reads a clock.

pub mod aggregate;
pub mod composite;
pub mod policy;
pub mod quantile;
pub mod scorer;
pub mod segment;
pub mod types;

pub use aggregate::{Aggregation, AggregationReport, aggregate};
pub use composite::{CompositeParseError, CompositeScore, Score};
pub use policy::{
    InvalidRecordMode, SCORING_POLICY_V1, SCORING_POLICY_VERSION, ScoringPolicy,
    SingleGroupPolicy, TiePolicy,
};
pub use quantile::{Dimension, RankDirection, score_dimension};
pub use scorer::{ScoringRun, score_aggregates, score_customers};
pub use segment::{SegmentClassifier, SegmentPattern, SegmentRule, UNCLASSIFIED_LABEL};
pub use types::{CustomerAggregate, RfmScore, ScoredCustomer, TransactionRecord};
