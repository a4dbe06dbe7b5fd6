use std::str::FromStr;

use crate::rfm::composite::Score;

/// Scoring policy identifier, emitted with every scoring result so policy
/// changes show up in output diffs.
pub const SCORING_POLICY_VERSION: &str = "rfm/v1";

pub const QUINTILES: usize = 5;

/// What to do with a record that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRecordMode {
    #[default]
    FailFast,
    /// Drop the record, count it, and keep its issue in the run report.
    Skip,
}

impl InvalidRecordMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::Skip => "skip",
        }
    }
}

/// Score assigned when every customer shares one metric value (N = 1 included).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SingleGroupPolicy {
    #[default]
    Best,
    Middle,
    Error,
}

impl SingleGroupPolicy {
    pub const fn score(self) -> Option<Score> {
        match self {
            Self::Best => Some(Score::MAX),
            Self::Middle => Some(Score::MIDDLE),
            Self::Error => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Best => "5",
            Self::Middle => "3",
            Self::Error => "error",
        }
    }
}

impl FromStr for SingleGroupPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "5" | "best" => Ok(Self::Best),
            "3" | "middle" => Ok(Self::Middle),
            "error" => Ok(Self::Error),
            _ => Err("single-group policy must be one of: 5, 3, error".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TiePolicy {
    /// Every member of a tie takes the rank of its best-placed member, so equal
    /// metric values always share a score.
    #[default]
    Shared,
    /// Strict ordinal bucketing. A tie straddling a quintile boundary is split
    /// by ascending customer id.
    ByCustomerId,
}

impl TiePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::ByCustomerId => "by_customer_id",
        }
    }
}

impl FromStr for TiePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "shared" => Ok(Self::Shared),
            "by_customer_id" | "by-customer-id" => Ok(Self::ByCustomerId),
            _ => Err("tie policy must be one of: shared, by_customer_id".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub allow_negative_amounts: bool,
    pub invalid_records: InvalidRecordMode,
    pub single_group: SingleGroupPolicy,
    pub ties: TiePolicy,
    /// Customer count at which the three dimension passes run on scoped threads.
    pub parallel_threshold: usize,
}

impl ScoringPolicy {
    pub const fn should_parallelize(self, customers: usize) -> bool {
        customers >= self.parallel_threshold
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        SCORING_POLICY_V1
    }
}

pub const SCORING_POLICY_V1: ScoringPolicy = ScoringPolicy {
    allow_negative_amounts: false,
    invalid_records: InvalidRecordMode::FailFast,
    single_group: SingleGroupPolicy::Best,
    ties: TiePolicy::Shared,
    parallel_threshold: 50_000,
};
