use std::cmp::Ordering;

use crate::rfm::composite::Score;
use crate::rfm::policy::{QUINTILES, ScoringPolicy, TiePolicy};
use crate::rfm::types::CustomerAggregate;
use crate::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Recency,
    Frequency,
    Monetary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDirection {
    /// Smaller values rank first.
    Ascending,
    /// Larger values rank first.
    Descending,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Self::Recency, Self::Frequency, Self::Monetary];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recency => "recency",
            Self::Frequency => "frequency",
            Self::Monetary => "monetary",
        }
    }

    pub const fn direction(self) -> RankDirection {
        match self {
            Self::Recency => RankDirection::Ascending,
            Self::Frequency | Self::Monetary => RankDirection::Descending,
        }
    }

    pub fn metric(self, customer: &CustomerAggregate) -> f64 {
        let value = match self {
            Self::Recency => customer.recency_days as f64,
            Self::Frequency => customer.purchase_count as f64,
            Self::Monetary => customer.total_spend,
        };
        // Folds -0.0 into 0.0 so total_cmp treats them as one tie.
        value + 0.0
    }

    fn compare_best_first(self, left: f64, right: f64) -> Ordering {
        match self.direction() {
            RankDirection::Ascending => left.total_cmp(&right),
            RankDirection::Descending => right.total_cmp(&left),
        }
    }
}

/// Scores one dimension for every customer. The returned scores line up with
/// `customers` by index.
///
/// Customers are sorted best-first (ties ordered by customer id) and the
/// customer at rank position `p` lands in quintile `floor(p * 5 / n)`, which
/// maps to score `5 - quintile`.
pub fn score_dimension(
    customers: &[CustomerAggregate],
    dimension: Dimension,
    policy: &ScoringPolicy,
) -> EngineResult<Vec<Score>> {
    let total = customers.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let metrics = customers
        .iter()
        .map(|customer| dimension.metric(customer))
        .collect::<Vec<f64>>();

    let mut order = (0..total).collect::<Vec<usize>>();
    order.sort_by(|&left, &right| {
        dimension
            .compare_best_first(metrics[left], metrics[right])
            .then_with(|| customers[left].customer_id.cmp(&customers[right].customer_id))
    });

    let best = metrics[order[0]];
    let worst = metrics[order[total - 1]];
    if best.total_cmp(&worst).is_eq() {
        return match policy.single_group.score() {
            Some(score) => Ok(vec![score; total]),
            None => Err(EngineError::insufficient_customers(
                dimension.as_str(),
                total,
            )),
        };
    }

    let mut scores = vec![Score::MIN; total];
    let mut tie_start = 0usize;
    for (position, &index) in order.iter().enumerate() {
        if position > 0 && metrics[order[position - 1]].total_cmp(&metrics[index]).is_ne() {
            tie_start = position;
        }
        let rank_position = match policy.ties {
            TiePolicy::Shared => tie_start,
            TiePolicy::ByCustomerId => position,
        };
        scores[index] = score_for_position(rank_position, total);
    }

    Ok(scores)
}

fn score_for_position(position: usize, total: usize) -> Score {
    let quintile = (position * QUINTILES / total).min(QUINTILES - 1);
    Score::new((QUINTILES - quintile) as u8).unwrap_or(Score::MIN)
}
