use std::fmt;

use serde_json::json;

use crate::rfm::composite::CompositeScore;
use crate::{EngineError, EngineResult};

pub const UNCLASSIFIED_LABEL: &str = "Unclassified";

/// Three positions in R-F-M order, each an exact score or a wildcard (`*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentPattern([Option<u8>; 3]);

impl SegmentPattern {
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let trimmed = raw.trim();
        let characters = trimmed.chars().collect::<Vec<char>>();
        if characters.len() != 3 {
            return Err(pattern_error(
                raw,
                &format!(
                    "Segment pattern `{trimmed}` must have exactly 3 positions, got {}.",
                    characters.len()
                ),
            ));
        }

        let mut positions = [None; 3];
        for (slot, character) in positions.iter_mut().zip(&characters) {
            *slot = match character {
                '*' => None,
                '1'..='5' => character.to_digit(10).map(|digit| digit as u8),
                _ => {
                    return Err(pattern_error(
                        raw,
                        &format!(
                            "Segment pattern `{trimmed}` has invalid character `{character}`; use 1-5 or `*`."
                        ),
                    ));
                }
            };
        }
        Ok(Self(positions))
    }

    pub fn matches(&self, composite: CompositeScore) -> bool {
        self.0
            .iter()
            .zip(composite.digits())
            .all(|(expected, actual)| expected.is_none_or(|digit| digit == actual))
    }
}

impl fmt::Display for SegmentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for position in self.0 {
            match position {
                Some(digit) => write!(f, "{digit}")?,
                None => write!(f, "*")?,
            }
        }
        Ok(())
    }
}

fn pattern_error(raw: &str, message: &str) -> EngineError {
    EngineError::configuration_error(message).with_data(json!({
        "pattern": raw,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRule {
    label: String,
    patterns: Vec<SegmentPattern>,
}

impl SegmentRule {
    pub fn new<S>(label: &str, patterns: &[S]) -> EngineResult<Self>
    where
        S: AsRef<str>,
    {
        let label = label.trim();
        if label.is_empty() {
            return Err(EngineError::configuration_error(
                "Segment label must be present and non-empty.",
            ));
        }
        if patterns.is_empty() {
            return Err(EngineError::configuration_error(&format!(
                "Segment `{label}` must list at least one pattern."
            ))
            .with_data(json!({ "label": label })));
        }

        let parsed = patterns
            .iter()
            .map(|pattern| SegmentPattern::parse(pattern.as_ref()))
            .collect::<EngineResult<Vec<SegmentPattern>>>()?;

        Ok(Self {
            label: label.to_string(),
            patterns: parsed,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, composite: CompositeScore) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(composite))
    }
}

/// Ordered segment rules. The first matching rule wins; a composite that
/// matches nothing is labelled [`UNCLASSIFIED_LABEL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentClassifier {
    rules: Vec<SegmentRule>,
}

impl SegmentClassifier {
    pub fn new(rules: Vec<SegmentRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SegmentRule] {
        &self.rules
    }

    pub fn classify(&self, composite: CompositeScore) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(composite))
            .map(SegmentRule::label)
            .unwrap_or(UNCLASSIFIED_LABEL)
    }

    /// Distinct labels in rule order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !labels.contains(&rule.label()) {
                labels.push(rule.label());
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::{SegmentClassifier, SegmentPattern, SegmentRule, UNCLASSIFIED_LABEL};
    use crate::rfm::composite::CompositeScore;

    fn composite(raw: &str) -> Option<CompositeScore> {
        raw.parse::<CompositeScore>().ok()
    }

    #[test]
    fn wildcards_match_any_score_in_their_position() {
        let pattern = SegmentPattern::parse("5**");
        assert!(pattern.is_ok());
        if let (Ok(pattern), Some(hit), Some(miss)) = (pattern, composite("521"), composite("452"))
        {
            assert!(pattern.matches(hit));
            assert!(!pattern.matches(miss));
            assert_eq!(pattern.to_string(), "5**");
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        let best = SegmentRule::new("Best Customers", &["5**"]);
        let lost = SegmentRule::new("Lost Customers", &["**1"]);
        assert!(best.is_ok() && lost.is_ok());
        if let (Ok(best), Ok(lost), Some(value)) = (best, lost, composite("521")) {
            let classifier = SegmentClassifier::new(vec![best, lost]);
            assert_eq!(classifier.classify(value), "Best Customers");
        }
    }

    #[test]
    fn unmatched_composites_are_unclassified() {
        let rule = SegmentRule::new("Best Customers", &["555", "554"]);
        assert!(rule.is_ok());
        if let (Ok(rule), Some(value)) = (rule, composite("333")) {
            let classifier = SegmentClassifier::new(vec![rule]);
            assert_eq!(classifier.classify(value), UNCLASSIFIED_LABEL);
        }
        if let Some(value) = composite("333") {
            assert_eq!(SegmentClassifier::default().classify(value), UNCLASSIFIED_LABEL);
        }
    }

    #[test]
    fn explicit_lists_match_any_listed_composite() {
        let rule = SegmentRule::new("Loyal", &["455", "545"]);
        assert!(rule.is_ok());
        if let Ok(rule) = rule {
            assert!(composite("545").is_some_and(|value| rule.matches(value)));
            assert!(!composite("554").is_some_and(|value| rule.matches(value)));
        }
    }

    #[test]
    fn malformed_patterns_are_configuration_errors() {
        for raw in ["55", "5555", "6**", "5a*", "   "] {
            let result = SegmentPattern::parse(raw);
            assert!(result.is_err(), "pattern {raw:?} should be rejected");
            if let Err(error) = result {
                assert_eq!(error.code, "configuration_error");
            }
        }
    }

    #[test]
    fn rules_need_a_label_and_patterns() {
        let empty: [&str; 0] = [];
        assert!(SegmentRule::new("Best", &empty).is_err());
        assert!(SegmentRule::new("  ", &["5**"]).is_err());
    }

    #[test]
    fn labels_are_distinct_and_ordered() {
        let rules = [
            SegmentRule::new("Churned", &["1**"]),
            SegmentRule::new("Best", &["555"]),
            SegmentRule::new("Churned", &["2**"]),
        ]
        .into_iter()
        .collect::<Result<Vec<_>, _>>();
        assert!(rules.is_ok());
        if let Ok(rules) = rules {
            let classifier = SegmentClassifier::new(rules);
            assert_eq!(classifier.labels(), vec!["Churned", "Best"]);
        }
    }
}
