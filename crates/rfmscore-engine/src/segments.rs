//! Segment configuration files: ordered `label -> patterns` rules in JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::rfm::segment::{SegmentClassifier, SegmentRule};
use crate::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentConfig {
    pub segments: Vec<SegmentRuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentRuleSpec {
    pub label: String,
    pub patterns: Vec<String>,
}

impl SegmentRuleSpec {
    fn new(label: &str, patterns: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            patterns: patterns.iter().map(|value| value.to_string()).collect(),
        }
    }
}

impl SegmentConfig {
    pub fn from_json(content: &str) -> EngineResult<Self> {
        serde_json::from_str::<Self>(content).map_err(|error| {
            EngineError::configuration_error(&format!(
                "Segment configuration is not valid JSON for the expected shape: {error}"
            ))
        })
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = fs::read_to_string(path).map_err(|error| {
            EngineError::configuration_error(&format!(
                "Could not read segment configuration `{}`: {error}",
                path.display()
            ))
            .with_data(json!({ "path": path.display().to_string() }))
        })?;
        Self::from_json(&content)
    }

    /// Validates every rule. Nothing is scored against a config that fails here.
    pub fn build_classifier(&self) -> EngineResult<SegmentClassifier> {
        if self.segments.is_empty() {
            return Err(EngineError::configuration_error(
                "Segment configuration must define at least one segment.",
            ));
        }

        let rules = self
            .segments
            .iter()
            .map(|spec| SegmentRule::new(&spec.label, &spec.patterns))
            .collect::<EngineResult<Vec<SegmentRule>>>()?;
        Ok(SegmentClassifier::new(rules))
    }

    /// A starting point for callers. Never applied unless passed in explicitly.
    pub fn reference_example() -> Self {
        Self {
            segments: vec![
                SegmentRuleSpec::new("Best Customers", &["555"]),
                SegmentRuleSpec::new("Loyal Customers", &["*5*"]),
                SegmentRuleSpec::new("New Customers", &["51*"]),
                SegmentRuleSpec::new("Lost Customers", &["111"]),
                SegmentRuleSpec::new("Churned Customers", &["1**", "2**"]),
            ],
        }
    }
}
