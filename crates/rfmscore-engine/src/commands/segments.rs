use std::path::Path;

use crate::EngineResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{SegmentCheckData, SegmentExampleData};
use crate::segments::SegmentConfig;

/// Loads and validates a segment file without scoring anything.
pub fn check(path: &str) -> EngineResult<SuccessEnvelope> {
    let config = SegmentConfig::load(Path::new(path))?;
    let classifier = config.build_classifier()?;

    success(
        "segments check",
        SegmentCheckData {
            path: path.to_string(),
            rules: classifier.rules().len(),
            labels: classifier
                .labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
        },
    )
}

pub fn example() -> EngineResult<SuccessEnvelope> {
    success(
        "segments example",
        SegmentExampleData {
            config: SegmentConfig::reference_example(),
        },
    )
}
