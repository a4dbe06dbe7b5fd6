//! Input provider: turns a CSV or JSON transaction source into
//! [`TransactionRecord`]s for the scorer.

pub mod input;
pub(crate) mod parse;
pub(crate) mod validate;

use crate::contracts::types::RecordIssue;
use crate::error::INPUT_HELP_COMMAND;
use crate::rfm::policy::InvalidRecordMode;
use crate::rfm::types::TransactionRecord;
use crate::{EngineError, EngineResult};

pub use input::SourceKind;

#[derive(Debug, Clone)]
pub struct IngestedRecords {
    pub records: Vec<TransactionRecord>,
    /// Rows dropped because their text could not be read (skip mode only).
    pub skipped: Vec<RecordIssue>,
    pub source: Option<SourceKind>,
    pub source_ref: Option<String>,
}

/// Resolves the source (file, `-`, or piped stdin) and reads its records.
pub fn load_records(
    path: Option<String>,
    stdin_override: Option<String>,
    mode: InvalidRecordMode,
) -> EngineResult<IngestedRecords> {
    let source = input::resolve_source(path, stdin_override)?;
    let mut ingested = records_from_str(&source.content, mode)?;
    tracing::debug!(
        source = source.kind.as_str(),
        records = ingested.records.len(),
        skipped = ingested.skipped.len(),
        "loaded transaction records"
    );
    ingested.source = Some(source.kind);
    ingested.source_ref = source.source_ref;
    Ok(ingested)
}

/// Reads records from in-memory CSV or JSON array text.
pub fn records_from_str(content: &str, mode: InvalidRecordMode) -> EngineResult<IngestedRecords> {
    let raw_records = parse::parse_source(content)?;
    let (records, skipped) = validate::validate_records(raw_records, mode)?;
    Ok(IngestedRecords {
        records,
        skipped,
        source: None,
        source_ref: None,
    })
}

pub(crate) fn invalid_input_error(message: &str) -> EngineError {
    EngineError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide a JSON array of transaction objects or CSV with a header row.".to_string(),
            format!("Run `{INPUT_HELP_COMMAND}` to review the input fields."),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::records_from_str;
    use crate::rfm::policy::InvalidRecordMode;

    #[test]
    fn csv_and_json_sources_produce_the_same_records() {
        let csv = "customer_id,order_id,order_date,amount\nc1,o1,2026-01-05,12.5\n";
        let json = r#"[{"customer_id":"c1","order_id":"o1","order_date":"2026-01-05","amount":12.5}]"#;
        let from_csv = records_from_str(csv, InvalidRecordMode::FailFast);
        let from_json = records_from_str(json, InvalidRecordMode::FailFast);
        assert!(from_csv.is_ok() && from_json.is_ok());
        if let (Ok(a), Ok(b)) = (from_csv, from_json) {
            assert_eq!(a.records, b.records);
        }
    }
}
