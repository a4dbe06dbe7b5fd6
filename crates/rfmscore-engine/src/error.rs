use serde_json::{Value, json};
use thiserror::Error;

use crate::contracts::types::RecordIssue;

pub(crate) const INPUT_HELP_COMMAND: &str = "rfmscore score --help";
pub(crate) const SEGMENTS_HELP_COMMAND: &str = "rfmscore segments example";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EngineError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl EngineError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `rfmscore {cmd} --help` for usage."),
            None => "Run `rfmscore --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_input_format(message: &str, received_format: &str) -> Self {
        Self::new(
            "invalid_input_format",
            message,
            vec![
                "Provide transactions as a JSON array of objects or CSV with a header row."
                    .to_string(),
                format!("Run `{INPUT_HELP_COMMAND}` to review the input fields."),
            ],
        )
        .with_data(json!({
            "received_format": received_format,
            "supported_formats": ["json_array", "csv"],
        }))
    }

    pub fn input_schema_mismatch(missing_headers: Vec<String>, actual_headers: Vec<String>) -> Self {
        Self::new(
            "input_schema_mismatch",
            "CSV headers do not include every required transaction field.",
            vec![
                "Include `customer_id` and `order_date` headers.".to_string(),
                "Include either `amount` or both `quantity` and `unit_price`.".to_string(),
                format!("Run `{INPUT_HELP_COMMAND}` to review the input fields."),
            ],
        )
        .with_data(json!({
            "missing_headers": missing_headers,
            "actual_headers": actual_headers,
        }))
    }

    pub fn invalid_record(issue: &RecordIssue) -> Self {
        Self::new(
            "invalid_record",
            &format!("Row {}: {}", issue.row, issue.description),
            vec![
                "Fix the record in your source data and rerun.".to_string(),
                "Or rerun with `--skip-invalid` to drop invalid records and report a count."
                    .to_string(),
            ],
        )
        .with_data(json!({
            "issue": issue,
        }))
    }

    pub fn configuration_error(message: &str) -> Self {
        Self::new(
            "configuration_error",
            message,
            vec![
                "Each segment needs a non-empty `label` and at least one pattern.".to_string(),
                "Patterns are three characters, each `1`-`5` or `*` (for example `5**`)."
                    .to_string(),
                format!("Run `{SEGMENTS_HELP_COMMAND}` for a working configuration."),
            ],
        )
    }

    pub fn insufficient_customers(dimension: &str, customers: usize) -> Self {
        Self::new(
            "insufficient_customers",
            &format!(
                "All {customers} customers share one {dimension} value, so quintiles cannot be formed."
            ),
            vec![
                "Score a larger or more varied customer population.".to_string(),
                "Or rerun with `--single-group 5` or `--single-group 3`.".to_string(),
            ],
        )
        .with_data(json!({
            "dimension": dimension,
            "customers": customers,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
