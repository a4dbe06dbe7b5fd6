use crate::contracts::types::RecordIssue;
use crate::date::parse_order_date;
use crate::ingest::parse::{AMOUNT, ORDER_DATE, QUANTITY, RawRecord, UNIT_PRICE};
use crate::rfm::policy::InvalidRecordMode;
use crate::rfm::types::TransactionRecord;
use crate::{EngineError, EngineResult};

/// Converts raw rows into transaction records.
///
/// Only text that cannot be read is flagged here. Missing customer ids,
/// missing dates and negative amounts pass through so the aggregator applies
/// one policy to every input provider.
pub(crate) fn validate_records(
    raw_records: Vec<RawRecord>,
    mode: InvalidRecordMode,
) -> EngineResult<(Vec<TransactionRecord>, Vec<RecordIssue>)> {
    let mut records = Vec::with_capacity(raw_records.len());
    let mut skipped = Vec::new();

    for raw in raw_records {
        match convert(raw) {
            Ok(record) => records.push(record),
            Err(issue) => match mode {
                InvalidRecordMode::FailFast => return Err(EngineError::invalid_record(&issue)),
                InvalidRecordMode::Skip => skipped.push(issue),
            },
        }
    }

    Ok((records, skipped))
}

fn convert(raw: RawRecord) -> Result<TransactionRecord, RecordIssue> {
    let order_date = match normalize_optional(raw.order_date) {
        Some(candidate) => match parse_order_date(&candidate) {
            Some(date) => Some(date),
            None => {
                return Err(RecordIssue {
                    row: raw.row,
                    field: ORDER_DATE.to_string(),
                    code: "invalid_date".to_string(),
                    description: format!(
                        "order_date must be YYYY-MM-DD or a timestamp; got \"{candidate}\""
                    ),
                    received: Some(candidate),
                });
            }
        },
        None => None,
    };

    let amount = match normalize_optional(raw.amount) {
        Some(candidate) => parse_number(raw.row, AMOUNT, candidate)?,
        None => line_amount(raw.row, raw.quantity, raw.unit_price)?,
    };

    Ok(TransactionRecord {
        customer_id: normalize_optional(raw.customer_id),
        order_id: normalize_optional(raw.order_id),
        order_date,
        amount,
        source_row: Some(raw.row),
    })
}

fn line_amount(
    row: u64,
    quantity: Option<String>,
    unit_price: Option<String>,
) -> Result<f64, RecordIssue> {
    match (normalize_optional(quantity), normalize_optional(unit_price)) {
        (Some(quantity), Some(unit_price)) => {
            let quantity = parse_number(row, QUANTITY, quantity)?;
            let unit_price = parse_number(row, UNIT_PRICE, unit_price)?;
            Ok(quantity * unit_price)
        }
        _ => Err(RecordIssue {
            row,
            field: AMOUNT.to_string(),
            code: "missing_required_field".to_string(),
            description: "amount, or both quantity and unit_price, must be present.".to_string(),
            received: None,
        }),
    }
}

fn parse_number(row: u64, field: &str, candidate: String) -> Result<f64, RecordIssue> {
    match candidate.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RecordIssue {
            row,
            field: field.to_string(),
            code: "invalid_number".to_string(),
            description: format!("{field} must be numeric; got \"{candidate}\""),
            received: Some(candidate),
        }),
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
