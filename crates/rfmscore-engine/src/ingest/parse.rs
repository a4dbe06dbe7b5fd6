use std::collections::HashMap;

use serde_json::Value;

use crate::ingest::invalid_input_error;
use crate::{EngineError, EngineResult};

pub(crate) const CUSTOMER_ID: &str = "customer_id";
pub(crate) const ORDER_ID: &str = "order_id";
pub(crate) const ORDER_DATE: &str = "order_date";
pub(crate) const AMOUNT: &str = "amount";
pub(crate) const QUANTITY: &str = "quantity";
pub(crate) const UNIT_PRICE: &str = "unit_price";

const KNOWN_FIELDS: [&str; 6] = [CUSTOMER_ID, ORDER_ID, ORDER_DATE, AMOUNT, QUANTITY, UNIT_PRICE];

#[derive(Debug, Clone, Default)]
pub(crate) struct RawRecord {
    pub(crate) row: u64,
    pub(crate) customer_id: Option<String>,
    pub(crate) order_id: Option<String>,
    pub(crate) order_date: Option<String>,
    pub(crate) amount: Option<String>,
    pub(crate) quantity: Option<String>,
    pub(crate) unit_price: Option<String>,
}

pub(crate) fn parse_source(content: &str) -> EngineResult<Vec<RawRecord>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Transaction source is empty."));
    }

    if looks_like_ndjson(trimmed) {
        return Err(EngineError::invalid_input_format(
            "NDJSON is not supported. Provide a JSON array or CSV.",
            "ndjson",
        ));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if looks_like_csv(trimmed) {
        return parse_csv(trimmed);
    }

    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(EngineError::invalid_input_format(
            "JSON input must be a top-level array of transaction objects.",
            "json_non_array",
        ));
    }

    Err(EngineError::invalid_input_format(
        "Unsupported input format. Provide a JSON array or CSV with headers.",
        "unknown",
    ))
}

fn parse_json_array(content: &str) -> EngineResult<Vec<RawRecord>> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| invalid_input_error("Invalid JSON input. Provide a valid JSON array."))?;

    let Some(items) = parsed.as_array() else {
        return Err(invalid_input_error(
            "JSON input must be a top-level array of transaction objects.",
        ));
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(invalid_input_error(
                "JSON array entries must all be objects with transaction fields.",
            ));
        };

        records.push(RawRecord {
            row: index as u64 + 1,
            customer_id: read_identifier(object.get(CUSTOMER_ID)),
            order_id: read_identifier(object.get(ORDER_ID)),
            order_date: read_optional_string(object.get(ORDER_DATE)),
            amount: read_optional_string(object.get(AMOUNT)),
            quantity: read_optional_string(object.get(QUANTITY)),
            unit_price: read_optional_string(object.get(UNIT_PRICE)),
        });
    }

    Ok(records)
}

fn parse_csv(content: &str) -> EngineResult<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    let missing = missing_headers(&headers);
    if !missing.is_empty() {
        return Err(EngineError::input_schema_mismatch(missing, headers));
    }

    let ignored = headers
        .iter()
        .filter(|header| !KNOWN_FIELDS.contains(&header.as_str()))
        .collect::<Vec<&String>>();
    if !ignored.is_empty() {
        tracing::debug!(?ignored, "ignoring unrecognized CSV headers");
    }

    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect::<HashMap<String, usize>>();

    let mut records = Vec::new();
    for (row_index, result_row) in reader.records().enumerate() {
        let record =
            result_row.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;

        records.push(RawRecord {
            row: row_index as u64 + 1,
            customer_id: value_for(&record, &index_by_name, CUSTOMER_ID),
            order_id: value_for(&record, &index_by_name, ORDER_ID),
            order_date: value_for(&record, &index_by_name, ORDER_DATE),
            amount: value_for(&record, &index_by_name, AMOUNT),
            quantity: value_for(&record, &index_by_name, QUANTITY),
            unit_price: value_for(&record, &index_by_name, UNIT_PRICE),
        });
    }

    Ok(records)
}

fn missing_headers(actual: &[String]) -> Vec<String> {
    let has = |name: &str| actual.iter().any(|header| header == name);

    let mut missing = [CUSTOMER_ID, ORDER_DATE]
        .into_iter()
        .filter(|name| !has(*name))
        .map(str::to_string)
        .collect::<Vec<String>>();

    if !has(AMOUNT) {
        missing.extend(
            [QUANTITY, UNIT_PRICE]
                .into_iter()
                .filter(|name| !has(*name))
                .map(|name| format!("{AMOUNT}|{name}")),
        );
    }
    missing
}

fn value_for(
    record: &csv::StringRecord,
    index_by_name: &HashMap<String, usize>,
    field_name: &str,
) -> Option<String> {
    let index = index_by_name.get(field_name)?;
    let value = record.get(*index)?;
    Some(value.to_string())
}

fn read_optional_string(value: Option<&Value>) -> Option<String> {
    let current = value?;

    if current.is_null() {
        return None;
    }

    if let Some(string_value) = current.as_str() {
        return Some(string_value.to_string());
    }

    if let Some(number_value) = current.as_f64() {
        return Some(number_value.to_string());
    }

    Some(current.to_string())
}

/// Identifiers keep their exact JSON text; numbers are never routed through `f64`.
fn read_identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

fn looks_like_ndjson(content: &str) -> bool {
    let lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<&str>>();
    if lines.len() < 2 {
        return false;
    }

    lines.iter().all(|line| {
        serde_json::from_str::<Value>(line.trim())
            .map(|value| value.is_object())
            .unwrap_or(false)
    })
}

fn looks_like_csv(content: &str) -> bool {
    let Some(first_line) = content.lines().find(|line| !line.trim().is_empty()) else {
        return false;
    };
    first_line.contains(',')
}
