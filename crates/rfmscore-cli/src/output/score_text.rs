use std::io;

use serde_json::Value;

use super::format::{Align, Column, key_value_rows, render_table_or_blocks};

pub fn render_score(data: &Value, max_width: usize) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("score output requires rows"))?;
    let summary = data
        .get("summary")
        .ok_or_else(|| io::Error::other("score output requires a summary"))?;

    let customers = count(summary, "customers");
    let as_of = text(data, "as_of");
    let policy = text(data, "policy_version");

    let mut lines = if customers == 0 {
        vec![format!("No customers to score as of {as_of}.")]
    } else {
        vec![format!(
            "Scored {customers} customer{} as of {as_of} (policy {policy}).",
            if customers == 1 { "" } else { "s" }
        )]
    };

    lines.push(String::new());
    lines.push("Input:".to_string());
    lines.extend(key_value_rows(
        &[
            ("Records read:", count(summary, "records_read").to_string()),
            ("Records used:", count(summary, "records_used").to_string()),
            (
                "Missing customer:",
                count(summary, "missing_customer").to_string(),
            ),
            (
                "Skipped invalid:",
                count(summary, "invalid_skipped").to_string(),
            ),
        ],
        2,
    ));

    if let Some(policy) = data.get("policy") {
        lines.push(String::new());
        lines.push("Policy:".to_string());
        let negatives = if policy
            .get("allow_negative_amounts")
            .and_then(Value::as_bool)
            == Some(true)
        {
            "allowed"
        } else {
            "rejected"
        };
        lines.extend(key_value_rows(
            &[
                ("Invalid records:", text(policy, "invalid_records")),
                ("Negative amounts:", negatives.to_string()),
                ("Single group:", text(policy, "single_group")),
                ("Ties:", text(policy, "ties")),
            ],
            2,
        ));
    }

    if !rows.is_empty() {
        lines.push(String::new());
        let shown = rows.len() as u64;
        if shown < customers {
            lines.push(format!("Customers (first {shown} of {customers}):"));
        } else {
            lines.push("Customers:".to_string());
        }
        lines.extend(customer_table(rows, max_width));
    }

    if let Some(segments) = data.get("segments").and_then(Value::as_array) {
        lines.push(String::new());
        lines.push("Segments:".to_string());
        let entries = segments
            .iter()
            .map(|segment| {
                (
                    segment.get("label").and_then(Value::as_str).unwrap_or(""),
                    count(segment, "customers").to_string(),
                )
            })
            .collect::<Vec<(&str, String)>>();
        lines.extend(key_value_rows(&entries, 2));
    }

    if let Some(issues) = data.get("issues").and_then(Value::as_array)
        && !issues.is_empty()
    {
        lines.push(String::new());
        lines.push(format!("Skipped rows ({}):", issues.len()));
        for issue in issues {
            lines.push(format!(
                "  Row {}: {} ({})",
                count(issue, "row"),
                text(issue, "description"),
                text(issue, "code")
            ));
        }
    }

    Ok(lines.join("\n"))
}

fn customer_table(rows: &[Value], max_width: usize) -> Vec<String> {
    let with_segments = rows.iter().any(|row| row.get("segment").is_some());
    let mut columns = vec![
        Column {
            name: "Customer",
            align: Align::Left,
        },
        Column {
            name: "Last Order",
            align: Align::Left,
        },
        Column {
            name: "Days",
            align: Align::Right,
        },
        Column {
            name: "Orders",
            align: Align::Right,
        },
        Column {
            name: "Spend",
            align: Align::Right,
        },
        Column {
            name: "RFM",
            align: Align::Left,
        },
    ];
    if with_segments {
        columns.push(Column {
            name: "Segment",
            align: Align::Left,
        });
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                text(row, "customer_id"),
                text(row, "last_purchase_date"),
                row.get("recency_days")
                    .and_then(Value::as_i64)
                    .unwrap_or(0)
                    .to_string(),
                count(row, "purchase_count").to_string(),
                format!(
                    "{:.2}",
                    row.get("total_spend").and_then(Value::as_f64).unwrap_or(0.0)
                ),
                text(row, "composite"),
            ];
            if with_segments {
                cells.push(text(row, "segment"));
            }
            cells
        })
        .collect::<Vec<Vec<String>>>();

    render_table_or_blocks(&columns, &table_rows, max_width, "Customer")
}

fn count(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}
