use std::io;

use serde_json::Value;

use super::format::key_value_rows;

pub fn render_check(data: &Value) -> io::Result<String> {
    let path = data.get("path").and_then(Value::as_str).unwrap_or("");
    let rules = data
        .get("rules")
        .and_then(Value::as_u64)
        .ok_or_else(|| io::Error::other("segments check output requires a rule count"))?;
    let labels = data
        .get("labels")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<&str>>()
                .join(", ")
        })
        .unwrap_or_default();

    let mut lines = vec![
        "Segment configuration is valid.".to_string(),
        String::new(),
    ];
    lines.extend(key_value_rows(
        &[
            ("File:", path.to_string()),
            ("Rules:", rules.to_string()),
            ("Labels:", labels),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("Customers matching no rule are labelled `Unclassified`.".to_string());
    Ok(lines.join("\n"))
}

/// Prints only the configuration so it can be redirected into a file.
pub fn render_example(data: &Value) -> io::Result<String> {
    let config = data
        .get("config")
        .ok_or_else(|| io::Error::other("segments example output requires a config"))?;
    serde_json::to_string_pretty(config).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{render_check, render_example};

    #[test]
    fn check_lists_rules_and_labels() {
        let rendered = render_check(&json!({
            "path": "rules.json",
            "rules": 2,
            "labels": ["Best Customers", "Lost Customers"]
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Segment configuration is valid."));
            assert!(text.contains("  Rules:   2"));
            assert!(text.contains("Best Customers, Lost Customers"));
        }
    }

    #[test]
    fn example_prints_bare_config_json() {
        let rendered = render_example(&json!({
            "config": {"segments": [{"label": "Best Customers", "patterns": ["555"]}]}
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["segments"][0]["patterns"][0], "555");
            }
        }
    }
}
